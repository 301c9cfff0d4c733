//! Equipment kinds and their default port layouts.
//!
//! The set of equipment kinds is closed. The network layer only asks a kind
//! topology questions (is it a junction, does it route by channel, does it set
//! flow); physical behavior lives in the equipment models outside this crate.

use std::fmt;

use crate::channel::{Channel, Fluid, WILDCARD};

/// Role of a junction component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JunctionKind {
    /// One inlet, several outlets (per channel).
    Diverge,
    /// Several inlets, one outlet (per channel).
    Converge,
}

/// What makes a component fix the flow of the path it sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowSetter {
    VariableVolume,
    VariableFlow,
}

/// Closed set of equipment kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
    Boiler,
    Pump { variable_flow: bool },
    Fan { variable_flow: bool },
    Valve { fluid: Fluid },
    Pipe { fluid: Fluid },
    Diverge { fluid: Fluid, branches: u8 },
    Converge { fluid: Fluid, branches: u8 },
    Room,
    Coil,
    /// Multi-inlet storage; each pair maps an inlet tag to its outlet tag.
    StorageTank { correspondence: Vec<(String, String)> },
    Collector,
    DesiccantUnit,
    EvaporativeCooler,
    TotalHeatExchanger,
    RadiantPanel,
    /// Variable air volume terminal.
    Vav,
    /// Boundary supply (outdoor air, mains water).
    Source { fluid: Fluid },
    /// Boundary discharge.
    Sink { fluid: Fluid },
}

/// Declared port: tag, channel and (outputs only) the input tags it depends on.
///
/// An empty `depends_on` associates the output with every input of its channel.
#[derive(Debug, Clone, PartialEq)]
pub struct PortSpec {
    pub tag: String,
    pub channel: Channel,
    pub depends_on: Vec<String>,
}

impl PortSpec {
    pub fn new(tag: impl Into<String>, channel: Channel) -> Self {
        Self {
            tag: tag.into(),
            channel,
            depends_on: Vec::new(),
        }
    }

    pub fn depends_on(mut self, tags: &[&str]) -> Self {
        self.depends_on = tags.iter().map(|t| t.to_string()).collect();
        self
    }
}

/// Output and input port specs of a component, in port order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortLayout {
    pub outputs: Vec<PortSpec>,
    pub inputs: Vec<PortSpec>,
}

impl PortLayout {
    fn symmetric(specs: &[(&str, Channel)]) -> Self {
        let ports: Vec<PortSpec> = specs
            .iter()
            .map(|(tag, channel)| PortSpec::new(*tag, *channel))
            .collect();
        Self {
            outputs: ports.clone(),
            inputs: ports,
        }
    }

    fn fluid_defaults(fluid: Fluid) -> Vec<PortSpec> {
        fluid
            .channels()
            .iter()
            .map(|c| PortSpec::new(c.default_tag(), *c))
            .collect()
    }

    fn wildcards(fluid: Fluid, per_channel: u8) -> Vec<PortSpec> {
        let mut ports = Vec::new();
        for channel in fluid.channels() {
            for _ in 0..per_channel {
                ports.push(PortSpec::new(WILDCARD, *channel));
            }
        }
        ports
    }
}

impl ComponentKind {
    /// Short type tag used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            ComponentKind::Boiler => "boiler",
            ComponentKind::Pump { .. } => "pump",
            ComponentKind::Fan { .. } => "fan",
            ComponentKind::Valve { .. } => "valve",
            ComponentKind::Pipe { .. } => "pipe",
            ComponentKind::Diverge { .. } => "diverge",
            ComponentKind::Converge { .. } => "converge",
            ComponentKind::Room => "room",
            ComponentKind::Coil => "coil",
            ComponentKind::StorageTank { .. } => "storage-tank",
            ComponentKind::Collector => "collector",
            ComponentKind::DesiccantUnit => "desiccant-unit",
            ComponentKind::EvaporativeCooler => "evaporative-cooler",
            ComponentKind::TotalHeatExchanger => "total-heat-exchanger",
            ComponentKind::RadiantPanel => "radiant-panel",
            ComponentKind::Vav => "vav",
            ComponentKind::Source { .. } => "source",
            ComponentKind::Sink { .. } => "sink",
        }
    }

    pub fn junction(&self) -> Option<JunctionKind> {
        match self {
            ComponentKind::Diverge { .. } => Some(JunctionKind::Diverge),
            ComponentKind::Converge { .. } => Some(JunctionKind::Converge),
            _ => None,
        }
    }

    pub fn is_junction(&self) -> bool {
        self.junction().is_some()
    }

    /// Inlet→outlet tag table for components whose inlets and outlets do not pair by position.
    pub fn correspondence(&self) -> Option<&[(String, String)]> {
        match self {
            ComponentKind::StorageTank { correspondence } => Some(correspondence),
            _ => None,
        }
    }

    /// Multi-port components whose channel alone selects the port.
    pub fn routes_by_channel(&self) -> bool {
        matches!(
            self,
            ComponentKind::RadiantPanel | ComponentKind::Coil | ComponentKind::DesiccantUnit
        )
    }

    /// Two-stream air components with more ports than a single stream needs.
    pub fn is_wide(&self) -> bool {
        matches!(
            self,
            ComponentKind::EvaporativeCooler | ComponentKind::TotalHeatExchanger
        )
    }

    pub fn flow_setter(&self) -> Option<FlowSetter> {
        match self {
            ComponentKind::Vav => Some(FlowSetter::VariableVolume),
            ComponentKind::Pump {
                variable_flow: true,
            }
            | ComponentKind::Fan {
                variable_flow: true,
            } => Some(FlowSetter::VariableFlow),
            _ => None,
        }
    }

    /// Ports a component of this kind exposes when none are declared explicitly.
    pub fn default_layout(&self) -> PortLayout {
        use Channel::{AirHumidity as X, AirTemperature as T, Water as W};

        match self {
            ComponentKind::Boiler | ComponentKind::Pump { .. } | ComponentKind::Collector => {
                PortLayout::symmetric(&[("W", W)])
            }
            // Fans and terminals leave humidity untouched: transparent on that channel.
            ComponentKind::Fan { .. } | ComponentKind::Vav => PortLayout::symmetric(&[("t", T)]),
            ComponentKind::Valve { fluid } | ComponentKind::Pipe { fluid } => PortLayout {
                outputs: PortLayout::fluid_defaults(*fluid),
                inputs: PortLayout::fluid_defaults(*fluid),
            },
            ComponentKind::Diverge { fluid, branches } => PortLayout {
                outputs: PortLayout::wildcards(*fluid, *branches),
                inputs: PortLayout::wildcards(*fluid, 1),
            },
            ComponentKind::Converge { fluid, branches } => PortLayout {
                outputs: PortLayout::wildcards(*fluid, 1),
                inputs: PortLayout::wildcards(*fluid, *branches),
            },
            ComponentKind::Room | ComponentKind::DesiccantUnit => {
                PortLayout::symmetric(&[("t", T), ("x", X)])
            }
            ComponentKind::Coil | ComponentKind::RadiantPanel => {
                PortLayout::symmetric(&[("t", T), ("x", X), ("W", W)])
            }
            ComponentKind::StorageTank { correspondence } => PortLayout {
                outputs: correspondence
                    .iter()
                    .map(|(_, out)| PortSpec::new(out.as_str(), W))
                    .collect(),
                inputs: correspondence
                    .iter()
                    .map(|(inlet, _)| PortSpec::new(inlet.as_str(), W))
                    .collect(),
            },
            ComponentKind::EvaporativeCooler => {
                PortLayout::symmetric(&[("D", T), ("d", X), ("V", T), ("v", X)])
            }
            ComponentKind::TotalHeatExchanger => {
                PortLayout::symmetric(&[("E", T), ("e", X), ("O", T), ("o", X)])
            }
            ComponentKind::Source { fluid } => PortLayout {
                outputs: PortLayout::fluid_defaults(*fluid),
                inputs: Vec::new(),
            },
            ComponentKind::Sink { fluid } => PortLayout {
                outputs: Vec::new(),
                inputs: PortLayout::fluid_defaults(*fluid),
            },
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
