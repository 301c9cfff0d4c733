//! Plant file schema definitions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub components: Vec<ComponentDef>,
    #[serde(default)]
    pub bundles: Vec<BundleDef>,
    #[serde(default)]
    pub valves: Vec<ValveDef>,
}

impl Project {
    pub fn component(&self, name: &str) -> Option<&ComponentDef> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn bundle(&self, name: &str) -> Option<&BundleDef> {
        self.bundles.iter().find(|b| b.name == name)
    }

    /// All declared path names, across bundles.
    pub fn path_names(&self) -> impl Iterator<Item = &str> {
        self.bundles
            .iter()
            .flat_map(|b| b.paths.iter().map(|p| p.name.as_str()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FluidDef {
    Water,
    Air,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChannelDef {
    AirTemperature,
    AirHumidity,
    Water,
}

impl ChannelDef {
    pub fn fluid(self) -> FluidDef {
        match self {
            ChannelDef::AirTemperature | ChannelDef::AirHumidity => FluidDef::Air,
            ChannelDef::Water => FluidDef::Water,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type")]
pub enum ControlDef {
    #[default]
    On,
    Off,
    LoadControlled,
    Bypass,
    Batch,
}

impl ControlDef {
    fn is_on(&self) -> bool {
        *self == ControlDef::On
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentDef {
    pub name: String,
    pub kind: ComponentKindDef,
    /// Explicit port layout; the kind's default layout when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<PortsDef>,
    /// Initial control of every output.
    #[serde(default, skip_serializing_if = "ControlDef::is_on")]
    pub control: ControlDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ComponentKindDef {
    Boiler,
    Pump {
        #[serde(default)]
        variable_flow: bool,
    },
    Fan {
        #[serde(default)]
        variable_flow: bool,
    },
    Valve {
        fluid: FluidDef,
    },
    Pipe {
        fluid: FluidDef,
    },
    Diverge {
        fluid: FluidDef,
        branches: u8,
    },
    Converge {
        fluid: FluidDef,
        branches: u8,
    },
    Room,
    Coil,
    StorageTank {
        correspondence: Vec<CorrespondenceDef>,
    },
    Collector,
    DesiccantUnit,
    EvaporativeCooler,
    TotalHeatExchanger,
    RadiantPanel,
    Vav,
    Source {
        fluid: FluidDef,
    },
    Sink {
        fluid: FluidDef,
    },
}

impl ComponentKindDef {
    /// Fluid the kind is restricted to, for kinds that carry one.
    pub fn fluid(&self) -> Option<FluidDef> {
        match self {
            ComponentKindDef::Valve { fluid }
            | ComponentKindDef::Pipe { fluid }
            | ComponentKindDef::Diverge { fluid, .. }
            | ComponentKindDef::Converge { fluid, .. }
            | ComponentKindDef::Source { fluid }
            | ComponentKindDef::Sink { fluid } => Some(*fluid),
            ComponentKindDef::Boiler
            | ComponentKindDef::Pump { .. }
            | ComponentKindDef::StorageTank { .. }
            | ComponentKindDef::Collector => Some(FluidDef::Water),
            ComponentKindDef::Fan { .. } | ComponentKindDef::Vav => Some(FluidDef::Air),
            _ => None,
        }
    }

    pub fn is_junction(&self) -> bool {
        matches!(
            self,
            ComponentKindDef::Diverge { .. } | ComponentKindDef::Converge { .. }
        )
    }
}

/// Inlet tag of a storage tank and the outlet it discharges through.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorrespondenceDef {
    pub inlet: String,
    pub outlet: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PortsDef {
    #[serde(default)]
    pub outputs: Vec<PortDef>,
    #[serde(default)]
    pub inputs: Vec<PortDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortDef {
    pub tag: String,
    pub channel: ChannelDef,
    /// Input tags an output depends on; every input of its channel when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BundleDef {
    pub name: String,
    /// Required from version 2; version 1 files were water-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fluid: Option<FluidDef>,
    #[serde(default)]
    pub paths: Vec<PathDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathDef {
    pub name: String,
    #[serde(default)]
    pub closed: bool,
    #[serde(default, skip_serializing_if = "ControlDef::is_on")]
    pub control: ControlDef,
    /// Scheduled mass flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_kg_s: Option<f64>,
    pub elements: Vec<ElementDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementDef {
    pub component: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inlet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlet: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValveDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    pub path_a: String,
    pub path_b: String,
    /// Share of path A.
    pub ratio: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitor: Option<String>,
}
