//! Core port graph data structures.

use std::collections::HashMap;

use pn_core::{CompId, InPortId, OutPortId, PathId, Real};

use crate::channel::Channel;
use crate::control::ControlState;
use crate::error::{GraphError, GraphResult};
use crate::kind::ComponentKind;

/// Linear relation carried by an output port:
/// `coeffo·out − Σ coeffin[i]·upstream[i] = co`.
///
/// `coeffin` is aligned with the output's associated inputs. Equipment models
/// rewrite these every step.
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficients {
    pub coeffo: Real,
    pub co: Real,
    pub coeffin: Vec<Real>,
}

impl Coefficients {
    /// Pass-through relation `out = in` for `n` associated inputs.
    pub fn passthrough(n: usize) -> Self {
        Self {
            coeffo: 1.0,
            co: 0.0,
            coeffin: vec![1.0; n],
        }
    }
}

/// An output port: one unknown in the per-step linear system.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPort {
    pub id: OutPortId,
    pub comp: CompId,
    pub tag: String,
    pub channel: Channel,
    pub control: ControlState,
    /// Inputs of the owning component this output depends on, in coefficient order.
    pub inputs: Vec<InPortId>,
    pub coeffs: Coefficients,
    /// Last solved value written back by the numeric solver.
    pub value: Real,
    /// Logical path this port is bound into, once paths are assembled.
    pub path: Option<PathId>,
}

/// An input port with its designed (`upo`) and effective (`upv`) upstream.
///
/// Both are non-owning references into the output arena. `upo` is written
/// once by path assembly; `upv` is rewritten every step by propagation and is
/// the one the solver reads.
#[derive(Debug, Clone, PartialEq)]
pub struct InputPort {
    pub id: InPortId,
    pub comp: CompId,
    pub tag: String,
    pub channel: Channel,
    pub upo: Option<OutPortId>,
    pub upv: Option<OutPortId>,
}

/// One equipment instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub id: CompId,
    pub name: String,
    pub kind: ComponentKind,
    pub outputs: Vec<OutPortId>,
    pub inputs: Vec<InPortId>,
}

impl Component {
    pub fn port_count(&self) -> usize {
        self.outputs.len() + self.inputs.len()
    }
}

/// The port graph: an arena of components, output ports and input ports.
///
/// Structure is fixed once built; coefficients, controls and upstream pointers
/// change every step.
#[derive(Debug, Clone)]
pub struct PortGraph {
    pub(crate) components: Vec<Component>,
    pub(crate) outputs: Vec<OutputPort>,
    pub(crate) inputs: Vec<InputPort>,
    pub(crate) by_name: HashMap<String, CompId>,
}

impl PortGraph {
    /// Return all components.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Return all output ports.
    pub fn outputs(&self) -> &[OutputPort] {
        &self.outputs
    }

    /// Return all input ports.
    pub fn inputs(&self) -> &[InputPort] {
        &self.inputs
    }

    pub fn component(&self, id: CompId) -> Option<&Component> {
        self.components.get(id.slot())
    }

    pub fn output(&self, id: OutPortId) -> Option<&OutputPort> {
        self.outputs.get(id.slot())
    }

    pub fn output_mut(&mut self, id: OutPortId) -> Option<&mut OutputPort> {
        self.outputs.get_mut(id.slot())
    }

    pub fn input(&self, id: InPortId) -> Option<&InputPort> {
        self.inputs.get(id.slot())
    }

    pub fn input_mut(&mut self, id: InPortId) -> Option<&mut InputPort> {
        self.inputs.get_mut(id.slot())
    }

    /// Look up a component by name.
    pub fn find(&self, name: &str) -> GraphResult<CompId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::UnknownComponent {
                name: name.to_string(),
            })
    }

    /// Control state of an output; unknown ports read as `Off`.
    pub fn control(&self, id: OutPortId) -> ControlState {
        self.output(id)
            .map_or(ControlState::Off, |port| port.control)
    }

    pub fn set_control(&mut self, id: OutPortId, control: ControlState) {
        if let Some(port) = self.output_mut(id) {
            port.control = control;
        }
    }

    /// Set the control of every output of a component.
    pub fn set_component_control(&mut self, comp: CompId, control: ControlState) {
        let Some(outputs) = self.component(comp).map(|c| c.outputs.clone()) else {
            return;
        };
        for id in outputs {
            self.set_control(id, control);
        }
    }

    /// Replace an output's coefficients (called by equipment models each step).
    pub fn set_coefficients(&mut self, id: OutPortId, coeffs: Coefficients) -> GraphResult<()> {
        let port = self
            .outputs
            .get_mut(id.slot())
            .ok_or(GraphError::UnknownOutput { port: id })?;
        if coeffs.coeffin.len() != port.inputs.len() {
            return Err(GraphError::CoefficientArity {
                port: id,
                expected: port.inputs.len(),
                actual: coeffs.coeffin.len(),
            });
        }
        port.coeffs = coeffs;
        Ok(())
    }

    /// `component:tag` label of an output, for diagnostics.
    pub fn output_label(&self, id: OutPortId) -> String {
        match self.output(id) {
            Some(port) => {
                let comp = self
                    .component(port.comp)
                    .map_or("?", |c| c.name.as_str());
                format!("{}:{}", comp, port.tag)
            }
            None => format!("?{}", id),
        }
    }

    /// `component:tag` label of an input, for diagnostics.
    pub fn input_label(&self, id: InPortId) -> String {
        match self.input(id) {
            Some(port) => {
                let comp = self
                    .component(port.comp)
                    .map_or("?", |c| c.name.as_str());
                format!("{}:{}", comp, port.tag)
            }
            None => format!("?{}", id),
        }
    }

    /// First input of a component on a channel.
    pub fn input_on_channel(&self, comp: CompId, channel: Channel) -> Option<InPortId> {
        self.component(comp)?
            .inputs
            .iter()
            .copied()
            .find(|&id| self.input(id).is_some_and(|p| p.channel == channel))
    }

    /// Reset every effective upstream to its designed upstream.
    pub fn reset_upstreams(&mut self) {
        for port in &mut self.inputs {
            port.upv = port.upo;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;

    #[test]
    fn passthrough_coefficients() {
        let c = Coefficients::passthrough(2);
        assert_eq!(c.coeffo, 1.0);
        assert_eq!(c.coeffin, vec![1.0, 1.0]);
    }

    #[test]
    fn coefficient_arity_is_checked() {
        let mut builder = GraphBuilder::new();
        let boiler = builder.add_component("BOI", ComponentKind::Boiler).unwrap();
        let mut graph = builder.build().unwrap();
        let out = graph.component(boiler).unwrap().outputs[0];

        let err = graph
            .set_coefficients(out, Coefficients::passthrough(3))
            .unwrap_err();
        assert!(matches!(err, GraphError::CoefficientArity { expected: 1, .. }));

        graph
            .set_coefficients(
                out,
                Coefficients {
                    coeffo: 1.0,
                    co: 5.0,
                    coeffin: vec![0.5],
                },
            )
            .unwrap();
        assert_eq!(graph.output(out).unwrap().coeffs.co, 5.0);
    }

    #[test]
    fn reset_upstreams_restores_design() {
        let mut builder = GraphBuilder::new();
        let a = builder.add_component("A", ComponentKind::Boiler).unwrap();
        let b = builder.add_component("B", ComponentKind::Collector).unwrap();
        let mut graph = builder.build().unwrap();
        let a_out = graph.component(a).unwrap().outputs[0];
        let b_in = graph.component(b).unwrap().inputs[0];

        graph.input_mut(b_in).unwrap().upo = Some(a_out);
        graph.input_mut(b_in).unwrap().upv = None;
        graph.reset_upstreams();
        assert_eq!(graph.input(b_in).unwrap().upv, Some(a_out));
        assert_eq!(graph.output_label(a_out), "A:W");
    }
}
