//! Graph validation logic.

use crate::error::{GraphError, GraphResult};
use crate::graph::{Component, InputPort, OutputPort};

/// Validate the arena: ids match positions, ports point at existing owners,
/// and every output's associated inputs belong to the same component.
pub(crate) fn validate_structure(
    components: &[Component],
    outputs: &[OutputPort],
    inputs: &[InputPort],
) -> GraphResult<()> {
    // Port ids are contiguous and match their indices
    for (i, port) in outputs.iter().enumerate() {
        if port.id.slot() != i || port.comp.slot() >= components.len() {
            return Err(GraphError::InvalidOutputRef {
                port: port.id,
                comp: port.comp,
            });
        }
    }
    for (i, port) in inputs.iter().enumerate() {
        if port.id.slot() != i || port.comp.slot() >= components.len() {
            return Err(GraphError::InvalidInputRef {
                port: port.id,
                comp: port.comp,
            });
        }
    }

    for comp in components {
        for &id in &comp.outputs {
            let port = outputs.get(id.slot()).filter(|p| p.comp == comp.id);
            let Some(port) = port else {
                return Err(GraphError::InvalidOutputRef {
                    port: id,
                    comp: comp.id,
                });
            };

            // Associated inputs must be this component's own inputs
            for &input in &port.inputs {
                if !comp.inputs.contains(&input) {
                    return Err(GraphError::InvalidInputRef {
                        port: input,
                        comp: comp.id,
                    });
                }
            }
            if port.coeffs.coeffin.len() != port.inputs.len() {
                return Err(GraphError::CoefficientArity {
                    port: id,
                    expected: port.inputs.len(),
                    actual: port.coeffs.coeffin.len(),
                });
            }
        }

        for &id in &comp.inputs {
            if inputs.get(id.slot()).is_none_or(|p| p.comp != comp.id) {
                return Err(GraphError::InvalidInputRef {
                    port: id,
                    comp: comp.id,
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Channel;
    use crate::control::ControlState;
    use crate::graph::Coefficients;
    use crate::kind::ComponentKind;
    use pn_core::Id;

    fn output(index: u32, comp: u32) -> OutputPort {
        OutputPort {
            id: Id::from_index(index),
            comp: Id::from_index(comp),
            tag: "W".into(),
            channel: Channel::Water,
            control: ControlState::On,
            inputs: vec![],
            coeffs: Coefficients::passthrough(0),
            value: 0.0,
            path: None,
        }
    }

    #[test]
    fn validate_empty_graph() {
        assert!(validate_structure(&[], &[], &[]).is_ok());
    }

    #[test]
    fn validate_invalid_component_ref() {
        let outputs = vec![output(0, 99)];
        let result = validate_structure(&[], &outputs, &[]);
        assert!(matches!(
            result.unwrap_err(),
            GraphError::InvalidOutputRef { .. }
        ));
    }

    #[test]
    fn validate_component_port_mismatch() {
        let components = vec![
            Component {
                id: Id::from_index(0),
                name: "A".into(),
                kind: ComponentKind::Boiler,
                outputs: vec![Id::from_index(0)],
                inputs: vec![],
            },
            Component {
                id: Id::from_index(1),
                name: "B".into(),
                kind: ComponentKind::Boiler,
                outputs: vec![],
                inputs: vec![],
            },
        ];
        // Port claims to belong to B while A lists it
        let outputs = vec![output(0, 1)];
        let result = validate_structure(&components, &outputs, &[]);
        assert!(result.is_err());
    }
}
