//! Incremental port graph builder.

use std::collections::HashMap;
use pn_core::{CompId, InPortId, OutPortId};

use crate::control::ControlState;
use crate::error::{GraphError, GraphResult};
use crate::graph::{Coefficients, Component, InputPort, OutputPort, PortGraph};
use crate::kind::{ComponentKind, PortLayout};
use crate::validate;

/// Builder for constructing a port graph incrementally.
///
/// Use `add_component` (default layout for the kind) or
/// `add_component_with_layout`, then call `build()` to validate it.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    components: Vec<Component>,
    outputs: Vec<OutputPort>,
    inputs: Vec<InputPort>,
    by_name: HashMap<String, CompId>,
}

impl GraphBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component with the default port layout of its kind.
    pub fn add_component(
        &mut self,
        name: impl Into<String>,
        kind: ComponentKind,
    ) -> GraphResult<CompId> {
        let layout = kind.default_layout();
        self.add_component_with_layout(name, kind, layout)
    }

    /// Add a component with an explicit port layout.
    ///
    /// Inputs are created first so each output can be associated with them;
    /// an output with no declared dependencies depends on every input of its
    /// channel.
    pub fn add_component_with_layout(
        &mut self,
        name: impl Into<String>,
        kind: ComponentKind,
        layout: PortLayout,
    ) -> GraphResult<CompId> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(GraphError::DuplicateComponent { name });
        }
        let comp_id = CompId::from_usize(self.components.len());

        let mut input_ids = Vec::with_capacity(layout.inputs.len());
        for spec in &layout.inputs {
            let id = InPortId::from_usize(self.inputs.len());
            self.inputs.push(InputPort {
                id,
                comp: comp_id,
                tag: spec.tag.clone(),
                channel: spec.channel,
                upo: None,
                upv: None,
            });
            input_ids.push(id);
        }

        let mut output_ids = Vec::with_capacity(layout.outputs.len());
        for spec in &layout.outputs {
            let associated: Vec<InPortId> = if spec.depends_on.is_empty() {
                input_ids
                    .iter()
                    .copied()
                    .filter(|id| self.inputs[id.slot()].channel == spec.channel)
                    .collect()
            } else {
                let mut ids = Vec::with_capacity(spec.depends_on.len());
                for tag in &spec.depends_on {
                    let id = input_ids
                        .iter()
                        .copied()
                        .find(|id| &self.inputs[id.slot()].tag == tag)
                        .ok_or_else(|| GraphError::UnknownDependency {
                            component: name.clone(),
                            tag: tag.clone(),
                        })?;
                    ids.push(id);
                }
                ids
            };

            let id = OutPortId::from_usize(self.outputs.len());
            self.outputs.push(OutputPort {
                id,
                comp: comp_id,
                tag: spec.tag.clone(),
                channel: spec.channel,
                control: ControlState::On,
                coeffs: Coefficients::passthrough(associated.len()),
                inputs: associated,
                value: 0.0,
                path: None,
            });
            output_ids.push(id);
        }

        self.by_name.insert(name.clone(), comp_id);
        self.components.push(Component {
            id: comp_id,
            name,
            kind,
            outputs: output_ids,
            inputs: input_ids,
        });

        Ok(comp_id)
    }

    /// Build and validate the graph.
    pub fn build(self) -> GraphResult<PortGraph> {
        validate::validate_structure(&self.components, &self.outputs, &self.inputs)?;

        Ok(PortGraph {
            components: self.components,
            outputs: self.outputs,
            inputs: self.inputs,
            by_name: self.by_name,
        })
    }
}
