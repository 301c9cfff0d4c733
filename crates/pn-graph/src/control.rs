//! Output-port control states.

use std::fmt;

/// Control state of an output port (and of a logical path).
///
/// External equipment models and the outer control loop set these each step;
/// the propagator only reads them, except for diverge junction outputs which it
/// forces to `Off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ControlState {
    #[default]
    On,
    Off,
    /// Output value fixed by a load/setpoint controller.
    LoadControlled,
    Bypass,
    /// Batch operation: the path seeds itself from its leading element.
    Batch,
}

impl ControlState {
    pub fn is_off(self) -> bool {
        matches!(self, ControlState::Off)
    }

    /// Load-controlled and bypass outputs terminate the upstream chain.
    pub fn is_boundary(self) -> bool {
        matches!(self, ControlState::LoadControlled | ControlState::Bypass)
    }
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ControlState::On => "ON",
            ControlState::Off => "OFF",
            ControlState::LoadControlled => "LOAD",
            ControlState::Bypass => "BYPASS",
            ControlState::Batch => "BATCH",
        };
        f.write_str(label)
    }
}
