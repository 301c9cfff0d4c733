//! Fluid domains and their sub-channels.

use std::fmt;

/// Tag carried by junction ports until a path claims them.
pub const WILDCARD: &str = "*";

/// The quantity a port carries.
///
/// Air bundles carry two sub-channels (temperature and humidity) over the same
/// physical flow; water bundles carry one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    AirTemperature,
    AirHumidity,
    Water,
}

impl Channel {
    /// Port tag a component uses for this channel when nothing else is requested.
    pub fn default_tag(self) -> &'static str {
        match self {
            Channel::AirTemperature => "t",
            Channel::AirHumidity => "x",
            Channel::Water => "W",
        }
    }

    /// True for the channel that owns the flow variable of its fluid.
    pub fn is_primary(self) -> bool {
        !matches!(self, Channel::AirHumidity)
    }

    pub fn fluid(self) -> Fluid {
        match self {
            Channel::AirTemperature | Channel::AirHumidity => Fluid::Air,
            Channel::Water => Fluid::Water,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Channel::AirTemperature => "air-temperature",
            Channel::AirHumidity => "air-humidity",
            Channel::Water => "water",
        };
        f.write_str(label)
    }
}

/// Fluid/control domain of a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fluid {
    Water,
    Air,
}

impl Fluid {
    /// Sub-channels in sweep order; the primary channel comes first.
    pub fn channels(self) -> &'static [Channel] {
        match self {
            Fluid::Water => &[Channel::Water],
            Fluid::Air => &[Channel::AirTemperature, Channel::AirHumidity],
        }
    }
}

impl fmt::Display for Fluid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fluid::Water => f.write_str("water"),
            Fluid::Air => f.write_str("air"),
        }
    }
}

/// Alternate spelling used by two-stream components (wet side `W`/`w` is also `V`/`v`).
pub fn synonym(tag: &str) -> Option<&'static str> {
    match tag {
        "W" => Some("V"),
        "V" => Some("W"),
        "w" => Some("v"),
        "v" => Some("w"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tags() {
        assert_eq!(Channel::AirTemperature.default_tag(), "t");
        assert_eq!(Channel::AirHumidity.default_tag(), "x");
        assert_eq!(Channel::Water.default_tag(), "W");
    }

    #[test]
    fn air_has_two_channels_primary_first() {
        let chans = Fluid::Air.channels();
        assert_eq!(chans.len(), 2);
        assert!(chans[0].is_primary());
        assert!(!chans[1].is_primary());
        assert_eq!(chans[1].fluid(), Fluid::Air);
    }

    #[test]
    fn synonyms_are_symmetric() {
        for tag in ["W", "V", "w", "v"] {
            let other = synonym(tag).unwrap();
            assert_eq!(synonym(other), Some(tag));
        }
        assert_eq!(synonym("t"), None);
    }
}
