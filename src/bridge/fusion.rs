//! Fusion mode tags.
//!
//! Activation is total: every tag, known or not, maps to a description.

use std::fmt;

/// A named fusion capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FusionMode {
    HyperCreationEngine,
    ChronoSculptor,
    AdaptiveGenesis,
    InterfaceForge,
    /// Any tag without a dedicated description.
    Other(String),
}

impl FusionMode {
    /// Parse a tag. Never fails.
    pub fn parse(tag: &str) -> Self {
        match tag {
            "hyper_creation_engine" => Self::HyperCreationEngine,
            "chrono_sculptor" => Self::ChronoSculptor,
            "adaptive_genesis" => Self::AdaptiveGenesis,
            "interface_forge" => Self::InterfaceForge,
            other => Self::Other(other.to_string()),
        }
    }

    /// The wire tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::HyperCreationEngine => "hyper_creation_engine",
            Self::ChronoSculptor => "chrono_sculptor",
            Self::AdaptiveGenesis => "adaptive_genesis",
            Self::InterfaceForge => "interface_forge",
            Self::Other(tag) => tag,
        }
    }

    /// Human-readable activation description.
    pub fn description(&self) -> String {
        match self {
            Self::HyperCreationEngine => {
                "Real-time code synthesis and UI prototyping activated".to_string()
            }
            Self::ChronoSculptor => {
                "Deep code analysis with animation perfection engaged".to_string()
            }
            Self::AdaptiveGenesis => "Multi-dimensional context understanding online".to_string(),
            Self::InterfaceForge => "Revolutionary UI paradigm creation ready".to_string(),
            Self::Other(tag) => format!("Fusion {} activated", tag),
        }
    }
}

impl fmt::Display for FusionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_modes() {
        assert_eq!(FusionMode::parse("chrono_sculptor"), FusionMode::ChronoSculptor);
        assert_eq!(
            FusionMode::ChronoSculptor.description(),
            "Deep code analysis with animation perfection engaged"
        );
        assert_eq!(
            FusionMode::parse("interface_forge").description(),
            "Revolutionary UI paradigm creation ready"
        );
    }

    #[test]
    fn test_unknown_mode_gets_generic_description() {
        let mode = FusionMode::parse("quantum_loom");
        assert_eq!(mode, FusionMode::Other("quantum_loom".into()));
        assert_eq!(mode.description(), "Fusion quantum_loom activated");
        assert_eq!(mode.as_str(), "quantum_loom");
    }

    #[test]
    fn test_tag_round_trips_through_display() {
        for tag in ["hyper_creation_engine", "adaptive_genesis", "x"] {
            assert_eq!(FusionMode::parse(tag).to_string(), tag);
        }
    }
}
