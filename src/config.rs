//! Tunable parameters of the editor
use crate::Scalar;

/// Real world dimensions of the manufactured part
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Dimensions {
    /// Length in millimeters, normalized unit length maps to it on export
    pub length: Scalar,
    /// How much depth profiles are scaled up for visibility
    pub depth_scale: Scalar,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            length: 150.0,
            depth_scale: 10.0,
        }
    }
}

/// Sampling density used by the 3D preview
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct MeshConfig {
    /// Maximum subdivision count of a cross-section segment
    pub section_subdivisions: usize,
    /// Number of samples per segment taken from depth profiles
    pub profile_samples: usize,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            section_subdivisions: 100,
            profile_samples: 30,
        }
    }
}

/// Editing heuristics
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct EditConfig {
    /// Hover radius relative to the smaller viewport side, also the tangent
    /// length below which a tangent is treated as a kink
    pub tolerance: Scalar,
    /// Number of chords used to estimate segment length
    pub length_samples: usize,
    /// Subdivision count of freshly created handles
    pub default_subdivisions: usize,
    /// Distance (in samples) between ribs of the 3D preview
    pub rib_stride: usize,
    /// Camera elevation limit in degrees
    pub phi_limit: Scalar,
    /// Camera rotation in radians per smaller viewport side dragged
    pub orbit_sensitivity: Scalar,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            tolerance: 2e-2,
            length_samples: 10,
            default_subdivisions: 5,
            rib_stride: 5,
            phi_limit: 80.0,
            orbit_sensitivity: 2.0,
        }
    }
}

/// Display widths relative to the smaller viewport side
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct DisplayConfig {
    /// Base width of strokes and control point radius
    pub path_width: Scalar,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            path_width: 1.0 / 200.0,
        }
    }
}

/// All editor parameters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Config {
    pub dimensions: Dimensions,
    pub mesh: MeshConfig,
    pub edit: EditConfig,
    pub display: DisplayConfig,
}

#[cfg(feature = "serde")]
impl Config {
    /// Load configuration from JSON, missing fields take their default values
    pub fn from_json(text: &str) -> Result<Self, crate::Error> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.dimensions.length, 150.0);
        assert_eq!(config.dimensions.depth_scale, 10.0);
        assert_eq!(config.mesh.profile_samples, 30);
        assert_eq!(config.edit.tolerance, 2e-2);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json() -> Result<(), crate::Error> {
        let config = Config::from_json(r#"{"dimensions": {"length": 200}, "edit": {"tolerance": 0.05}}"#)?;
        assert_eq!(config.dimensions.length, 200.0);
        assert_eq!(config.dimensions.depth_scale, 10.0);
        assert_eq!(config.edit.tolerance, 0.05);
        assert_eq!(config.mesh, MeshConfig::default());

        assert!(matches!(
            Config::from_json("{\"edit\": 3}"),
            Err(crate::Error::Json(_))
        ));
        Ok(())
    }
}
