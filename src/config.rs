use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::operations::rehost::DEFAULT_BAND_TOLERANCE;
use crate::operations::transpose::DEFAULT_OFFSET_TOLERANCE;

/// Where each layer element is placed relative to the source path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementStrategy {
    /// Each layer sits on its own band; together they tile the original thickness.
    #[default]
    Adjacent,
    /// Every layer sits on the source path; bands overlap.
    Coincident,
}

/// How the `flipped` flag of created elements is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlipPolicy {
    /// Copy the source element's flag.
    #[default]
    Preserve,
    /// Toggle the flag for layers placed on the interior side of the path.
    /// Only applied with [`PlacementStrategy::Adjacent`].
    ToggleOnInteriorSide,
}

/// What happens to the source element once its layers exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    /// Leave the source element in the model.
    Keep,
    /// Remove it; any blocker aborts the decomposition.
    #[default]
    Remove,
    /// Ask the host to release blockers first, then remove.
    ForceRemove,
}

/// Length tolerances in model units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Offsets smaller than this leave the path untouched.
    pub offset: f64,
    /// Widening applied to each layer band when matching instances.
    pub band: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            offset: DEFAULT_OFFSET_TOLERANCE,
            band: DEFAULT_BAND_TOLERANCE,
        }
    }
}

/// Rules for generated single-layer type names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Adopt existing types by generated name. Structural-key caching works without it.
    pub enabled: bool,
    /// Factor from model length units to display units.
    pub display_scale: f64,
    pub display_suffix: String,
    pub display_precision: usize,
    pub max_base_len: usize,
    pub max_name_len: usize,
    pub max_attempts: usize,
    pub layer_label: String,
    pub no_material_label: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            display_scale: 304.8,
            display_suffix: "mm".to_owned(),
            display_precision: 0,
            max_base_len: 60,
            max_name_len: 200,
            max_attempts: 50,
            layer_label: "Layer".to_owned(),
            no_material_label: "No material".to_owned(),
        }
    }
}

/// Options for one decomposition run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecomposeConfig {
    pub placement: PlacementStrategy,
    pub flip: FlipPolicy,
    pub removal: RemovalPolicy,
    pub tolerances: Tolerances,
    pub naming: NamingConfig,
    /// Decimal places of the width component of a type cache key.
    pub width_key_precision: usize,
}

impl Default for DecomposeConfig {
    fn default() -> Self {
        Self {
            placement: PlacementStrategy::default(),
            flip: FlipPolicy::default(),
            removal: RemovalPolicy::default(),
            tolerances: Tolerances::default(),
            naming: NamingConfig::default(),
            width_key_precision: 6,
        }
    }
}

impl DecomposeConfig {
    /// Parses and validates a JSON configuration. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or fails [`Self::validate`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = |name: &str, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )))
            }
        };
        non_negative("tolerances.offset", self.tolerances.offset)?;
        non_negative("tolerances.band", self.tolerances.band)?;

        let naming = &self.naming;
        if !(naming.display_scale.is_finite() && naming.display_scale > 0.0) {
            return Err(ConfigError::Invalid(
                "naming.display_scale must be positive".to_owned(),
            ));
        }
        if naming.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "naming.max_attempts must be at least 1".to_owned(),
            ));
        }
        if naming.max_base_len == 0 || naming.max_name_len == 0 {
            return Err(ConfigError::Invalid(
                "naming length limits must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}
