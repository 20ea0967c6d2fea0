//! Run configuration for the diffusion SDEs
//!
//! A configuration is usually read from JSON:
//!
//! ```ignore
//! use scoresde::SdeConfig;
//!
//! let config = SdeConfig::from_json(r#"{
//!     "T": 1.0,
//!     "interval": 100,
//!     "sde_type": "ve",
//!     "sigma_min": 0.01,
//!     "sigma_max": 50.0
//! }"#)?;
//! assert_eq!(config.dt(), 0.01);
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SdeError;
use crate::simulator::kernel::VeSchedule;

/// The diffusion schedule selected by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum SdeType {
    /// Variance exploding, `sigma_min` at `t = 0` up to `sigma_max` at `t = 1`
    Ve,
    /// Variance exploding, folded around `t = 0.5`
    Ve2,
    /// Constant diffusion `var`
    Simple,
}

impl SdeType {
    pub const ALL: [SdeType; 3] = [SdeType::Ve, SdeType::Ve2, SdeType::Simple];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ve => "ve",
            Self::Ve2 => "ve2",
            Self::Simple => "simple",
        }
    }
}

impl std::fmt::Display for SdeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SdeType {
    type Err = SdeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| SdeError::UnknownSdeType(s.to_string()))
    }
}

impl TryFrom<String> for SdeType {
    type Error = SdeError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

/// How the surrounding training loop drives the sampler.
///
/// Only affects progress reporting, see [`crate::simulator::progress::ProgressTracker::for_train_method`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainMethod {
    #[default]
    Alternate,
    Joint,
}

impl std::fmt::Display for TrainMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alternate => write!(f, "alternate"),
            Self::Joint => write!(f, "joint"),
        }
    }
}

impl FromStr for TrainMethod {
    type Err = SdeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alternate" => Ok(Self::Alternate),
            "joint" => Ok(Self::Joint),
            other => Err(SdeError::UnknownTrainMethod(other.to_string())),
        }
    }
}

/// Configuration of one SDE instance
///
/// Immutable once handed to [`crate::build`]; the step size is derived as `T / interval`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SdeConfig {
    /// Total horizon
    #[serde(rename = "T")]
    pub horizon: f64,
    /// Number of steps over the horizon
    pub interval: usize,
    pub sde_type: SdeType,
    pub sigma_min: f64,
    pub sigma_max: f64,
    /// Constant diffusion used by [`SdeType::Simple`]
    pub var: f64,
    pub train_method: TrainMethod,
}

impl Default for SdeConfig {
    fn default() -> Self {
        Self {
            horizon: 1.0,
            interval: 100,
            sde_type: SdeType::Ve,
            sigma_min: 0.01,
            sigma_max: 50.0,
            var: 1.0,
            train_method: TrainMethod::Alternate,
        }
    }
}

impl SdeConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    ///
    /// An unrecognized `sde_type` name fails with [`SdeError::UnknownSdeType`].
    pub fn from_json(json: &str) -> Result<Self, SdeError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if let Some(name) = value.get("sde_type").and_then(|v| v.as_str()) {
            name.parse::<SdeType>()?;
        }
        let config: SdeConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn new(sde_type: SdeType) -> Self {
        Self {
            sde_type,
            ..Self::default()
        }
    }

    pub fn horizon(mut self, horizon: f64) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn interval(mut self, interval: usize) -> Self {
        self.interval = interval;
        self
    }

    pub fn sigmas(mut self, sigma_min: f64, sigma_max: f64) -> Self {
        self.sigma_min = sigma_min;
        self.sigma_max = sigma_max;
        self
    }

    pub fn var(mut self, var: f64) -> Self {
        self.var = var;
        self
    }

    pub fn train_method(mut self, train_method: TrainMethod) -> Self {
        self.train_method = train_method;
        self
    }

    /// Step size `T / interval`
    pub fn dt(&self) -> f64 {
        self.horizon / self.interval as f64
    }

    /// Check the horizon, the step count and the parameters of the selected variant.
    pub fn validate(&self) -> Result<(), SdeError> {
        if !self.horizon.is_finite() || self.horizon <= 0.0 {
            return Err(SdeError::InvalidHorizon(self.horizon));
        }
        if self.interval == 0 {
            return Err(SdeError::ZeroInterval);
        }
        match self.sde_type {
            SdeType::Ve | SdeType::Ve2 => {
                VeSchedule::new(self.sigma_min, self.sigma_max)?;
            }
            SdeType::Simple => {
                if !self.var.is_finite() || self.var < 0.0 {
                    return Err(SdeError::InvalidScale(self.var));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = SdeConfig::from_json(r#"{ "T": 2.0, "interval": 40, "sde_type": "ve2" }"#)
            .unwrap();
        assert_eq!(config.horizon, 2.0);
        assert_eq!(config.interval, 40);
        assert_eq!(config.sde_type, SdeType::Ve2);
        assert_eq!(config.sigma_min, 0.01);
        assert_eq!(config.train_method, TrainMethod::Alternate);
        assert_eq!(config.dt(), 0.05);
    }

    #[test]
    fn test_unknown_sde_type_in_json_is_rejected() {
        let err = SdeConfig::from_json(r#"{ "sde_type": "vp" }"#).unwrap_err();
        assert!(matches!(err, SdeError::UnknownSdeType(name) if name == "vp"));

        // Plain serde goes through the same name table
        let err = serde_json::from_str::<SdeConfig>(r#"{ "sde_type": "subvp" }"#).unwrap_err();
        assert!(err.to_string().contains("Unknown SDE type 'subvp'"));

        // A non-string type is a parse error
        let err = SdeConfig::from_json(r#"{ "sde_type": 3 }"#).unwrap_err();
        assert!(matches!(err, SdeError::Config(_)));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = SdeConfig::from_json(r#"{ "sigma": 1.0 }"#).unwrap_err();
        assert!(matches!(err, SdeError::Config(_)));
    }

    #[test]
    fn test_sde_type_names() {
        for kind in SdeType::ALL {
            assert_eq!(kind.to_string().parse::<SdeType>().unwrap(), kind);
        }
        assert!(matches!(
            "subvp".parse::<SdeType>(),
            Err(SdeError::UnknownSdeType(name)) if name == "subvp"
        ));
    }

    #[test]
    fn test_train_method_names() {
        assert_eq!("joint".parse::<TrainMethod>().unwrap(), TrainMethod::Joint);
        assert_eq!(
            "alternate".parse::<TrainMethod>().unwrap(),
            TrainMethod::Alternate
        );
        assert!("both".parse::<TrainMethod>().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_horizon_and_interval() {
        assert!(matches!(
            SdeConfig::default().horizon(0.0).validate(),
            Err(SdeError::InvalidHorizon(_))
        ));
        assert!(matches!(
            SdeConfig::default().horizon(f64::NAN).validate(),
            Err(SdeError::InvalidHorizon(_))
        ));
        assert!(matches!(
            SdeConfig::default().interval(0).validate(),
            Err(SdeError::ZeroInterval)
        ));
    }

    #[test]
    fn test_validate_checks_only_the_selected_variant() {
        // Bounds are irrelevant for the simple variant
        let simple = SdeConfig::new(SdeType::Simple).sigmas(5.0, 1.0).var(2.0);
        assert!(simple.validate().is_ok());
        assert!(matches!(
            simple.var(-1.0).validate(),
            Err(SdeError::InvalidScale(_))
        ));

        let ve = SdeConfig::new(SdeType::Ve).sigmas(5.0, 1.0);
        assert!(matches!(
            ve.validate(),
            Err(SdeError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn test_serialize_uses_capital_t() {
        let json = serde_json::to_string(&SdeConfig::default()).unwrap();
        assert!(json.contains("\"T\":1.0"));
        assert!(json.contains("\"sde_type\":\"ve\""));
    }
}
