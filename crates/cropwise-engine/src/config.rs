//! Prediction pipeline configuration

use crate::smoothing::SmoothingParams;
use cropwise_classifiers::{ConfidenceTier, ModelKind};
use cropwise_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Settings for the prediction pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Model used when a request names none
    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default)]
    pub smoothing: SmoothingConfig,

    #[serde(default)]
    pub filter: FilterConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            smoothing: SmoothingConfig::default(),
            filter: FilterConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Check every section
    pub fn validate(&self) -> Result<()> {
        if self.default_model.trim().is_empty() {
            return Err(Error::config("default_model must not be empty"));
        }
        self.smoothing.validate()?;
        self.filter.validate()
    }
}

/// Temperature smoothing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Temperature for models that routinely saturate at ~100%
    #[serde(default = "default_overconfident_temperature")]
    pub overconfident_temperature: f64,

    /// Temperature for models with reasonably spread output
    #[serde(default = "default_balanced_temperature")]
    pub balanced_temperature: f64,

    /// Minimum match percentage per candidate
    #[serde(default = "default_floor_pct")]
    pub floor_pct: f64,

    /// Tier overrides by model name (case-insensitive)
    #[serde(default = "default_tiers")]
    pub tiers: BTreeMap<String, ConfidenceTier>,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            overconfident_temperature: default_overconfident_temperature(),
            balanced_temperature: default_balanced_temperature(),
            floor_pct: default_floor_pct(),
            tiers: default_tiers(),
        }
    }
}

impl SmoothingConfig {
    /// Confidence tier for a model name.
    ///
    /// Explicit overrides win; catalog models then use their default tier and
    /// anything else is treated as balanced.
    pub fn tier_for(&self, model: &str) -> ConfidenceTier {
        let wanted = model.trim();
        self.tiers
            .iter()
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(wanted))
            .map(|(_, tier)| *tier)
            .or_else(|| ModelKind::from_name(wanted).map(|kind| kind.default_tier()))
            .unwrap_or(ConfidenceTier::Balanced)
    }

    /// Temperature applied to a model's output
    pub fn temperature_for(&self, model: &str) -> f64 {
        match self.tier_for(model) {
            ConfidenceTier::Overconfident => self.overconfident_temperature,
            ConfidenceTier::Balanced => self.balanced_temperature,
        }
    }

    /// Smoothing parameters for a model
    pub fn params_for(&self, model: &str) -> SmoothingParams {
        SmoothingParams::new(self.temperature_for(model), self.floor_pct)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, t) in [
            ("overconfident_temperature", self.overconfident_temperature),
            ("balanced_temperature", self.balanced_temperature),
        ] {
            if !(t.is_finite() && t > 0.0) {
                return Err(Error::config(format!("smoothing.{} must be positive, got {}", name, t)));
            }
        }
        if !(self.floor_pct.is_finite() && (0.0..100.0).contains(&self.floor_pct)) {
            return Err(Error::config(format!(
                "smoothing.floor_pct must be in [0, 100), got {}",
                self.floor_pct
            )));
        }
        Ok(())
    }
}

/// Candidate generation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Highest-probability classes considered before soil filtering
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Candidates kept after soil filtering
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_candidates: default_max_candidates(),
        }
    }
}

impl FilterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 || self.max_candidates == 0 {
            return Err(Error::config("filter.top_k and filter.max_candidates must be non-zero"));
        }
        if self.max_candidates > self.top_k {
            return Err(Error::config(format!(
                "filter.max_candidates ({}) must not exceed filter.top_k ({})",
                self.max_candidates, self.top_k
            )));
        }
        Ok(())
    }
}

fn default_model() -> String {
    ModelKind::BASELINE.display_name().to_string()
}

fn default_overconfident_temperature() -> f64 {
    4.0
}

fn default_balanced_temperature() -> f64 {
    2.5
}

fn default_floor_pct() -> f64 {
    5.0
}

fn default_tiers() -> BTreeMap<String, ConfidenceTier> {
    BTreeMap::from([(
        ModelKind::NaiveBayes.display_name().to_string(),
        ConfidenceTier::Overconfident,
    )])
}

fn default_top_k() -> usize {
    10
}

fn default_max_candidates() -> usize {
    5
}
