//! Core types for Cropwise

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Number of numeric features every classifier consumes
pub const FEATURE_COUNT: usize = 7;

/// Feature names in the order classifiers expect them
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"];

/// Ordered numeric feature vector fed to classifiers
pub type FeatureVector = [f64; FEATURE_COUNT];

/// Soil composition categories understood by the recommender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoilType {
    Sandy,
    Loamy,
    Clayey,
    Black,
    Red,
    Alluvial,
}

impl SoilType {
    /// All soil types, in declaration order
    pub const ALL: [SoilType; 6] = [
        Self::Sandy,
        Self::Loamy,
        Self::Clayey,
        Self::Black,
        Self::Red,
        Self::Alluvial,
    ];

    /// Lowercase name as used in requests and constraint files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sandy => "sandy",
            Self::Loamy => "loamy",
            Self::Clayey => "clayey",
            Self::Black => "black",
            Self::Red => "red",
            Self::Alluvial => "alluvial",
        }
    }
}

impl Default for SoilType {
    fn default() -> Self {
        Self::Loamy
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SoilType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|soil| soil.as_str() == normalized)
            .ok_or_else(|| {
                Error::validation(format!(
                    "unknown soil type '{}' (expected one of: sandy, loamy, clayey, black, red, alluvial)",
                    s.trim()
                ))
            })
    }
}

/// One validated set of soil and climate measurements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Nitrogen content
    #[serde(rename = "N")]
    pub nitrogen: f64,

    /// Phosphorus content
    #[serde(rename = "P")]
    pub phosphorus: f64,

    /// Potassium content
    #[serde(rename = "K")]
    pub potassium: f64,

    /// Air temperature (°C)
    pub temperature: f64,

    /// Relative humidity (%)
    pub humidity: f64,

    /// Soil pH
    pub ph: f64,

    /// Rainfall (mm)
    pub rainfall: f64,

    /// Soil composition
    #[serde(default)]
    pub soil_type: SoilType,
}

impl FeatureRecord {
    /// Feature vector in classifier order (N, P, K, temperature, humidity, ph, rainfall)
    pub fn features(&self) -> FeatureVector {
        [
            self.nitrogen,
            self.phosphorus,
            self.potassium,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        ]
    }

    /// Mean of the three macronutrients
    pub fn mean_npk(&self) -> f64 {
        (self.nitrogen + self.phosphorus + self.potassium) / 3.0
    }
}

/// Raw prediction request as received from a caller.
///
/// Numeric fields are kept as JSON values so that missing and non-numeric
/// inputs can be reported precisely by [`PredictionRequest::validate`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictionRequest {
    #[serde(rename = "N", default)]
    pub nitrogen: Option<Value>,

    #[serde(rename = "P", default)]
    pub phosphorus: Option<Value>,

    #[serde(rename = "K", default)]
    pub potassium: Option<Value>,

    #[serde(default)]
    pub temperature: Option<Value>,

    #[serde(default)]
    pub humidity: Option<Value>,

    #[serde(default)]
    pub ph: Option<Value>,

    #[serde(default)]
    pub rainfall: Option<Value>,

    /// Soil type; defaults to loamy when absent
    #[serde(default)]
    pub soil_type: Option<String>,

    /// Requested classifier name; the service default applies when absent
    #[serde(default)]
    pub model_choice: Option<String>,
}

impl PredictionRequest {
    /// Build a request from already-numeric measurements
    #[allow(clippy::too_many_arguments)]
    pub fn from_values(
        nitrogen: f64,
        phosphorus: f64,
        potassium: f64,
        temperature: f64,
        humidity: f64,
        ph: f64,
        rainfall: f64,
    ) -> Self {
        Self {
            nitrogen: Some(Value::from(nitrogen)),
            phosphorus: Some(Value::from(phosphorus)),
            potassium: Some(Value::from(potassium)),
            temperature: Some(Value::from(temperature)),
            humidity: Some(Value::from(humidity)),
            ph: Some(Value::from(ph)),
            rainfall: Some(Value::from(rainfall)),
            soil_type: None,
            model_choice: None,
        }
    }

    /// Set the soil type
    pub fn with_soil(mut self, soil: impl Into<String>) -> Self {
        self.soil_type = Some(soil.into());
        self
    }

    /// Set the requested model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_choice = Some(model.into());
        self
    }

    /// Requested model name, if any
    pub fn model_name(&self) -> Option<&str> {
        self.model_choice.as_deref()
    }

    /// Validate every field and produce an immutable feature record
    pub fn validate(&self) -> Result<FeatureRecord> {
        let soil_type = match &self.soil_type {
            Some(soil) => soil.parse()?,
            None => SoilType::default(),
        };

        Ok(FeatureRecord {
            nitrogen: numeric_field("N", self.nitrogen.as_ref())?,
            phosphorus: numeric_field("P", self.phosphorus.as_ref())?,
            potassium: numeric_field("K", self.potassium.as_ref())?,
            temperature: numeric_field("temperature", self.temperature.as_ref())?,
            humidity: numeric_field("humidity", self.humidity.as_ref())?,
            ph: numeric_field("ph", self.ph.as_ref())?,
            rainfall: numeric_field("rainfall", self.rainfall.as_ref())?,
            soil_type,
        })
    }
}

fn numeric_field(name: &str, value: Option<&Value>) -> Result<f64> {
    let parsed = match value {
        None | Some(Value::Null) => {
            return Err(Error::validation(format!("missing required field '{}'", name)))
        }
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(Error::validation(format!(
            "field '{}' must be a finite number, got {}",
            name,
            value.map(Value::to_string).unwrap_or_default()
        ))),
    }
}

/// A soil-compatible crop candidate with its raw classifier probability
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Crop name as stored in the label encoder
    pub crop: String,

    /// Raw class probability from the classifier (0.0-1.0)
    pub probability: f64,
}

impl Candidate {
    /// Create a new candidate
    pub fn new(crop: impl Into<String>, probability: f64) -> Self {
        Self {
            crop: crop.into(),
            probability,
        }
    }
}

/// One ranked entry of a prediction result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropMatch {
    /// 1-based rank
    pub rank: usize,

    /// Crop name
    pub crop: String,

    /// Smoothed match percentage (one decimal place)
    pub match_pct: f64,
}

/// Qualitative bucket of the mean N/P/K level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NutrientLevel {
    #[serde(rename = "High (Fertile)")]
    High,
    #[serde(rename = "Medium (Average)")]
    Medium,
    #[serde(rename = "Low (Poor)")]
    Low,
}

/// Water stress label derived from rainfall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaterStress {
    Low,
    High,
}

/// pH suitability label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhSuitability {
    Optimal,
    #[serde(rename = "Sub-optimal")]
    SubOptimal,
}

/// Informational agronomic scores for the recommended crop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgronomicMetrics {
    pub nutrient_index: NutrientLevel,

    /// Land suitability rating, 0-100, two decimals
    pub suitability_score: f64,

    pub water_stress: WaterStress,

    pub ph_suitability: PhSuitability,
}

/// Complete answer to one prediction request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Rank-1 crop, or a "no suitable match" message
    pub recommended_crop: String,

    /// Remaining candidates in rank order
    pub other_valid_options: Vec<String>,

    /// Ranked matches whose percentages total 100.0
    pub crop_matches: Vec<CropMatch>,

    /// Agronomic metrics for the recommended crop; `None` when nothing matched
    pub metrics: Option<AgronomicMetrics>,

    /// Description of the model and post-processing applied
    pub logic: String,
}

impl PredictionResult {
    /// Whether any candidate survived soil filtering
    pub fn has_match(&self) -> bool {
        !self.crop_matches.is_empty()
    }
}
