//! Command-line arguments

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cropwise_core::PredictionRequest;
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cropwise")]
#[command(about = "Crop recommendations from soil and climate measurements", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "cropwise.yaml", global = true)]
    pub config: String,

    /// Directory holding model artifacts
    #[arg(long, env = "CROPWISE_MODELS_DIR", global = true)]
    pub models_dir: Option<PathBuf>,

    /// YAML crop → soil constraint table (built-in table when omitted)
    #[arg(long, global = true)]
    pub constraints: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Recommend a crop for one set of measurements
    Predict(PredictArgs),

    /// List the model catalog and artifact status
    Models(ModelsArgs),
}

#[derive(Args, Debug, Default)]
pub struct PredictArgs {
    /// JSON request file ("-" for stdin); flags override its fields
    #[arg(short, long)]
    pub input: Option<String>,

    /// Nitrogen
    #[arg(long = "n", allow_negative_numbers = true)]
    pub nitrogen: Option<f64>,

    /// Phosphorus
    #[arg(long = "p", allow_negative_numbers = true)]
    pub phosphorus: Option<f64>,

    /// Potassium
    #[arg(long = "k", allow_negative_numbers = true)]
    pub potassium: Option<f64>,

    /// Temperature in °C
    #[arg(long, allow_negative_numbers = true)]
    pub temperature: Option<f64>,

    /// Relative humidity in %
    #[arg(long)]
    pub humidity: Option<f64>,

    /// Soil pH
    #[arg(long)]
    pub ph: Option<f64>,

    /// Rainfall in mm
    #[arg(long)]
    pub rainfall: Option<f64>,

    /// Soil type (sandy, loamy, clayey, black, red, alluvial)
    #[arg(long)]
    pub soil: Option<String>,

    /// Model to use, e.g. "Naive Bayes" or "XGBoost"
    #[arg(short, long)]
    pub model: Option<String>,

    /// Print compact JSON
    #[arg(long)]
    pub compact: bool,
}

#[derive(Args, Debug, Default)]
pub struct ModelsArgs {
    /// Load every model and report failures
    #[arg(long)]
    pub check: bool,
}

impl PredictArgs {
    /// Build the request from the input file (if any) and flags
    pub fn to_request(&self) -> Result<PredictionRequest> {
        let mut request = match &self.input {
            Some(path) => read_request(path)?,
            None => PredictionRequest::default(),
        };

        let overrides = [
            (&mut request.nitrogen, self.nitrogen),
            (&mut request.phosphorus, self.phosphorus),
            (&mut request.potassium, self.potassium),
            (&mut request.temperature, self.temperature),
            (&mut request.humidity, self.humidity),
            (&mut request.ph, self.ph),
            (&mut request.rainfall, self.rainfall),
        ];
        for (field, flag) in overrides {
            if let Some(value) = flag {
                // JSON has no NaN/inf; keep them as text so validation reports them
                *field = Some(if value.is_finite() {
                    Value::from(value)
                } else {
                    Value::String(value.to_string())
                });
            }
        }

        if let Some(soil) = &self.soil {
            request.soil_type = Some(soil.clone());
        }
        if let Some(model) = &self.model {
            request.model_choice = Some(model.clone());
        }

        Ok(request)
    }
}

fn read_request(path: &str) -> Result<PredictionRequest> {
    let content = if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path))?
    };

    serde_json::from_str(&content).with_context(|| format!("{} is not a valid request", path))
}
