//! Cropwise CLI
//!
//! Recommends a crop for a soil sample and local climate, using a
//! trained classifier from the models directory followed by
//! soil-compatibility filtering and confidence smoothing.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{debug, info};

mod cli;
mod config;

use cli::{Cli, Command, ModelsArgs, PredictArgs};
use config::ServiceConfig;
use cropwise_classifiers::{FsArtifactSource, ModelKind, ModelRegistry};
use cropwise_engine::CropPredictor;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);
    cropwise_telemetry::describe_metrics();

    // Load configuration
    let config = ServiceConfig::load(&cli.config, &cli)?;
    debug!(
        models_dir = %config.models_dir.display(),
        default_model = %config.engine.default_model,
        "Configuration loaded"
    );

    match &cli.command {
        Command::Predict(args) => predict(&config, args).await,
        Command::Models(args) => models(&config, args).await,
    }
}

async fn open_registry(config: &ServiceConfig) -> Result<Arc<ModelRegistry>> {
    let source = FsArtifactSource::new(&config.models_dir);
    let registry = ModelRegistry::open(Arc::new(source)).await?;
    Ok(Arc::new(registry))
}

async fn predict(config: &ServiceConfig, args: &PredictArgs) -> Result<()> {
    let request = args.to_request()?;

    let constraints = Arc::new(config.constraint_table()?);
    let registry = open_registry(config).await?;
    let predictor = CropPredictor::new(registry, constraints, config.engine.clone())?;

    let result = predictor.predict_request(&request).await?;
    info!(
        crop = %result.recommended_crop,
        logic = %result.logic,
        "Prediction complete"
    );
    debug!(metrics = ?predictor.metrics().snapshot(), "Pipeline metrics");

    let output = if args.compact {
        serde_json::to_string(&result)?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    println!("{}", output);
    Ok(())
}

async fn models(config: &ServiceConfig, args: &ModelsArgs) -> Result<()> {
    let registry = open_registry(config).await?;
    let smoothing = &config.engine.smoothing;

    println!("Models directory: {}", config.models_dir.display());
    println!("Classes: {}", registry.label_encoder().len());
    println!(
        "Fallback artifact: {}",
        if registry.has_fallback().await { "present" } else { "missing" }
    );
    if let Some(active) = registry.active_model().await? {
        println!("Fallback trained as: {}", active);
    }
    println!();

    println!(
        "{:<14} {:<20} {:<10} {:<14} {:>5}",
        "MODEL", "ARTIFACT", "SOURCE", "TIER", "T"
    );
    for entry in registry.availability().await {
        let name = entry.kind.display_name();
        println!(
            "{:<14} {:<20} {:<10} {:<14} {:>5.1}",
            name,
            entry.kind.artifact_name(),
            if entry.dedicated { "dedicated" } else { "fallback" },
            format!("{:?}", smoothing.tier_for(name)).to_lowercase(),
            smoothing.temperature_for(name),
        );
    }

    println!();
    println!(
        "{:<14} {:>9} {:>10} {:>9}",
        "EVALUATION", "ACCURACY", "PRECISION", "F1"
    );
    for row in registry.metrics_summary().await? {
        println!(
            "{:<14} {:>9.2} {:>10.2} {:>9.2}",
            row.model, row.accuracy, row.precision, row.f1_score
        );
    }

    if args.check {
        println!();
        let ready = registry.preload().await;
        for kind in ModelKind::ALL {
            let status = match registry.resolve_kind(kind).await {
                Ok(loaded) => format!("ok ({})", loaded.artifact),
                Err(e) => format!("failed: {}", e),
            };
            println!("{:<14} {}", kind.display_name(), status);
        }
        println!(
            "{} of {} models ready, {} artifacts decoded",
            ready,
            ModelKind::ALL.len(),
            registry.load_count()
        );
    }

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("cropwise=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cropwise=info"))
    };

    // Results go to stdout, logs to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
