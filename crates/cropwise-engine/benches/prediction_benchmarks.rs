//! Latency benchmarks for the post-classifier pipeline
//!
//! Run with: cargo bench -p cropwise-engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use tokio::runtime::Runtime;

use cropwise_classifiers::{
    ClassifierArtifact, ClassifierSpec, LabelEncoder, LabelEncoderArtifact, LinearParams,
    MemoryArtifactSource, ModelRegistry, FALLBACK_ARTIFACT, LABEL_ENCODER_ARTIFACT,
};
use cropwise_core::{Candidate, PredictionRequest, SoilType};
use cropwise_engine::{
    smooth, CandidateFilter, ConstraintTable, CropPredictor, EngineConfig, FilterConfig,
    SmoothingParams,
};

const CROPS: [&str; 22] = [
    "apple", "banana", "blackgram", "chickpea", "coconut", "coffee", "cotton", "grapes", "jute",
    "kidneybeans", "lentil", "maize", "mango", "mothbeans", "mungbean", "muskmelon", "orange",
    "papaya", "pigeonpeas", "pomegranate", "rice", "watermelon",
];

fn saturated_distribution() -> Vec<f64> {
    let mut probs = vec![1e-6; CROPS.len()];
    probs[20] = 0.97;
    probs[11] = 0.02;
    probs[10] = 0.005;
    let sum: f64 = probs.iter().sum();
    probs.iter().map(|p| p / sum).collect()
}

/// Filter + smoothing for one probability vector
fn benchmark_post_processing(c: &mut Criterion) {
    let encoder = LabelEncoder::from_classes(CROPS).expect("valid encoder");
    let filter = CandidateFilter::new(Arc::new(ConstraintTable::builtin()), &FilterConfig::default());
    let probs = saturated_distribution();

    let mut group = c.benchmark_group("Post_Processing");
    group.sample_size(100);

    for soil in [SoilType::Loamy, SoilType::Clayey, SoilType::Red] {
        group.bench_with_input(BenchmarkId::new("filter", soil), &soil, |b, soil| {
            b.iter(|| {
                filter
                    .filter("Naive Bayes", black_box(&probs), *soil, &encoder)
                    .unwrap()
            });
        });
    }

    let candidates: Vec<Candidate> = [0.97, 0.02, 0.005, 0.003, 0.002]
        .iter()
        .enumerate()
        .map(|(i, p)| Candidate::new(CROPS[i], *p))
        .collect();
    let params = SmoothingParams::new(4.0, 5.0);
    group.bench_function("smooth_five", |b| {
        b.iter(|| smooth(black_box(&candidates), &params));
    });

    group.finish();
}

/// Full predict with a cached linear model
fn benchmark_predict(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let n = CROPS.len();
    let mut coef = vec![vec![0.0; 7]; n];
    for (i, row) in coef.iter_mut().enumerate() {
        row[i % 7] = 0.01 * (i as f64 + 1.0);
    }
    let artifact = ClassifierArtifact::new(
        "bench",
        n,
        ClassifierSpec::Linear(LinearParams {
            coef,
            intercept: vec![0.0; n],
            scaler_mean: None,
            scaler_scale: None,
        }),
    );
    let source = MemoryArtifactSource::new()
        .with_artifact(LABEL_ENCODER_ARTIFACT, LabelEncoderArtifact::new(CROPS).to_bytes().unwrap())
        .with_artifact(FALLBACK_ARTIFACT, artifact.to_bytes().unwrap());

    let predictor = rt.block_on(async {
        let registry = ModelRegistry::open(Arc::new(source)).await.unwrap();
        CropPredictor::new(
            Arc::new(registry),
            Arc::new(ConstraintTable::builtin()),
            EngineConfig::default(),
        )
        .unwrap()
    });

    let request = PredictionRequest::from_values(90.0, 42.0, 43.0, 20.8, 82.0, 6.5, 202.9)
        .with_soil("loamy")
        .with_model("Random Forest");

    let mut group = c.benchmark_group("Predict");
    group.sample_size(100);

    group.bench_function("cached_model", |b| {
        b.iter(|| {
            rt.block_on(async { predictor.predict_request(black_box(&request)).await.unwrap() })
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_post_processing, benchmark_predict);
criterion_main!(benches);
