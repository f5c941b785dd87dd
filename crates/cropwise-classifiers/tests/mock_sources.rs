//! Mock artifact sources for testing
//!
//! Provides an instrumented in-memory source and helpers that build small,
//! fully deterministic artifacts.

#![allow(dead_code)]

use async_trait::async_trait;
use cropwise_classifiers::{
    ArtifactSource, ClassifierArtifact, ClassifierSpec, LabelEncoderArtifact, LinearParams,
    MemoryArtifactSource, LABEL_ENCODER_ARTIFACT,
};
use cropwise_core::Result;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

pub const CROPS: [&str; 3] = ["maize", "rice", "wheat"];

/// Source that counts fetches and can simulate slow storage
pub struct CountingSource {
    inner: MemoryArtifactSource,
    fetches: AtomicU32,
    latency: Option<Duration>,
}

impl CountingSource {
    /// Create a source holding only the label encoder
    pub fn new() -> Self {
        let inner = MemoryArtifactSource::new().with_artifact(
            LABEL_ENCODER_ARTIFACT,
            LabelEncoderArtifact::new(CROPS).to_bytes().unwrap(),
        );
        Self {
            inner,
            fetches: AtomicU32::new(0),
            latency: None,
        }
    }

    /// Add an artifact
    pub fn with_artifact(self, name: &str, bytes: Vec<u8>) -> Self {
        self.inner.insert(name, bytes);
        self
    }

    /// Add an artifact after construction
    pub fn insert(&self, name: &str, bytes: Vec<u8>) {
        self.inner.insert(name, bytes);
    }

    /// Delay every fetch
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Model artifact fetches so far
    pub fn fetch_count(&self) -> u32 {
        self.fetches.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ArtifactSource for CountingSource {
    async fn fetch(&self, name: &str) -> Result<Option<Vec<u8>>> {
        if name != LABEL_ENCODER_ARTIFACT {
            self.fetches.fetch_add(1, Ordering::Relaxed);
        }
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.inner.fetch(name).await
    }

    async fn contains(&self, name: &str) -> bool {
        self.inner.contains(name).await
    }

    fn describe(&self) -> String {
        "counting".to_string()
    }
}

/// Linear artifact that always returns the given distribution
pub fn fixed_artifact(name: &str, probs: [f64; 3]) -> Vec<u8> {
    ClassifierArtifact::new(
        name,
        CROPS.len(),
        ClassifierSpec::Linear(LinearParams {
            coef: vec![vec![0.0; 7]; CROPS.len()],
            intercept: probs.iter().map(|p| p.ln()).collect(),
            scaler_mean: None,
            scaler_scale: None,
        }),
    )
    .to_bytes()
    .unwrap()
}
