//! Load-once model registry
//!
//! Each catalog model owns a slot holding a lazily-initialized classifier.
//! The first request for a model fetches and decodes its artifact; every
//! later request (including concurrent first requests) shares the same
//! `Arc`. Models without a dedicated artifact resolve to the fallback slot,
//! so the fallback model is decoded at most once no matter how many names
//! route to it.

use crate::artifact::{decode_classifier, decode_label_encoder};
use crate::catalog::{
    ModelKind, ACTIVE_MODEL_MARKER, FALLBACK_ARTIFACT, LABEL_ENCODER_ARTIFACT,
    METRICS_SUMMARY_ARTIFACT,
};
use crate::classifier::Classifier;
use crate::label_encoder::LabelEncoder;
use crate::source::ArtifactSource;
use crate::summary::{parse_summary, ModelEvaluation};
use cropwise_core::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Cache key for a loaded model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelSlot {
    /// A catalog model, whether served by its own artifact or the fallback
    Dedicated(ModelKind),
    /// The shared fallback artifact
    Fallback,
}

/// A decoded classifier plus where it came from
#[derive(Debug)]
pub struct LoadedModel {
    /// Ready-to-use classifier
    pub classifier: Arc<dyn Classifier>,

    /// Artifact the classifier was decoded from
    pub artifact: &'static str,

    /// Whether this is the shared fallback model
    pub fallback: bool,
}

/// Artifact availability for one catalog model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelAvailability {
    pub kind: ModelKind,
    /// Dedicated artifact exists
    pub dedicated: bool,
    /// Already decoded and cached
    pub loaded: bool,
}

type Slot = Arc<OnceCell<Arc<LoadedModel>>>;

/// Registry of lazily loaded classifiers sharing one label encoder
pub struct ModelRegistry {
    source: Arc<dyn ArtifactSource>,
    encoder: Arc<LabelEncoder>,
    slots: Mutex<HashMap<ModelSlot, Slot>>,
    loads: AtomicU64,
}

impl ModelRegistry {
    /// Create a registry with an already decoded label encoder
    pub fn new(source: Arc<dyn ArtifactSource>, encoder: LabelEncoder) -> Self {
        Self {
            source,
            encoder: Arc::new(encoder),
            slots: Mutex::new(HashMap::new()),
            loads: AtomicU64::new(0),
        }
    }

    /// Open a registry, reading the label encoder from the source
    pub async fn open(source: Arc<dyn ArtifactSource>) -> Result<Self> {
        let bytes = source.fetch(LABEL_ENCODER_ARTIFACT).await?.ok_or_else(|| {
            Error::model_load(LABEL_ENCODER_ARTIFACT, "label encoder artifact not found")
        })?;
        let encoder = decode_label_encoder(LABEL_ENCODER_ARTIFACT, &bytes)
            .map_err(|e| Error::model_load(LABEL_ENCODER_ARTIFACT, e.to_string()))?;

        info!(
            source = %source.describe(),
            classes = encoder.len(),
            "Opened model registry"
        );
        Ok(Self::new(source, encoder))
    }

    /// Label encoder shared by every model
    pub fn label_encoder(&self) -> &LabelEncoder {
        &self.encoder
    }

    /// Resolve a model by name, loading it on first use.
    ///
    /// Names outside the catalog resolve to the fallback model.
    pub async fn resolve(&self, name: &str) -> Result<Arc<LoadedModel>> {
        match ModelKind::from_name(name) {
            Some(kind) => self.resolve_kind(kind).await,
            None => {
                warn!(model = name, "Unknown model name, using fallback");
                self.fallback_for(name).await
            }
        }
    }

    /// Resolve a catalog model, loading it on first use
    pub async fn resolve_kind(&self, kind: ModelKind) -> Result<Arc<LoadedModel>> {
        let cell = self.slot(ModelSlot::Dedicated(kind));
        cell.get_or_try_init(|| self.load_dedicated(kind))
            .await
            .map(Arc::clone)
    }

    /// The shared fallback model
    pub async fn fallback(&self) -> Result<Arc<LoadedModel>> {
        self.fallback_for(FALLBACK_ARTIFACT).await
    }

    /// Load every catalog model up front, returning how many resolved
    pub async fn preload(&self) -> usize {
        let mut ready = 0;
        for kind in ModelKind::ALL {
            match self.resolve_kind(kind).await {
                Ok(_) => ready += 1,
                Err(e) => warn!(model = %kind, error = %e, "Preload failed"),
            }
        }
        ready
    }

    /// Catalog models currently cached
    pub fn loaded_models(&self) -> Vec<ModelKind> {
        let slots = self.slots.lock();
        ModelKind::ALL
            .into_iter()
            .filter(|kind| {
                slots
                    .get(&ModelSlot::Dedicated(*kind))
                    .is_some_and(|cell| cell.initialized())
            })
            .collect()
    }

    /// Catalog model the fallback artifact was trained as, if recorded
    pub async fn active_model(&self) -> Result<Option<ModelKind>> {
        let Some(bytes) = self.source.fetch(ACTIVE_MODEL_MARKER).await? else {
            return Ok(None);
        };
        let text = String::from_utf8_lossy(&bytes);
        let name = text.trim();
        if name.is_empty() {
            return Ok(None);
        }
        match ModelKind::from_name(name) {
            Some(kind) => Ok(Some(kind)),
            None => {
                warn!(marker = name, "Active model marker names an unknown model");
                Ok(None)
            }
        }
    }

    /// Evaluation scores recorded at training time.
    ///
    /// A missing summary yields a single "No Data" row.
    pub async fn metrics_summary(&self) -> Result<Vec<ModelEvaluation>> {
        match self.source.fetch(METRICS_SUMMARY_ARTIFACT).await? {
            Some(bytes) => parse_summary(METRICS_SUMMARY_ARTIFACT, &bytes),
            None => {
                debug!("No evaluation summary recorded");
                Ok(vec![ModelEvaluation::no_data()])
            }
        }
    }

    /// Artifact and cache status of every catalog model
    pub async fn availability(&self) -> Vec<ModelAvailability> {
        let loaded = self.loaded_models();
        let mut out = Vec::with_capacity(ModelKind::ALL.len());
        for kind in ModelKind::ALL {
            out.push(ModelAvailability {
                kind,
                dedicated: self.source.contains(kind.artifact_name()).await,
                loaded: loaded.contains(&kind),
            });
        }
        out
    }

    /// Whether the fallback artifact exists
    pub async fn has_fallback(&self) -> bool {
        self.source.contains(FALLBACK_ARTIFACT).await
    }

    /// Number of artifacts decoded so far
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    fn slot(&self, key: ModelSlot) -> Slot {
        Arc::clone(self.slots.lock().entry(key).or_default())
    }

    async fn fallback_for(&self, requested: &str) -> Result<Arc<LoadedModel>> {
        let cell = self.slot(ModelSlot::Fallback);
        cell.get_or_try_init(|| self.load_fallback(requested))
            .await
            .map(Arc::clone)
    }

    async fn load_dedicated(&self, kind: ModelKind) -> Result<Arc<LoadedModel>> {
        let artifact = kind.artifact_name();
        match self.source.fetch(artifact).await {
            Ok(Some(bytes)) => {
                let classifier = self.decode(kind.display_name(), artifact, &bytes)?;
                info!(model = %kind, artifact, "Loaded model");
                Ok(Arc::new(LoadedModel {
                    classifier,
                    artifact,
                    fallback: false,
                }))
            }
            Ok(None) => {
                warn!(model = %kind, artifact, "No dedicated artifact, using fallback");
                self.fallback_for(kind.display_name()).await
            }
            Err(e) => Err(e),
        }
    }

    async fn load_fallback(&self, requested: &str) -> Result<Arc<LoadedModel>> {
        let bytes = self.source.fetch(FALLBACK_ARTIFACT).await?.ok_or_else(|| {
            Error::model_load(
                requested,
                "no dedicated artifact and no fallback model available",
            )
        })?;

        let classifier = self.decode(requested, FALLBACK_ARTIFACT, &bytes)?;
        info!(artifact = FALLBACK_ARTIFACT, "Loaded fallback model");
        Ok(Arc::new(LoadedModel {
            classifier,
            artifact: FALLBACK_ARTIFACT,
            fallback: true,
        }))
    }

    fn decode(&self, model: &str, artifact: &str, bytes: &[u8]) -> Result<Arc<dyn Classifier>> {
        let classifier = decode_classifier(artifact, bytes, &self.encoder)
            .map_err(|e| Error::model_load(model, e.to_string()))?;
        let n = self.loads.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(artifact, loads = n, "Decoded artifact");
        Ok(classifier)
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("source", &self.source.describe())
            .field("classes", &self.encoder.len())
            .field("loaded", &self.loaded_models())
            .finish()
    }
}
