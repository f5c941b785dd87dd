//! Crop → soil compatibility table

use cropwise_classifiers::normalize_label;
use cropwise_core::{Error, Result, SoilType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use SoilType::{Alluvial, Black, Clayey, Loamy, Red, Sandy};

const BUILTIN: &[(&str, &[SoilType])] = &[
    // Cereals
    ("rice", &[Clayey, Loamy, Alluvial]),
    ("maize", &[Loamy, Sandy, Alluvial, Black]),
    ("wheat", &[Loamy, Clayey, Alluvial]),
    ("barley", &[Loamy, Clayey]),
    ("millet", &[Sandy, Loamy]),
    ("sorghum", &[Loamy, Black]),
    // Cash crops
    ("cotton", &[Black, Loamy, Alluvial]),
    ("sugarcane", &[Loamy, Clayey, Alluvial, Black]),
    ("jute", &[Alluvial, Loamy]),
    // Pulses
    ("chickpea", &[Loamy, Sandy, Black]),
    ("lentil", &[Loamy, Clayey]),
    ("pigeonpeas", &[Loamy, Clayey, Black]),
    ("mungbean", &[Loamy, Sandy]),
    ("blackgram", &[Loamy, Clayey, Black]),
    ("kidneybeans", &[Loamy, Clayey]),
    // Oilseeds and plantation crops
    ("groundnut", &[Sandy, Loamy]),
    ("soybean", &[Loamy, Black]),
    ("mustard", &[Loamy, Clayey, Alluvial]),
    ("sunflower", &[Loamy, Sandy]),
    ("coconut", &[Sandy, Alluvial, Loamy]),
    ("coffee", &[Loamy, Red]),
    ("tea", &[Loamy, Red]),
    // Fruits
    ("papaya", &[Loamy, Alluvial, Sandy]),
    ("mango", &[Loamy, Alluvial, Black, Red]),
    ("banana", &[Loamy, Clayey, Alluvial]),
    ("pomegranate", &[Loamy, Sandy, Black]),
    ("orange", &[Loamy, Alluvial, Sandy]),
    ("grapes", &[Loamy, Sandy, Black, Red]),
    ("watermelon", &[Sandy, Loamy]),
    ("muskmelon", &[Sandy, Loamy]),
    ("apple", &[Loamy, Alluvial]),
    // Vegetables
    ("potato", &[Sandy, Loamy, Alluvial]),
    ("tomato", &[Loamy, Sandy]),
    ("onion", &[Loamy, Sandy]),
];

/// Read-only mapping from crop name to the soil types it tolerates.
///
/// Crop keys are normalized (trimmed, lowercased). A crop without an entry
/// is unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConstraintTable {
    crops: BTreeMap<String, Vec<SoilType>>,
}

/// On-disk form; soil names are parsed leniently
#[derive(Deserialize)]
#[serde(transparent)]
struct RawTable(BTreeMap<String, Vec<String>>);

impl ConstraintTable {
    /// Table shipped with the service
    pub fn builtin() -> Self {
        Self::from_entries(
            BUILTIN
                .iter()
                .map(|(crop, soils)| (*crop, soils.iter().copied())),
        )
    }

    /// Build a table from `(crop, soils)` pairs; duplicate soils are dropped
    pub fn from_entries<I, C, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (C, S)>,
        C: AsRef<str>,
        S: IntoIterator<Item = SoilType>,
    {
        let mut crops = BTreeMap::new();
        for (crop, soils) in entries {
            let allowed: &mut Vec<SoilType> = crops.entry(normalize_label(crop.as_ref())).or_default();
            for soil in soils {
                if !allowed.contains(&soil) {
                    allowed.push(soil);
                }
            }
        }
        Self { crops }
    }

    /// Load a table from YAML (`crop: [soil, ...]`)
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let RawTable(raw) = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("invalid constraint table: {}", e)))?;

        let mut entries = Vec::with_capacity(raw.len());
        for (crop, soils) in raw {
            let parsed = soils
                .iter()
                .map(|s| s.parse::<SoilType>())
                .collect::<Result<Vec<_>>>()
                .map_err(|e| Error::config(format!("crop '{}': {}", crop, e)))?;
            entries.push((crop, parsed));
        }
        Ok(Self::from_entries(entries))
    }

    /// Load a table from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "failed to read constraint table {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Whether `crop` may be grown on `soil`; unlisted crops always may
    pub fn allows(&self, crop: &str, soil: SoilType) -> bool {
        match self.allowed_soils(crop) {
            Some(allowed) => allowed.is_empty() || allowed.contains(&soil),
            None => true,
        }
    }

    /// Soils listed for a crop, if the crop is constrained
    pub fn allowed_soils(&self, crop: &str) -> Option<&[SoilType]> {
        self.crops.get(&normalize_label(crop)).map(Vec::as_slice)
    }

    /// Number of constrained crops
    pub fn len(&self) -> usize {
        self.crops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crops.is_empty()
    }

    /// Constrained crop names in sorted order
    pub fn crops(&self) -> impl Iterator<Item = &str> {
        self.crops.keys().map(String::as_str)
    }
}
