//! Agronomic scores shown alongside a recommendation
//!
//! These are informational; they never influence ranking.

use crate::constraints::ConstraintTable;
use cropwise_core::{
    AgronomicMetrics, FeatureRecord, NutrientLevel, PhSuitability, SoilType, WaterStress,
};

/// pH at which the suitability curve peaks
pub const IDEAL_PH: f64 = 6.5;

/// Rainfall (mm) at which water stress reaches zero
pub const REQUIRED_RAINFALL_MM: f64 = 150.0;

const PH_SPREAD: f64 = 1.0;
const OPTIMAL_PH_FACTOR: f64 = 0.8;
const LOW_STRESS_BELOW: f64 = 0.3;

const PH_WEIGHT: f64 = 35.0;
const WATER_WEIGHT: f64 = 35.0;
const SOIL_WEIGHT: f64 = 30.0;

/// Compute all four metrics for `crop` grown under `record`'s conditions
pub fn score(record: &FeatureRecord, crop: &str, constraints: &ConstraintTable) -> AgronomicMetrics {
    let ph = ph_factor(record.ph);
    let wsi = water_stress_index(record.rainfall);
    let soil = soil_score(constraints, crop, record.soil_type);

    let suitability = PH_WEIGHT * ph + WATER_WEIGHT * (1.0 - wsi) + SOIL_WEIGHT * soil;

    AgronomicMetrics {
        nutrient_index: nutrient_level(record.mean_npk()),
        suitability_score: round2(suitability),
        water_stress: if wsi < LOW_STRESS_BELOW {
            WaterStress::Low
        } else {
            WaterStress::High
        },
        ph_suitability: if ph > OPTIMAL_PH_FACTOR {
            PhSuitability::Optimal
        } else {
            PhSuitability::SubOptimal
        },
    }
}

/// Bucket the mean N/P/K level
pub fn nutrient_level(mean_npk: f64) -> NutrientLevel {
    if mean_npk > 80.0 {
        NutrientLevel::High
    } else if mean_npk > 40.0 {
        NutrientLevel::Medium
    } else {
        NutrientLevel::Low
    }
}

/// Gaussian closeness of `ph` to [`IDEAL_PH`], in (0, 1]
pub fn ph_factor(ph: f64) -> f64 {
    let z = (ph - IDEAL_PH) / PH_SPREAD;
    (-0.5 * z * z).exp()
}

/// Rainfall shortfall relative to [`REQUIRED_RAINFALL_MM`], in [0, 1]
pub fn water_stress_index(rainfall: f64) -> f64 {
    (1.0 - rainfall / REQUIRED_RAINFALL_MM).max(0.0)
}

/// 1.0 for a listed soil, 0.6 when the crop at least tolerates loam, else 0.2
pub fn soil_score(constraints: &ConstraintTable, crop: &str, soil: SoilType) -> f64 {
    match constraints.allowed_soils(crop) {
        Some(allowed) if allowed.contains(&soil) => 1.0,
        Some(allowed) if allowed.contains(&SoilType::Loamy) => 0.6,
        _ => 0.2,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: f64, ph: f64, rainfall: f64, soil: SoilType) -> FeatureRecord {
        FeatureRecord {
            nitrogen: n,
            phosphorus: n,
            potassium: n,
            temperature: 25.0,
            humidity: 70.0,
            ph,
            rainfall,
            soil_type: soil,
        }
    }

    #[test]
    fn test_ideal_conditions_score_full_marks() {
        let metrics = score(
            &record(90.0, 6.5, 200.0, SoilType::Clayey),
            "rice",
            &ConstraintTable::builtin(),
        );
        assert_eq!(metrics.nutrient_index, NutrientLevel::High);
        assert_eq!(metrics.ph_suitability, PhSuitability::Optimal);
        assert_eq!(metrics.water_stress, WaterStress::Low);
        assert_eq!(metrics.suitability_score, 100.0);
    }

    #[test]
    fn test_nutrient_boundaries_are_exclusive() {
        assert_eq!(nutrient_level(80.0), NutrientLevel::Medium);
        assert_eq!(nutrient_level(80.01), NutrientLevel::High);
        assert_eq!(nutrient_level(40.0), NutrientLevel::Low);
    }

    #[test]
    fn test_water_stress_index() {
        assert_eq!(water_stress_index(0.0), 1.0);
        assert_eq!(water_stress_index(75.0), 0.5);
        assert_eq!(water_stress_index(300.0), 0.0);
    }

    #[test]
    fn test_soil_score_tiers() {
        let table = ConstraintTable::builtin();
        assert_eq!(soil_score(&table, "rice", SoilType::Alluvial), 1.0);
        assert_eq!(soil_score(&table, "rice", SoilType::Sandy), 0.6);
        assert_eq!(soil_score(&table, "durian", SoilType::Sandy), 0.2);

        let no_loam = ConstraintTable::from_entries([("cranberry", [SoilType::Red])]);
        assert_eq!(soil_score(&no_loam, "cranberry", SoilType::Sandy), 0.2);
    }

    #[test]
    fn test_suboptimal_dry_conditions() {
        let metrics = score(
            &record(20.0, 4.0, 30.0, SoilType::Sandy),
            "rice",
            &ConstraintTable::builtin(),
        );
        // ph factor exp(-3.125) ≈ 0.0439, wsi 0.8, soil 0.6
        assert_eq!(metrics.nutrient_index, NutrientLevel::Low);
        assert_eq!(metrics.ph_suitability, PhSuitability::SubOptimal);
        assert_eq!(metrics.water_stress, WaterStress::High);
        assert_eq!(metrics.suitability_score, 26.54);
    }
}
