//! Adaptive temperature smoothing of candidate probabilities
//!
//! Raw classifier probabilities are often saturated (one class at ~100%,
//! the rest at ~0%). Smoothing flattens them with a temperature, enforces a
//! minimum share per candidate, and produces one-decimal percentages that
//! total exactly 100.0.
//!
//! Steps:
//! 1. `s_i = exp(ln(p_i + ε) / T)`, normalized to sum to 1
//! 2. Percentages below the floor are pinned to it and the remaining mass is
//!    rescaled across the rest, repeated until nothing new falls below
//! 3. Values are rounded to tenths; the residual goes to rank 1, or, when
//!    negative, to the last entry of the leading tie group
//!
//! If `floor × n > 100` the floor cannot hold for every entry and step 2 is
//! skipped.

use cropwise_classifiers::softmax;
use cropwise_core::{Candidate, CropMatch};

/// Added to every probability before taking its logarithm
pub const PROBABILITY_EPSILON: f64 = 1e-10;

const TENTHS_TOTAL: i64 = 1000;

/// Temperature and floor for one smoothing pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingParams {
    /// Softening temperature; higher is flatter
    pub temperature: f64,

    /// Minimum match percentage per candidate
    pub floor_pct: f64,
}

impl SmoothingParams {
    pub fn new(temperature: f64, floor_pct: f64) -> Self {
        Self {
            temperature,
            floor_pct,
        }
    }

    /// Floor rounded up to the output precision
    pub fn effective_floor(&self) -> f64 {
        if self.floor_pct.is_finite() && self.floor_pct > 0.0 {
            (self.floor_pct * 10.0 - 1e-9).ceil() / 10.0
        } else {
            0.0
        }
    }
}

/// Smooth ranked candidates into match percentages.
///
/// `candidates` must already be in rank order (highest probability first);
/// the output keeps that order and assigns ranks from 1.
pub fn smooth(candidates: &[Candidate], params: &SmoothingParams) -> Vec<CropMatch> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let shares = tempered_shares(candidates, params.temperature);
    let mut pct: Vec<f64> = shares.iter().map(|s| s * 100.0).collect();

    let floor = params.effective_floor();
    if floor > 0.0 && floor * pct.len() as f64 <= 100.0 {
        apply_floor(&mut pct, floor);
    }

    let tenths = round_to_total(&pct);

    candidates
        .iter()
        .zip(tenths)
        .enumerate()
        .map(|(i, (candidate, t))| CropMatch {
            rank: i + 1,
            crop: candidate.crop.clone(),
            match_pct: t as f64 / 10.0,
        })
        .collect()
}

/// Sum of match percentages, computed at the output precision
pub fn total_percentage(matches: &[CropMatch]) -> f64 {
    let tenths: i64 = matches
        .iter()
        .map(|m| (m.match_pct * 10.0).round() as i64)
        .sum();
    tenths as f64 / 10.0
}

fn tempered_shares(candidates: &[Candidate], temperature: f64) -> Vec<f64> {
    let scores: Vec<f64> = candidates
        .iter()
        .map(|c| {
            let p = if c.probability.is_finite() && c.probability > 0.0 {
                c.probability
            } else {
                0.0
            };
            (p + PROBABILITY_EPSILON).ln() / temperature
        })
        .collect();

    // exp(x_i) / Σ exp(x_j) is exactly the normalized tempered probability.
    softmax(&scores)
}

fn apply_floor(pct: &mut [f64], floor: f64) {
    let n = pct.len();
    let raw = pct.to_vec();
    let mut pinned = vec![false; n];

    loop {
        let pinned_count = pinned.iter().filter(|p| **p).count();
        let free_mass = 100.0 - floor * pinned_count as f64;
        let free_raw: f64 = (0..n).filter(|i| !pinned[*i]).map(|i| raw[i]).sum();

        for i in 0..n {
            pct[i] = if pinned[i] {
                floor
            } else if free_raw > 0.0 {
                raw[i] * free_mass / free_raw
            } else {
                free_mass / (n - pinned_count) as f64
            };
        }

        let mut changed = false;
        for i in 0..n {
            if !pinned[i] && pct[i] < floor {
                pinned[i] = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    for i in 0..n {
        if pinned[i] {
            pct[i] = floor;
        }
    }
}

fn round_to_total(pct: &[f64]) -> Vec<i64> {
    let mut tenths: Vec<i64> = pct.iter().map(|p| (p * 10.0).round() as i64).collect();
    let mut residual = TENTHS_TOTAL - tenths.iter().sum::<i64>();

    if residual > 0 {
        tenths[0] += residual;
    }
    while residual < 0 {
        let lead = tenths[0];
        let last_tied = tenths.iter().take_while(|t| **t == lead).count() - 1;
        tenths[last_tied] -= 1;
        residual += 1;
    }
    tenths
}
