// =============================================================================
// Block H — Leverage stress index
// =============================================================================
//
// A derived-from-derived score combining three already-computed inputs:
//
//   funding  — |funding z-score| capped at 3
//   oi       — |open-interest 24h delta %| scaled by 0.1
//   volume   — the 1h relative-volume class mapped low/normal=0, high=1,
//              very high=2
//
// The block performs no fetches and therefore never fails. A degraded
// upstream block contributes 0 to the score instead of propagating its null.

use serde::Serialize;

use crate::dashboard::derivatives::DerivativesSnapshot;
use crate::dashboard::round_dp;

/// Cap applied to the funding z-score component.
const FUNDING_Z_CAP: f64 = 3.0;

/// Scale applied to the open-interest delta component.
const OI_DELTA_SCALE: f64 = 0.1;

/// The record served as `dataH`.
#[derive(Debug, Clone, Serialize)]
pub struct StressIndex {
    pub score: f64,
    #[serde(rename = "fundingComponent")]
    pub funding_component: f64,
    #[serde(rename = "oiComponent")]
    pub oi_component: f64,
    #[serde(rename = "volumeComponent")]
    pub volume_component: f64,
    pub elevated: bool,
}

/// Map the relative-volume class onto its stress contribution.
fn volume_class_score(class: Option<&str>) -> f64 {
    match class {
        Some("very high") => 2.0,
        Some("high") => 1.0,
        _ => 0.0,
    }
}

/// Combine the upstream block outputs into the stress index.
///
/// `relative_1h` is the 1h entry of block C's relative map, when present.
pub fn compute(
    derivatives: &DerivativesSnapshot,
    relative_1h: Option<&str>,
    threshold: f64,
) -> StressIndex {
    // Missing or unparseable upstream fields count as zero.
    let funding_z: f64 = derivatives
        .funding_z
        .as_deref()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0);
    let oi_delta: f64 = derivatives
        .oi_delta_24h
        .as_deref()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0);

    let funding_component = round_dp(funding_z.abs().min(FUNDING_Z_CAP), 2);
    let oi_component = round_dp(oi_delta.abs() * OI_DELTA_SCALE, 2);
    let volume_component = volume_class_score(relative_1h);

    let score = round_dp(funding_component + oi_component + volume_component, 2);

    StressIndex {
        score,
        funding_component,
        oi_component,
        volume_component,
        elevated: score >= threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(z: Option<&str>, oi: Option<&str>) -> DerivativesSnapshot {
        DerivativesSnapshot {
            funding_z: z.map(str::to_string),
            oi_delta_24h: oi.map(str::to_string),
        }
    }

    #[test]
    fn degraded_upstream_scores_zero() {
        let s = compute(&DerivativesSnapshot::empty(), None, 4.0);
        assert!(s.score.abs() < 1e-12);
        assert!(!s.elevated);
    }

    #[test]
    fn funding_z_is_capped() {
        let s = compute(&snapshot(Some("-7.50"), Some("0.0")), None, 4.0);
        assert!((s.funding_component - 3.0).abs() < 1e-12);
    }

    #[test]
    fn oi_delta_is_scaled() {
        let s = compute(&snapshot(Some("0.00"), Some("-25.0")), None, 4.0);
        assert!((s.oi_component - 2.5).abs() < 1e-12);
    }

    #[test]
    fn volume_class_mapping() {
        assert!((volume_class_score(Some("very high")) - 2.0).abs() < 1e-12);
        assert!((volume_class_score(Some("high")) - 1.0).abs() < 1e-12);
        assert!(volume_class_score(Some("normal")).abs() < 1e-12);
        assert!(volume_class_score(Some("low")).abs() < 1e-12);
        assert!(volume_class_score(None).abs() < 1e-12);
    }

    #[test]
    fn elevated_at_threshold() {
        // 3.0 + 1.5 + 0 = 4.5 >= 4.0.
        let s = compute(&snapshot(Some("3.20"), Some("15.0")), Some("normal"), 4.0);
        assert!((s.score - 4.5).abs() < 1e-12);
        assert!(s.elevated);

        // Exactly at the threshold counts as elevated.
        let s = compute(&snapshot(Some("3.00"), Some("0.0")), Some("high"), 4.0);
        assert!((s.score - 4.0).abs() < 1e-12);
        assert!(s.elevated);
    }

    #[test]
    fn unparseable_fields_count_as_zero() {
        let s = compute(&snapshot(Some("n/a"), Some("??")), Some("high"), 4.0);
        assert!((s.score - 1.0).abs() < 1e-12);
    }
}
