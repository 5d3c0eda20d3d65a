use std::collections::HashMap;

use h3o::{CellIndex, LatLng, Resolution};
use rand::Rng;
use serde::Serialize;

use crate::route::LngLat;

/// Per-coordinate risk values for a route, one scalar in [0,1] per point.
/// An empty result means the source has nothing for this route and the
/// sampler falls back to its placeholder ramp.
pub trait RiskSource: Send + Sync {
    fn values_for(&self, coords: &[LngLat]) -> Vec<f64>;
}

// 0.0 = Safe, 1.0 = Dangerous
pub struct CellRiskMap {
    cells: HashMap<CellIndex, f64>,
    resolution: Resolution,
}

impl CellRiskMap {
    /// Seeds a demo grid around a city center: the center cell is risky,
    /// its 2-ring neighbors moderate, everything else defaults on lookup.
    pub fn seeded(center_lat: f64, center_lng: f64) -> Self {
        let mut cells = HashMap::new();
        let resolution = Resolution::Nine;

        if let Ok(center) = LatLng::new(center_lat, center_lng) {
            let center = center.to_cell(resolution);
            cells.insert(center, 0.9);
            for neighbor in center.grid_disk::<Vec<_>>(2) {
                cells.entry(neighbor).or_insert(0.4);
            }
        }

        Self { cells, resolution }
    }

    pub fn risk_at(&self, lat: f64, lng: f64) -> f64 {
        // Lookup must use the same resolution the cells were seeded at.
        match LatLng::new(lat, lng) {
            Ok(point) => *self
                .cells
                .get(&point.to_cell(self.resolution))
                .unwrap_or(&0.1),
            Err(_) => 0.1,
        }
    }
}

impl RiskSource for CellRiskMap {
    fn values_for(&self, coords: &[LngLat]) -> Vec<f64> {
        coords
            .iter()
            .map(|&[lng, lat]| self.risk_at(lat, lng))
            .collect()
    }
}

/// Placeholder risk model: smooth random values along the route, generated
/// from a handful of key points with eased interpolation in between. Stands
/// in for a real scoring service and must stay behind the RiskSource seam.
pub struct SmoothNoise;

impl RiskSource for SmoothNoise {
    fn values_for(&self, coords: &[LngLat]) -> Vec<f64> {
        smooth_values(&mut rand::rng(), coords.len())
    }
}

/// No upstream risk at all; forces the sampler onto its default ramp.
pub struct NoRisk;

impl RiskSource for NoRisk {
    fn values_for(&self, _coords: &[LngLat]) -> Vec<f64> {
        Vec::new()
    }
}

/// 3-5 random key points (endpoints always included) joined by cubic
/// ease-in-out segments, one value per coordinate, clamped to [0,1].
pub fn smooth_values<R: Rng>(rng: &mut R, num_points: usize) -> Vec<f64> {
    if num_points == 0 {
        return Vec::new();
    }
    if num_points == 1 {
        return vec![clamp01(rng.random::<f64>())];
    }

    let num_key_points = (num_points / 20).clamp(3, 5);
    let mut key_indices = vec![0usize];
    let mut key_values = vec![rng.random::<f64>()];
    for i in 1..num_key_points.saturating_sub(1) {
        key_indices.push((i as f64 / num_key_points as f64 * num_points as f64) as usize);
        key_values.push(rng.random::<f64>());
    }
    key_indices.push(num_points - 1);
    key_values.push(rng.random::<f64>());

    let mut values = Vec::with_capacity(num_points);
    for i in 0..num_points {
        let mut lower = 0;
        let mut upper = key_indices.len() - 1;
        for j in 0..key_indices.len() - 1 {
            if i >= key_indices[j] && i <= key_indices[j + 1] {
                lower = j;
                upper = j + 1;
                break;
            }
        }

        let (lo_idx, hi_idx) = (key_indices[lower], key_indices[upper]);
        let (lo_val, hi_val) = (key_values[lower], key_values[upper]);
        if lo_idx == hi_idx {
            values.push(clamp01(lo_val));
        } else {
            let t = (i - lo_idx) as f64 / (hi_idx - lo_idx) as f64;
            let eased = if t < 0.5 {
                4.0 * t * t * t
            } else {
                1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
            };
            values.push(clamp01(lo_val + (hi_val - lo_val) * eased));
        }
    }
    values
}

/// Number of output risk segments for a route of `coord_count` points.
pub fn segment_count(coord_count: usize) -> usize {
    ((coord_count as f64 / 50.0).round() as usize).max(10)
}

/// Resamples per-coordinate `values` down to per-segment probs, or produces
/// the default ramp when no values exist. Routes with fewer than two points
/// have no segments at all.
pub fn sample_probs(coord_count: usize, values: &[f64]) -> Vec<f64> {
    if coord_count < 2 {
        return Vec::new();
    }
    let segments = segment_count(coord_count);
    if values.is_empty() {
        default_ramp(segments)
    } else {
        resample_nearest(values, segments)
    }
}

/// Nearest-neighbor downsample: slot i reads the source index
/// floor(i/segments * len), clamped into range.
fn resample_nearest(values: &[f64], segments: usize) -> Vec<f64> {
    (0..segments)
        .map(|i| {
            let src = (i as f64 / segments as f64 * values.len() as f64).floor() as usize;
            clamp01(values[src.min(values.len() - 1)])
        })
        .collect()
}

/// Monotone 0.2 -> 0.8 ramp. Demo fallback, not a risk model.
fn default_ramp(segments: usize) -> Vec<f64> {
    (0..segments)
        .map(|i| clamp01(0.2 + 0.6 * (i as f64 / (segments - 1).max(1) as f64)))
        .collect()
}

pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Weather/road metadata at a sampled point, shown in route popups.
/// Not consumed by scoring.
#[derive(Debug, Clone, Serialize)]
pub struct ConditionSample {
    pub lat: f64,
    pub lng: f64,
    pub weathercode: u8,
    pub temperature: f64,
    pub road_type: String,
    pub road_name: String,
}

const ROAD_TYPES: [&str; 5] = ["highway", "primary", "secondary", "residential", "tertiary"];
const ROAD_NAMES: [&str; 6] = [
    "Main St",
    "Highway 101",
    "Park Ave",
    "Oak Blvd",
    "Elm St",
    "Maple Dr",
];

/// Mocked conditions for every `interval`-th coordinate. Placeholder until a
/// weather/road provider is wired in.
pub fn mock_conditions<R: Rng>(rng: &mut R, coords: &[LngLat], interval: usize) -> Vec<ConditionSample> {
    let interval = interval.max(1);
    coords
        .iter()
        .step_by(interval)
        .map(|&[lng, lat]| ConditionSample {
            lat,
            lng,
            weathercode: rng.random_range(0..10),
            temperature: ((20.0 + rng.random::<f64>() * 15.0) * 10.0).round() / 10.0,
            road_type: ROAD_TYPES[rng.random_range(0..ROAD_TYPES.len())].to_string(),
            road_name: ROAD_NAMES[rng.random_range(0..ROAD_NAMES.len())].to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn segment_count_boundaries() {
        assert_eq!(segment_count(1), 10);
        assert_eq!(segment_count(500), 10);
        assert_eq!(segment_count(1000), 20);
    }

    #[test]
    fn fewer_than_two_coords_yields_no_probs() {
        assert!(sample_probs(0, &[]).is_empty());
        assert!(sample_probs(1, &[0.5]).is_empty());
    }

    #[test]
    fn ramp_runs_from_point_two_to_point_eight() {
        let probs = sample_probs(100, &[]);
        assert_eq!(probs.len(), 10);
        assert!((probs[0] - 0.2).abs() < 1e-12);
        assert!((probs[9] - 0.8).abs() < 1e-12);
        for pair in probs.windows(2) {
            assert!(pair[0] <= pair[1], "ramp must be monotone");
        }
    }

    #[test]
    fn resample_hundred_values_to_ten_segments() {
        let values: Vec<f64> = (0..100).map(|i| i as f64 / 100.0).collect();
        let probs = sample_probs(500, &values);
        assert_eq!(probs.len(), 10);
        // Nearest-neighbor: slot 0 reads floor(0/10 * 100) = 0.
        assert_eq!(probs[0], values[0]);
        // Slot 9 reads floor(9/10 * 100) = 90.
        assert_eq!(probs[9], values[90]);
    }

    #[test]
    fn resample_clamps_out_of_range_values() {
        let values = vec![-0.5, 1.5, 0.3];
        let probs = sample_probs(100, &values);
        assert_eq!(probs.len(), 10);
        for p in &probs {
            assert!((0.0..=1.0).contains(p), "prob {p} out of range");
        }
    }

    #[test]
    fn all_probs_within_unit_interval() {
        for coord_count in [2, 49, 50, 51, 100, 973] {
            for p in sample_probs(coord_count, &[]) {
                assert!((0.0..=1.0).contains(&p));
            }
        }
    }

    #[test]
    fn smooth_values_one_per_coordinate_and_clamped() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in [0, 1, 2, 19, 20, 100, 341] {
            let values = smooth_values(&mut rng, n);
            assert_eq!(values.len(), n);
            for v in &values {
                assert!((0.0..=1.0).contains(v));
            }
        }
    }

    #[test]
    fn cell_map_scores_seeded_center_highest() {
        let map = CellRiskMap::seeded(30.3398, 76.3869);
        let center = map.risk_at(30.3398, 76.3869);
        let far_away = map.risk_at(48.8566, 2.3522);
        assert_eq!(center, 0.9);
        assert_eq!(far_away, 0.1);
    }

    #[test]
    fn cell_map_produces_one_value_per_coord() {
        let map = CellRiskMap::seeded(32.9, -96.8);
        let coords = vec![[-96.8, 32.9], [-96.75, 32.95], [-96.7, 33.0]];
        assert_eq!(map.values_for(&coords).len(), 3);
    }

    #[test]
    fn mock_conditions_sample_every_eighth_point() {
        let mut rng = StdRng::seed_from_u64(1);
        let coords: Vec<[f64; 2]> = (0..24).map(|i| [-96.8 + i as f64 * 0.001, 32.9]).collect();
        let conditions = mock_conditions(&mut rng, &coords, 8);
        assert_eq!(conditions.len(), 3);
        for c in &conditions {
            assert!(c.weathercode < 10);
            assert!((20.0..=35.0).contains(&c.temperature));
        }
    }
}
