use geo::Point;
use geo::prelude::*;
use itertools::Itertools;
use serde::Serialize;

use crate::directions::{UpstreamRoute, decode_route_polyline};
use crate::gradient::{GradientStop, gradient_stops};
use crate::risk::{ConditionSample, RiskSource, sample_probs};

/// Coordinates are `[lng, lat]` throughout, matching GeoJSON.
pub type LngLat = [f64; 2];

/// Presentation role for a route within a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteTheme {
    Safe,
    Moderate,
    Risky,
}

/// One scored alternative route. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    pub id: String,
    pub summary: String,
    pub coords: Vec<LngLat>,
    pub probs: Vec<f64>,
    pub avg_risk: f64,
    pub duration_secs: f64,
    pub distance_meters: f64,
    pub duration_text: String,
    pub distance_text: String,
    pub theme: RouteTheme,
    pub gradient: Vec<GradientStop>,
    pub conditions: Vec<ConditionSample>,
}

/// Compact per-route entry for the selection list UI.
#[derive(Debug, Clone, Serialize)]
pub struct RouteSummary {
    pub id: String,
    pub name: String,
    pub avg_risk: f64,
    pub duration_secs: f64,
    pub distance_meters: f64,
    pub duration_text: String,
    pub distance_text: String,
}

/// All alternatives for one origin/destination query, sorted ascending by
/// average risk, with the role indices computed on the sorted order.
#[derive(Debug, Clone, Serialize)]
pub struct RouteSet {
    pub routes: Vec<Route>,
    pub safest_index: Option<usize>,
    pub fastest_index: Option<usize>,
    pub shortest_index: Option<usize>,
}

impl RouteSet {
    /// Builds a set from scored routes. Sort happens first, indices and
    /// themes are derived from the sorted order, so index 0 is always the
    /// lowest-risk route.
    pub fn from_routes(mut routes: Vec<Route>) -> Self {
        routes.sort_by(|a, b| a.avg_risk.total_cmp(&b.avg_risk));
        for (idx, route) in routes.iter_mut().enumerate() {
            route.id = format!("route-{idx}");
        }

        let safest_index = argmin(routes.iter().map(|r| r.avg_risk));
        let fastest_index = argmin(routes.iter().map(|r| r.duration_secs));
        let shortest_index = argmin(routes.iter().map(|r| r.distance_meters));

        // Safest wins when one route holds both roles.
        for (idx, route) in routes.iter_mut().enumerate() {
            route.theme = if Some(idx) == safest_index {
                RouteTheme::Safe
            } else if Some(idx) == fastest_index {
                RouteTheme::Moderate
            } else {
                RouteTheme::Risky
            };
        }

        Self {
            routes,
            safest_index,
            fastest_index,
            shortest_index,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn summaries(&self) -> Vec<RouteSummary> {
        self.routes
            .iter()
            .map(|r| RouteSummary {
                id: r.id.clone(),
                name: r.summary.clone(),
                avg_risk: r.avg_risk,
                duration_secs: r.duration_secs,
                distance_meters: r.distance_meters,
                duration_text: r.duration_text.clone(),
                distance_text: r.distance_text.clone(),
            })
            .collect()
    }
}

/// Scores one upstream route: decode, normalize, attach risk, aggregate.
/// A route whose polyline fails to decode comes back with empty coords and
/// empty probs; the caller drops it from the set.
pub fn score_route(upstream: &UpstreamRoute, risk: &dyn RiskSource) -> Route {
    let coords = normalize_coords(decode_route_polyline(&upstream.polyline));
    let values = risk.values_for(&coords);
    let probs = sample_probs(coords.len(), &values);
    let avg_risk = average_risk(&probs);

    let distance_meters = if upstream.distance_meters > 0.0 {
        upstream.distance_meters
    } else {
        estimate_distance_meters(&coords)
    };

    let gradient = gradient_stops(&probs);

    Route {
        id: String::new(),
        summary: upstream.summary.clone(),
        coords,
        probs,
        avg_risk,
        duration_secs: upstream.duration_secs,
        distance_meters,
        duration_text: upstream.duration_text.clone(),
        distance_text: upstream.distance_text.clone(),
        theme: RouteTheme::Risky,
        gradient,
        conditions: Vec::new(),
    }
}

/// Scores a full directions response into a RouteSet, skipping routes whose
/// geometry was undecodable.
pub fn score_route_set(upstream: &[UpstreamRoute], risk: &dyn RiskSource) -> RouteSet {
    let routes = upstream
        .iter()
        .map(|u| score_route(u, risk))
        .filter(|route| {
            if route.coords.len() < 2 {
                log::warn!("dropping route '{}': no usable geometry", route.summary);
                false
            } else {
                true
            }
        })
        .collect();
    RouteSet::from_routes(routes)
}

/// Mean of the per-segment risk values, or a neutral 0.5 when none exist.
pub fn average_risk(probs: &[f64]) -> f64 {
    if probs.is_empty() {
        0.5
    } else {
        probs.iter().sum::<f64>() / probs.len() as f64
    }
}

/// Ensures (lng, lat) ordering. Upstream sources disagree on pair order;
/// a leading value within ±90 paired with one beyond ±90 can only be
/// (lat, lng), so swap every pair. Anything else passes through.
pub fn normalize_coords(coords: Vec<LngLat>) -> Vec<LngLat> {
    let Some(&[first, second]) = coords.first() else {
        return coords;
    };
    if first.abs() <= 90.0 && second.abs() > 90.0 {
        coords.into_iter().map(|[lat, lng]| [lng, lat]).collect()
    } else {
        coords
    }
}

/// Great-circle length of the coordinate chain, used when the upstream
/// response carries no distance.
pub fn estimate_distance_meters(coords: &[LngLat]) -> f64 {
    coords
        .iter()
        .tuple_windows()
        .map(|(a, b)| {
            let p1 = Point::new(a[0], a[1]);
            let p2 = Point::new(b[0], b[1]);
            p1.haversine_distance(&p2)
        })
        .sum()
}

/// Index of the minimum value, first occurrence winning ties.
pub fn argmin(values: impl Iterator<Item = f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, value) in values.enumerate() {
        match best {
            Some((_, current)) if value >= current => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route_with(avg_risk: f64, duration_secs: f64, distance_meters: f64) -> Route {
        Route {
            id: String::new(),
            summary: "test".to_string(),
            coords: vec![[-96.8, 32.9], [-96.7, 32.95]],
            probs: vec![avg_risk],
            avg_risk,
            duration_secs,
            distance_meters,
            duration_text: String::new(),
            distance_text: String::new(),
            theme: RouteTheme::Risky,
            gradient: Vec::new(),
            conditions: Vec::new(),
        }
    }

    #[test]
    fn argmin_picks_first_occurrence_on_ties() {
        assert_eq!(argmin([0.3, 0.1, 0.6].into_iter()), Some(1));
        assert_eq!(argmin([0.2, 0.2, 0.2].into_iter()), Some(0));
        assert_eq!(argmin(std::iter::empty()), None);
    }

    #[test]
    fn role_selection_over_three_routes() {
        let risks = [0.3, 0.1, 0.6];
        let durations = [600.0, 900.0, 300.0];
        let distances = [5000.0, 7000.0, 4000.0];
        assert_eq!(argmin(risks.into_iter()), Some(1));
        assert_eq!(argmin(durations.into_iter()), Some(2));
        assert_eq!(argmin(distances.into_iter()), Some(2));
    }

    #[test]
    fn route_set_sorts_by_risk_then_computes_indices() {
        let set = RouteSet::from_routes(vec![
            route_with(0.3, 600.0, 5000.0),
            route_with(0.1, 900.0, 7000.0),
            route_with(0.6, 300.0, 4000.0),
        ]);

        // Ascending by risk: 0.1, 0.3, 0.6.
        assert_eq!(set.routes[0].avg_risk, 0.1);
        assert_eq!(set.safest_index, Some(0));
        // The 300s route sorted to the back.
        assert_eq!(set.fastest_index, Some(2));
        assert_eq!(set.shortest_index, Some(2));
        assert_eq!(set.routes[0].theme, RouteTheme::Safe);
        assert_eq!(set.routes[2].theme, RouteTheme::Moderate);
        assert_eq!(set.routes[1].theme, RouteTheme::Risky);
    }

    #[test]
    fn route_ids_follow_sorted_order() {
        let set = RouteSet::from_routes(vec![
            route_with(0.9, 100.0, 100.0),
            route_with(0.2, 200.0, 200.0),
        ]);
        assert_eq!(set.routes[0].id, "route-0");
        assert_eq!(set.routes[0].avg_risk, 0.2);
        assert_eq!(set.routes[1].id, "route-1");
    }

    #[test]
    fn empty_route_set() {
        let set = RouteSet::from_routes(Vec::new());
        assert!(set.is_empty());
        assert_eq!(set.safest_index, None);
        assert_eq!(set.fastest_index, None);
        assert_eq!(set.shortest_index, None);
    }

    #[test]
    fn average_risk_of_empty_probs_is_neutral() {
        assert_eq!(average_risk(&[]), 0.5);
        let mean = average_risk(&[0.2, 0.4, 0.6]);
        assert!((mean - 0.4).abs() < 1e-12);
    }

    #[test]
    fn normalize_passes_lng_lat_through() {
        let coords = vec![[-96.8, 32.9], [-96.7, 32.95]];
        assert_eq!(normalize_coords(coords.clone()), coords);
    }

    #[test]
    fn normalize_swaps_lat_lng_pairs() {
        let coords = vec![[32.9, -96.8], [32.95, -96.7]];
        assert_eq!(
            normalize_coords(coords),
            vec![[-96.8, 32.9], [-96.7, 32.95]]
        );
    }

    #[test]
    fn normalize_empty_input_is_empty() {
        assert!(normalize_coords(Vec::new()).is_empty());
    }

    #[test]
    fn haversine_identical_points_is_zero() {
        let coords = vec![[-96.75, 32.99], [-96.75, 32.99]];
        assert_eq!(estimate_distance_meters(&coords), 0.0);
    }

    #[test]
    fn haversine_one_degree_longitude_at_equator() {
        let coords = vec![[0.0, 0.0], [1.0, 0.0]];
        let dist = estimate_distance_meters(&coords);
        let expected = 111_000.0;
        assert!(
            (dist - expected).abs() / expected < 0.01,
            "got {dist}, expected ~{expected}"
        );
    }

    #[test]
    fn single_point_has_no_distance() {
        assert_eq!(estimate_distance_meters(&[[-96.8, 32.9]]), 0.0);
    }
}
