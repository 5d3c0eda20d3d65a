use reqwest::Client;
use serde::Deserialize;

use crate::error::RoutingError;
use crate::route::LngLat;

const DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

const VALID_MODES: [&str; 5] = ["driving", "walking", "bicycling", "transit", "two_wheeler"];

/// One route as returned by the directions API, before scoring.
#[derive(Debug, Clone)]
pub struct UpstreamRoute {
    pub polyline: String,
    pub summary: String,
    pub distance_text: String,
    pub duration_text: String,
    pub distance_meters: f64,
    pub duration_secs: f64,
}

// --- Wire format (simplified Google Directions response) ---

#[derive(Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<ApiRoute>,
    status: String,
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct ApiRoute {
    #[serde(default)]
    legs: Vec<ApiLeg>,
    overview_polyline: ApiPolyline,
    summary: Option<String>,
}

#[derive(Deserialize)]
struct ApiPolyline {
    points: String,
}

#[derive(Deserialize)]
struct ApiLeg {
    distance: TextValue,
    duration: TextValue,
}

#[derive(Deserialize)]
struct TextValue {
    text: String,
    #[serde(default)]
    value: f64,
}

pub struct DirectionsClient {
    http: Client,
    api_key: String,
    max_routes: usize,
}

impl DirectionsClient {
    pub fn new(http: Client, api_key: String, max_routes: usize) -> Self {
        Self {
            http,
            api_key,
            max_routes,
        }
    }

    /// Fetches alternate routes between two places. Transport and upstream
    /// failures are descriptive error values; an OK response with zero
    /// routes is its own case so the UI can say "no routes found".
    pub async fn fetch(
        &self,
        origin: &str,
        destination: &str,
        mode: &str,
    ) -> Result<Vec<UpstreamRoute>, RoutingError> {
        let mode = valid_mode(mode);
        log::info!("fetching directions {origin} -> {destination} ({mode})");

        let response = self
            .http
            .get(DIRECTIONS_URL)
            .query(&[
                ("origin", origin),
                ("destination", destination),
                ("mode", mode),
                ("alternatives", "true"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RoutingError::UpstreamStatus(status.as_u16()));
        }

        let text = response.text().await?;
        let body: DirectionsResponse = serde_json::from_str(&text)?;
        routes_from_response(body, self.max_routes)
    }
}

/// Turns a parsed directions body into upstream routes: status checks, the
/// route cap, and the raw-value-else-text fallback for duration and
/// distance. Routes without legs are skipped.
fn routes_from_response(
    body: DirectionsResponse,
    max_routes: usize,
) -> Result<Vec<UpstreamRoute>, RoutingError> {
    if body.status != "OK" {
        if body.status == "ZERO_RESULTS" {
            return Err(RoutingError::NoRoutes);
        }
        return Err(RoutingError::Upstream {
            status: body.status,
            message: body.error_message.unwrap_or_default(),
        });
    }
    if body.routes.is_empty() {
        return Err(RoutingError::NoRoutes);
    }

    log::info!("directions API returned {} route(s)", body.routes.len());

    let routes = body
        .routes
        .into_iter()
        .take(max_routes)
        .filter_map(|route| {
            let leg = route.legs.into_iter().next()?;
            let duration_secs = if leg.duration.value > 0.0 {
                leg.duration.value
            } else {
                parse_duration_secs(&leg.duration.text)
            };
            let distance_meters = if leg.distance.value > 0.0 {
                leg.distance.value
            } else {
                parse_distance_meters(&leg.distance.text)
            };
            Some(UpstreamRoute {
                polyline: route.overview_polyline.points,
                summary: route.summary.unwrap_or_else(|| "Direct Route".to_string()),
                distance_text: leg.distance.text,
                duration_text: leg.duration.text,
                distance_meters,
                duration_secs,
            })
        })
        .collect();

    Ok(routes)
}

/// Unknown travel modes fall back to driving rather than erroring.
pub fn valid_mode(mode: &str) -> &str {
    if VALID_MODES.contains(&mode) {
        mode
    } else {
        "driving"
    }
}

/// Decodes an overview polyline (precision 5) into (lng, lat) pairs.
/// Undecodable input is an empty route, never an error.
pub fn decode_route_polyline(encoded: &str) -> Vec<LngLat> {
    match polyline::decode_polyline(encoded, 5) {
        Ok(line) => line.coords().map(|c| [c.x, c.y]).collect(),
        Err(err) => {
            log::warn!("failed to decode polyline: {err}");
            Vec::new()
        }
    }
}

/// Parses duration text: the raw "123.45s" form, or "1 hour 5 mins".
/// Unparseable input is 0.
pub fn parse_duration_secs(text: &str) -> f64 {
    let trimmed = text.trim();
    if let Some(stripped) = trimmed.strip_suffix('s') {
        if let Ok(secs) = stripped.trim().parse::<f64>() {
            return secs;
        }
    }

    let mut total = 0.0;
    let mut pending: Option<f64> = None;
    for token in trimmed.split_whitespace() {
        if let Ok(number) = token.replace(',', "").parse::<f64>() {
            pending = Some(number);
        } else if let Some(value) = pending.take() {
            let unit = token.trim_end_matches('s');
            total += match unit {
                "hour" | "hr" | "h" => value * 3600.0,
                "min" | "minute" | "m" => value * 60.0,
                "sec" | "second" => value,
                _ => 0.0,
            };
        }
    }
    total
}

/// Parses distance text like "5.2 km" or "300 m" into meters.
pub fn parse_distance_meters(text: &str) -> f64 {
    let mut pending: Option<f64> = None;
    for token in text.trim().split_whitespace() {
        if let Ok(number) = token.replace(',', "").parse::<f64>() {
            pending = Some(number);
        } else if let Some(value) = pending.take() {
            match token {
                "km" => return value * 1000.0,
                "m" => return value,
                "mi" => return value * 1609.344,
                "ft" => return value * 0.3048,
                _ => {}
            }
        }
    }
    0.0
}
