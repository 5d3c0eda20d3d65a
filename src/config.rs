use std::env;

use anyhow::Context;
use env_logger::{Builder, Env};

/// Which RiskSource backs the scoring pipeline. Both current options are
/// placeholders for a real risk service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskSourceKind {
    /// Seeded h3 cell grid, sampled per route coordinate.
    Cells,
    /// Smooth random values per route.
    Synthetic,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub google_api_key: String,
    pub risk_source: RiskSourceKind,
    pub max_routes: usize,
    /// Seed point for the cell risk grid (lat, lng).
    pub risk_center: (f64, f64),
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let google_api_key = env::var("GOOGLE_MAPS_API_KEY")
            .context("GOOGLE_MAPS_API_KEY must be set")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let risk_source = match env::var("RISK_SOURCE").as_deref() {
            Ok("cells") => RiskSourceKind::Cells,
            _ => RiskSourceKind::Synthetic,
        };
        let max_routes = env::var("MAX_ROUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);
        let risk_center = parse_center(env::var("RISK_CENTER").ok().as_deref())
            .unwrap_or((32.7767, -96.7970)); // Dallas

        Ok(Self {
            bind_addr,
            google_api_key,
            risk_source,
            max_routes,
            risk_center,
        })
    }
}

fn parse_center(raw: Option<&str>) -> Option<(f64, f64)> {
    let raw = raw?;
    let (lat, lng) = raw.split_once(',')?;
    Some((lat.trim().parse().ok()?, lng.trim().parse().ok()?))
}

/// Log to stderr, RUST_LOG controlling the filter, info by default.
pub fn init_logging() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .format_module_path(false)
        .init();
}
