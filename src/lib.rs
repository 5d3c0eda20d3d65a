pub mod config;
pub mod directions;
pub mod error;
pub mod gradient;
pub mod overlay;
pub mod risk;
pub mod route;

pub use config::{Config, RiskSourceKind};
pub use directions::{DirectionsClient, UpstreamRoute};
pub use error::RoutingError;
pub use gradient::{GradientStop, gradient_stops};
pub use overlay::{LayerCommand, OverlayState, RouteOverlay};
pub use risk::{CellRiskMap, ConditionSample, NoRisk, RiskSource, SmoothNoise};
pub use route::{Route, RouteSet, RouteSummary, RouteTheme, score_route, score_route_set};
