use serde::Serialize;

use crate::gradient::GradientStop;
use crate::route::{LngLat, Route};

/// Lifecycle of one route overlay on the map. Transitions are explicit so
/// correctness does not depend on any UI framework's mount/unmount ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Absent,
    Attached,
    Updating,
    Detached,
}

/// Imperative map-layer operations emitted by the state machine. The map
/// client applies these in order; the scoring pipeline never touches the
/// map directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LayerCommand {
    AddSource { id: String, coords: Vec<LngLat> },
    UpdateSource { id: String, coords: Vec<LngLat> },
    SetGradient { id: String, stops: Vec<GradientStop> },
    RemoveLayers { id: String },
}

pub struct RouteOverlay {
    id: String,
    state: OverlayState,
}

impl RouteOverlay {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: OverlayState::Absent,
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    /// Absent/Detached -> Attached. Routes without a drawable line (fewer
    /// than two points) leave the overlay absent and emit nothing.
    pub fn attach(&mut self, route: &Route) -> Vec<LayerCommand> {
        match self.state {
            OverlayState::Absent | OverlayState::Detached => {
                if route.coords.len() < 2 {
                    log::warn!("overlay {}: not enough coordinates to attach", self.id);
                    self.state = OverlayState::Absent;
                    return Vec::new();
                }
                self.state = OverlayState::Attached;
                vec![
                    LayerCommand::AddSource {
                        id: self.id.clone(),
                        coords: route.coords.clone(),
                    },
                    LayerCommand::SetGradient {
                        id: self.id.clone(),
                        stops: route.gradient.clone(),
                    },
                ]
            }
            OverlayState::Attached | OverlayState::Updating => self.update(route),
        }
    }

    /// Attached -> Updating. The overlay stays Updating until the map client
    /// acknowledges the emitted commands via [`commit`](Self::commit); a
    /// further update before that simply re-emits against the same pending
    /// state. Updating an overlay that was never attached is an attach.
    pub fn update(&mut self, route: &Route) -> Vec<LayerCommand> {
        match self.state {
            OverlayState::Attached | OverlayState::Updating => {
                if route.coords.len() < 2 {
                    return self.detach();
                }
                self.state = OverlayState::Updating;
                vec![
                    LayerCommand::UpdateSource {
                        id: self.id.clone(),
                        coords: route.coords.clone(),
                    },
                    LayerCommand::SetGradient {
                        id: self.id.clone(),
                        stops: route.gradient.clone(),
                    },
                ]
            }
            OverlayState::Absent | OverlayState::Detached => self.attach(route),
        }
    }

    /// Updating -> Attached, called once the map client has applied the
    /// pending commands. A no-op in every other state.
    pub fn commit(&mut self) {
        if self.state == OverlayState::Updating {
            self.state = OverlayState::Attached;
        }
    }

    /// Any state -> Detached. Removal commands are only emitted when layers
    /// could actually be on the map.
    pub fn detach(&mut self) -> Vec<LayerCommand> {
        let was_live = matches!(self.state, OverlayState::Attached | OverlayState::Updating);
        self.state = OverlayState::Detached;
        if was_live {
            vec![LayerCommand::RemoveLayers {
                id: self.id.clone(),
            }]
        } else {
            Vec::new()
        }
    }
}
