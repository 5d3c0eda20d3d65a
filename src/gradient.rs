use serde::Serialize;

/// Number of evenly spaced gradient stops emitted per route line.
const STOPS: usize = 10;

/// One color stop along the line, position in [0,1] of line progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientStop {
    pub position: f64,
    pub color: String,
}

/// Maps a probs sequence onto HSL color stops for the map's gradient-line
/// primitive: risk 0 is green (hue 120), risk 1 is red (hue 0), with
/// piecewise-linear interpolation between the sampled probs.
pub fn gradient_stops(probs: &[f64]) -> Vec<GradientStop> {
    if probs.is_empty() {
        return Vec::new();
    }
    (0..=STOPS)
        .map(|i| {
            let position = i as f64 / STOPS as f64;
            let risk = risk_at(probs, position);
            let hue = 120.0 * (1.0 - risk);
            GradientStop {
                position,
                color: format!("hsl({hue:.0}, 80%, 60%)"),
            }
        })
        .collect()
}

/// Linear interpolation into probs at normalized position t.
fn risk_at(probs: &[f64], t: f64) -> f64 {
    if probs.len() == 1 {
        return probs[0];
    }
    let pos = t.clamp(0.0, 1.0) * (probs.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(probs.len() - 1);
    let frac = pos - lo as f64;
    probs[lo] + (probs[hi] - probs[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_probs_produce_no_stops() {
        assert!(gradient_stops(&[]).is_empty());
    }

    #[test]
    fn stop_count_and_positions() {
        let stops = gradient_stops(&[0.5; 10]);
        assert_eq!(stops.len(), STOPS + 1);
        assert_eq!(stops[0].position, 0.0);
        assert_eq!(stops[STOPS].position, 1.0);
        for pair in stops.windows(2) {
            assert!(pair[0].position < pair[1].position);
        }
    }

    #[test]
    fn low_risk_is_green_high_risk_is_red() {
        let stops = gradient_stops(&[0.0, 1.0]);
        assert_eq!(stops[0].color, "hsl(120, 80%, 60%)");
        assert_eq!(stops[STOPS].color, "hsl(0, 80%, 60%)");
    }

    #[test]
    fn uniform_probs_give_uniform_color() {
        let stops = gradient_stops(&[0.5, 0.5, 0.5]);
        assert!(stops.iter().all(|s| s.color == stops[0].color));
    }

    #[test]
    fn interpolates_between_samples() {
        // Midpoint of [0, 1] is risk 0.5, hue 60.
        assert!((risk_at(&[0.0, 1.0], 0.5) - 0.5).abs() < 1e-12);
        assert_eq!(risk_at(&[0.7], 0.3), 0.7);
    }
}
