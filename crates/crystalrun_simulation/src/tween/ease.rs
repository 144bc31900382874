//! Easing curves.

use bevy::prelude::*;

const BACK_OVERSHOOT: f32 = 1.70158;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum Ease {
    Linear,
    InQuad,
    #[default]
    OutQuad,
    InOutQuad,
    /// Overshoot-in (сначала чуть назад)
    InBack,
    /// Overshoot-out (чуть дальше цели и обратно)
    OutBack,
}

impl Ease {
    /// t ∈ [0, 1] → eased t. Концы всегда 0 и 1
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        let c1 = BACK_OVERSHOOT;
        let c3 = c1 + 1.0;

        match self {
            Ease::Linear => t,
            Ease::InQuad => t * t,
            Ease::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Ease::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Ease::InBack => c3 * t * t * t - c1 * t * t,
            Ease::OutBack => {
                let u = t - 1.0;
                1.0 + c3 * u * u * u + c1 * u * u
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ALL: [Ease; 6] = [
        Ease::Linear,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::InBack,
        Ease::OutBack,
    ];

    #[test]
    fn test_endpoints() {
        for ease in ALL {
            assert_relative_eq!(ease.apply(0.0), 0.0, epsilon = 1e-5);
            assert_relative_eq!(ease.apply(1.0), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_back_overshoots() {
        assert!(Ease::InBack.apply(0.2) < 0.0);
        assert!(Ease::OutBack.apply(0.8) > 1.0);
    }

    #[test]
    fn test_out_quad_midpoint() {
        assert_relative_eq!(Ease::OutQuad.apply(0.5), 0.75);
        assert_relative_eq!(Ease::InOutQuad.apply(0.5), 0.5);
    }
}
