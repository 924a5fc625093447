/// Easing curves applied to normalized animation progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    /// Identity.
    Linear,
    /// Quadratic ease-out.
    OutQuad,
    /// Cubic ease-out (the drop-in default).
    OutCubic,
    /// Cubic ease-in-out.
    InOutCubic,
}

impl Ease {
    /// Apply the curve to `t`, clamping input to `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/ease.rs"]
mod tests;
