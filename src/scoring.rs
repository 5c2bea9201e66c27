//! Placement outcome: game over, scored, or perfect.

/// Points for a placement that is not perfect.
pub const PLACEMENT_POINTS: u32 = 50;
/// Points for a perfect placement.
pub const PERFECT_POINTS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Overlap too small; the session ends with no credit.
    GameOver,
    /// Block stays, trimmed to `overlap`.
    Placed { overlap: f32, perfect: bool },
}

impl Outcome {
    pub fn points(&self) -> u32 {
        match self {
            Self::GameOver => 0,
            Self::Placed { perfect: true, .. } => PERFECT_POINTS,
            Self::Placed { perfect: false, .. } => PLACEMENT_POINTS,
        }
    }
}

/// True when `overlap` is within `threshold` of the full previous width.
#[inline]
pub fn is_perfect(overlap: f32, previous_size: f32, threshold: f32) -> bool {
    (overlap - previous_size).abs() < threshold
}

/// Classify a landing.
pub fn judge(overlap: f32, previous_size: f32, min_block_size: f32, threshold: f32) -> Outcome {
    if overlap <= min_block_size {
        return Outcome::GameOver;
    }
    Outcome::Placed {
        overlap,
        perfect: is_perfect(overlap, previous_size, threshold),
    }
}
