use serde::Serialize;

/// Discrete bucket a fit score falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tier {
    High,
    Medium,
    Low,
}

/// Colour family used for a tier's score panel and bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColorTier {
    Green,
    Sky,
    Amber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub tier: Tier,
    pub label: &'static str,
    pub match_quality: &'static str,
}

impl Classification {
    pub fn color(&self) -> ColorTier {
        match self.tier {
            Tier::High => ColorTier::Green,
            Tier::Medium => ColorTier::Sky,
            Tier::Low => ColorTier::Amber,
        }
    }
}

/// Lower bounds are inclusive: 80 is High, 60 is Medium.
pub const HIGH_THRESHOLD: u8 = 80;
pub const MEDIUM_THRESHOLD: u8 = 60;

/// Maps a 0-100 fit score to its tier and copy.
///
/// Scores are clamped to 100 when the payload is parsed, so every `u8` that
/// reaches here is in range; anything above 100 would still land in High.
pub fn classify(score: u8) -> Classification {
    if score >= HIGH_THRESHOLD {
        Classification {
            tier: Tier::High,
            label: "Excellent Match",
            match_quality: "High",
        }
    } else if score >= MEDIUM_THRESHOLD {
        Classification {
            tier: Tier::Medium,
            label: "Good Match",
            match_quality: "Medium",
        }
    } else {
        Classification {
            tier: Tier::Low,
            label: "Potential Match",
            match_quality: "Fair",
        }
    }
}
