//! Planet and fleet ownership.

use serde::{Deserialize, Serialize};

/// Who controls a planet or a fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Owner {
    /// The human player.
    Player,
    /// The computer opponent.
    Ai,
    /// Unclaimed. Neutral planets hold a garrison but never produce.
    #[default]
    Neutral,
}

impl Owner {
    /// Get the display name for this owner.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Player => "Player",
            Self::Ai => "AI",
            Self::Neutral => "Neutral",
        }
    }

    /// Whether planets held by this owner take part in production.
    #[must_use]
    pub const fn is_producer(&self) -> bool {
        matches!(self, Self::Player | Self::Ai)
    }
}

impl std::fmt::Display for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_never_produces() {
        assert!(Owner::Player.is_producer());
        assert!(Owner::Ai.is_producer());
        assert!(!Owner::Neutral.is_producer());
    }
}
