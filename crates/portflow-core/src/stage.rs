//! # Session Stages
//!
//! A session moves through four fixed phases. Every selection result carries
//! one widget list per stage and every widget definition belongs to one.
//!
//! | Stage | Purpose |
//! |-------|---------|
//! | diverge | Generate options |
//! | organize | Group and structure |
//! | converge | Weigh and decide |
//! | summary | Close the session |

use serde::{Deserialize, Serialize};

/// The four session stages, in progression order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Generate options.
    Diverge,
    /// Group and structure.
    Organize,
    /// Weigh and decide.
    Converge,
    /// Close the session.
    Summary,
}

impl Stage {
    /// All stages in progression order.
    pub const ALL: [Stage; 4] = [
        Stage::Diverge,
        Stage::Organize,
        Stage::Converge,
        Stage::Summary,
    ];

    /// Get the wire name of the stage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Diverge => "diverge",
            Stage::Organize => "organize",
            Stage::Converge => "converge",
            Stage::Summary => "summary",
        }
    }

    /// Parse a wire name. Returns `None` for anything outside the four stages.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Stage> {
        Stage::ALL.into_iter().find(|s| s.as_str() == name)
    }

    /// Get the next stage, if any.
    #[must_use]
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Diverge => Some(Stage::Organize),
            Stage::Organize => Some(Stage::Converge),
            Stage::Converge => Some(Stage::Summary),
            Stage::Summary => None,
        }
    }

    /// Get the previous stage, if any.
    #[must_use]
    pub fn previous(&self) -> Option<Stage> {
        match self {
            Stage::Diverge => None,
            Stage::Organize => Some(Stage::Diverge),
            Stage::Converge => Some(Stage::Organize),
            Stage::Summary => Some(Stage::Converge),
        }
    }

    /// Check if this stage closes the session.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Summary)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_progression() {
        assert_eq!(Stage::Diverge.next(), Some(Stage::Organize));
        assert_eq!(Stage::Summary.next(), None);
        assert_eq!(Stage::Diverge.previous(), None);
        assert_eq!(Stage::Summary.previous(), Some(Stage::Converge));
    }

    #[test]
    fn stage_ordering_matches_progression() {
        let mut sorted = Stage::ALL;
        sorted.sort();
        assert_eq!(sorted, Stage::ALL);
    }

    #[test]
    fn stage_names_round_trip() {
        for stage in Stage::ALL {
            assert_eq!(Stage::from_name(stage.as_str()), Some(stage));
        }
        assert_eq!(Stage::from_name("review"), None);
    }

    #[test]
    fn only_summary_is_terminal() {
        assert!(Stage::Summary.is_terminal());
        assert!(!Stage::Converge.is_terminal());
    }

    #[test]
    fn stage_serializes_lowercase() {
        let json = serde_json::to_string(&Stage::Converge).expect("serialize");
        assert_eq!(json, "\"converge\"");
    }
}
