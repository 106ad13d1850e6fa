use serde::{Deserialize, Serialize};

/// Plies without a capture or pawn move before the game is drawn.
pub const DEFAULT_DRAW_THRESHOLD: u32 = 50;

/// Rule parameters for a `ChessBoard`. Missing JSON fields fall back to the
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub draw_threshold: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            draw_threshold: DEFAULT_DRAW_THRESHOLD,
        }
    }
}

impl BoardConfig {
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = BoardConfig::from_json("{}").expect("empty object");
        assert_eq!(config, BoardConfig::default());
        assert_eq!(config.draw_threshold, 50);

        let config = BoardConfig::from_json(r#"{"draw_threshold": 20}"#).expect("threshold");
        assert_eq!(config.draw_threshold, 20);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(BoardConfig::from_json(r#"{"draw_threshold": "soon"}"#).is_err());
    }
}
