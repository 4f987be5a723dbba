// src/report/mock.rs
// Fixed report served when the model is unconfigured or unreachable

use super::{ConfidenceLevel, Flag, LabelCategory, Replies, VibeReport};

/// Supplies the same canonical report on every call
#[derive(Debug, Clone, Copy, Default)]
pub struct MockFallbackProvider;

impl MockFallbackProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn provide(&self) -> VibeReport {
        VibeReport {
            score: 68,
            label: "Mixed Signals".to_string(),
            label_category: LabelCategory::Mixed,
            relationship_type: "romantic".to_string(),
            emoji_summary: "🤔📉🧐".to_string(),
            pull_quote: "“Idk if I’ll be around but maybe hit me up”".to_string(),
            feedback: "The energy here is a little unclear. Test the waters, but don't cannonball in."
                .to_string(),
            confidence: "Moderate clarity".to_string(),
            confidence_level: ConfidenceLevel::Medium,
            flags: vec![
                Flag {
                    kind: "inconsistency".to_string(),
                    emoji: Some("🔄".to_string()),
                },
                Flag {
                    kind: "vagueness".to_string(),
                    emoji: Some("🌫️".to_string()),
                },
            ],
            replies: Replies::defaults(),
        }
    }
}
