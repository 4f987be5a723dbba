// src/report/mod.rs
// Canonical vibe report and its building blocks

mod mock;
mod normalize;
mod raw;

pub use mock::MockFallbackProvider;
pub use normalize::{normalize, strip_code_fences};
pub use raw::{RawFlag, RawReply, RawVibe, ReplyShape};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Glyph attached to flags that arrive as plain strings
pub const DEFAULT_FLAG_EMOJI: &str = "🚩";

/// Coarse verdict bucket for the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelCategory {
    Sketchy,
    Mixed,
    Solid,
}

impl LabelCategory {
    /// Case-insensitive parse of the model's label category
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sketchy" => Some(Self::Sketchy),
            "mixed" => Some(Self::Mixed),
            "solid" => Some(Self::Solid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// One of the three fixed reply styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Empathetic,
    Direct,
    Playful,
}

impl Tone {
    pub const ALL: [Tone; 3] = [Tone::Empathetic, Tone::Direct, Tone::Playful];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empathetic => "empathetic",
            Self::Direct => "direct",
            Self::Playful => "playful",
        }
    }

    /// Parse a tone label. Case-insensitive; compound labels such as
    /// "Playful/Snarky" resolve by their first segment.
    pub fn parse(s: &str) -> Option<Self> {
        let head = s.split('/').next().unwrap_or("").trim().to_lowercase();
        match head.as_str() {
            "empathetic" => Some(Self::Empathetic),
            "direct" => Some(Self::Direct),
            "playful" => Some(Self::Playful),
            _ => None,
        }
    }

    /// Reply used when the model gives nothing usable for this tone
    pub fn default_reply(&self) -> Reply {
        let (text, why) = match self {
            Self::Empathetic => (
                "Thanks for sharing that with me",
                "Shows appreciation while keeping it light",
            ),
            Self::Direct => ("That's good to know", "Clear and straightforward response"),
            Self::Playful => ("Haha interesting! 😄", "Keeps the mood light and engaging"),
        };
        Reply {
            text: text.to_string(),
            why: why.to_string(),
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labeled behavioral pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    pub why: String,
}

/// Suggested replies, one per tone. Always exactly three complete entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replies {
    pub empathetic: Reply,
    pub direct: Reply,
    pub playful: Reply,
}

impl Replies {
    pub fn defaults() -> Self {
        Self {
            empathetic: Tone::Empathetic.default_reply(),
            direct: Tone::Direct.default_reply(),
            playful: Tone::Playful.default_reply(),
        }
    }

    pub fn get(&self, tone: Tone) -> &Reply {
        match tone {
            Tone::Empathetic => &self.empathetic,
            Tone::Direct => &self.direct,
            Tone::Playful => &self.playful,
        }
    }

    fn get_mut(&mut self, tone: Tone) -> &mut Reply {
        match tone {
            Tone::Empathetic => &mut self.empathetic,
            Tone::Direct => &mut self.direct,
            Tone::Playful => &mut self.playful,
        }
    }
}

/// The canonical, always-complete analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VibeReport {
    /// 0-100, higher is healthier
    pub score: u8,
    pub label: String,
    pub label_category: LabelCategory,
    pub relationship_type: String,
    pub emoji_summary: String,
    pub pull_quote: String,
    pub feedback: String,
    pub confidence: String,
    pub confidence_level: ConfidenceLevel,
    pub flags: Vec<Flag>,
    pub replies: Replies,
}

impl VibeReport {
    pub const DEFAULT_SCORE: u8 = 50;
    pub const DEFAULT_LABEL: &'static str = "Mixed Signals";
    pub const DEFAULT_RELATIONSHIP_TYPE: &'static str = "unclear";
    pub const DEFAULT_EMOJI_SUMMARY: &'static str = "🤔🤷";
    pub const DEFAULT_PULL_QUOTE: &'static str = "Nothing quotable stood out.";
    pub const DEFAULT_FEEDBACK: &'static str =
        "We couldn't get a clean read on this one. Paste a bit more of the convo and try again.";
    pub const DEFAULT_CONFIDENCE: &'static str = "Shooting blanks";

    /// Report used field-by-field when the model output is missing or malformed
    pub fn defaults() -> Self {
        Self {
            score: Self::DEFAULT_SCORE,
            label: Self::DEFAULT_LABEL.to_string(),
            label_category: LabelCategory::Mixed,
            relationship_type: Self::DEFAULT_RELATIONSHIP_TYPE.to_string(),
            emoji_summary: Self::DEFAULT_EMOJI_SUMMARY.to_string(),
            pull_quote: Self::DEFAULT_PULL_QUOTE.to_string(),
            feedback: Self::DEFAULT_FEEDBACK.to_string(),
            confidence: Self::DEFAULT_CONFIDENCE.to_string(),
            confidence_level: ConfidenceLevel::Low,
            flags: Vec::new(),
            replies: Replies::defaults(),
        }
    }
}
