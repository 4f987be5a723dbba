// src/report/raw.rs
// Loosely-typed model output: every field optional, wrong types dropped

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::Tone;

/// Deserialize a field as `T`, yielding `None` instead of an error when the
/// value has the wrong shape
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Parsed model JSON before reconciliation against the canonical report
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVibe {
    #[serde(default, deserialize_with = "lenient")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub label_category: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub relationship_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub emoji_summary: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub pull_quote: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub feedback: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub confidence: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub confidence_level: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub flags: Option<Vec<Value>>,
    #[serde(default)]
    pub replies: Option<Value>,
    #[serde(default)]
    pub suggestions: Option<Value>,
}

impl RawVibe {
    /// Interpret a JSON value; anything but an object is treated as absent
    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Flags that parsed as either a plain label or a `{type, emoji}` object
    pub fn parsed_flags(&self) -> Vec<RawFlag> {
        self.flags
            .iter()
            .flatten()
            .filter_map(|v| serde_json::from_value::<RawFlag>(v.clone()).ok())
            .collect()
    }

    /// Detect which shape the replies arrived in. `replies` wins over the
    /// older `suggestions` key when both are usable.
    pub fn reply_shape(&self) -> ReplyShape {
        match ReplyShape::detect(self.replies.as_ref()) {
            ReplyShape::Absent => ReplyShape::detect(self.suggestions.as_ref()),
            shape => shape,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawFlag {
    Label(String),
    Detailed {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default, deserialize_with = "lenient")]
        emoji: Option<String>,
    },
}

/// One reply candidate with aliases already resolved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawReply {
    pub tone: Option<String>,
    pub text: Option<String>,
    pub why: Option<String>,
}

/// First non-blank string among `keys`
fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

impl RawReply {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(obj) => Some(Self {
                tone: first_text(obj, &["tone"]),
                text: first_text(obj, &["message", "text"]),
                why: first_text(obj, &["rationale", "why"]),
            }),
            // A bare string under a tone key is the reply text itself
            Value::String(s) if !s.trim().is_empty() => Some(Self {
                text: Some(s.trim().to_string()),
                ..Self::default()
            }),
            _ => None,
        }
    }
}

/// The shapes the model has been seen to use for replies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyShape {
    /// `[{tone, message, rationale, expectedOutcome}, ...]`
    ArrayOfReplyObjects(Vec<RawReply>),
    /// `{ "empathetic": {text|message, why|rationale}, ... }`
    ToneKeyedObject(Vec<(String, RawReply)>),
    Absent,
}

impl ReplyShape {
    pub fn detect(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Array(items)) => {
                let replies: Vec<_> = items.iter().filter_map(RawReply::from_value).collect();
                if replies.is_empty() {
                    Self::Absent
                } else {
                    Self::ArrayOfReplyObjects(replies)
                }
            }
            Some(Value::Object(obj)) => {
                let replies: Vec<_> = obj
                    .iter()
                    .filter_map(|(k, v)| RawReply::from_value(v).map(|r| (k.clone(), r)))
                    .collect();
                if replies.is_empty() {
                    Self::Absent
                } else {
                    Self::ToneKeyedObject(replies)
                }
            }
            _ => Self::Absent,
        }
    }

    /// Find the entry for `tone`; first match wins
    pub fn find(&self, tone: Tone) -> Option<&RawReply> {
        match self {
            Self::ArrayOfReplyObjects(replies) => replies
                .iter()
                .find(|r| r.tone.as_deref().and_then(Tone::parse) == Some(tone)),
            Self::ToneKeyedObject(entries) => entries
                .iter()
                .find(|(key, _)| Tone::parse(key) == Some(tone))
                .map(|(_, reply)| reply),
            Self::Absent => None,
        }
    }
}
