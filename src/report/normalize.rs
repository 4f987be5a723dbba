// src/report/normalize.rs
// Repairs raw model output into a guaranteed well-formed VibeReport

use serde_json::Value;
use tracing::{debug, warn};

use super::raw::{RawFlag, RawVibe};
use super::{
    ConfidenceLevel, DEFAULT_FLAG_EMOJI, Flag, LabelCategory, Replies, Reply, Tone, VibeReport,
};

/// Strip markdown code fences and surrounding whitespace
pub fn strip_code_fences(s: &str) -> &str {
    let trimmed = s.trim();

    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```JSON"))
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Extract the first balanced `{...}` block, skipping braces inside strings
fn extract_json_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in s[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse the cleaned text, falling back to the first embedded object when the
/// model wrapped its JSON in prose. Unparseable input yields an empty RawVibe.
fn parse_raw(cleaned: &str) -> RawVibe {
    if let Ok(value) = serde_json::from_str::<Value>(cleaned) {
        return RawVibe::from_value(value);
    }
    if let Some(block) = extract_json_object(cleaned) {
        if let Ok(value) = serde_json::from_str::<Value>(block) {
            debug!("Recovered JSON object embedded in model output");
            return RawVibe::from_value(value);
        }
    }
    warn!(
        response_len = cleaned.len(),
        "Model output is not valid JSON, using defaults"
    );
    RawVibe::default()
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn clamp_score(score: f64) -> Option<u8> {
    score
        .is_finite()
        .then(|| score.round().clamp(0.0, 100.0) as u8)
}

fn reconcile_flags(raw: &RawVibe) -> Vec<Flag> {
    raw.parsed_flags()
        .into_iter()
        .filter_map(|flag| match flag {
            RawFlag::Label(kind) => non_blank(Some(kind)).map(|kind| Flag {
                kind,
                emoji: Some(DEFAULT_FLAG_EMOJI.to_string()),
            }),
            RawFlag::Detailed { kind, emoji } => non_blank(Some(kind)).map(|kind| Flag {
                kind,
                emoji: non_blank(emoji),
            }),
        })
        .collect()
}

fn reconcile_replies(raw: &RawVibe) -> Replies {
    let shape = raw.reply_shape();
    let mut replies = Replies::defaults();

    for tone in Tone::ALL {
        let Some(found) = shape.find(tone) else {
            debug!(tone = %tone, "No reply for tone, using default");
            continue;
        };
        let fallback = tone.default_reply();
        *replies.get_mut(tone) = Reply {
            text: found.text.clone().unwrap_or(fallback.text),
            why: found.why.clone().unwrap_or(fallback.why),
        };
    }
    replies
}

/// Turn raw model text into a complete report. Never fails: anything missing
/// or malformed is replaced by the documented default for that field.
pub fn normalize(raw: &str) -> VibeReport {
    let raw = parse_raw(strip_code_fences(raw));
    let defaults = VibeReport::defaults();

    VibeReport {
        score: raw.score.and_then(clamp_score).unwrap_or(defaults.score),
        label: non_blank(raw.label.clone()).unwrap_or(defaults.label),
        label_category: raw
            .label_category
            .as_deref()
            .and_then(LabelCategory::parse)
            .unwrap_or(defaults.label_category),
        relationship_type: non_blank(raw.relationship_type.clone())
            .unwrap_or(defaults.relationship_type),
        emoji_summary: non_blank(raw.emoji_summary.clone()).unwrap_or(defaults.emoji_summary),
        pull_quote: non_blank(raw.pull_quote.clone()).unwrap_or(defaults.pull_quote),
        feedback: non_blank(raw.feedback.clone()).unwrap_or(defaults.feedback),
        confidence: non_blank(raw.confidence.clone()).unwrap_or(defaults.confidence),
        confidence_level: raw
            .confidence_level
            .as_deref()
            .and_then(ConfidenceLevel::parse)
            .unwrap_or(defaults.confidence_level),
        flags: reconcile_flags(&raw),
        replies: reconcile_replies(&raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_response() -> Value {
        json!({
            "score": 34,
            "label": "Turbulence Ahead",
            "labelCategory": "Sketchy",
            "relationshipType": "romantic",
            "emojiSummary": "🚩😬📉",
            "pullQuote": "u know i only act like this bc i care",
            "feedback": "Classic hot-and-cold. Protect your peace.",
            "confidence": "Through the roof",
            "confidenceLevel": "High",
            "flags": ["love bombing", "guilt tripping"],
            "replies": [
                {"tone": "empathetic", "message": "I get that you care, but this hurts", "rationale": "Names the feeling", "expectedOutcome": "Softer reply"},
                {"tone": "direct", "message": "I need consistency or I'm out", "rationale": "Sets a boundary", "expectedOutcome": "Clarity"},
                {"tone": "playful", "message": "caring? in THIS economy? 💀", "rationale": "Defuses with humor", "expectedOutcome": "A laugh, maybe a reset"}
            ]
        })
    }

    // ========================================================================
    // strip_code_fences
    // ========================================================================

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{}"), "{}");
        assert_eq!(strip_code_fences("```json\n{}\n```\n\n"), "{}");
    }

    #[test]
    fn test_extract_json_object_skips_string_braces() {
        let s = r#"Sure! {"label": "a } b", "n": {"x": 1}} hope this helps"#;
        assert_eq!(
            extract_json_object(s),
            Some(r#"{"label": "a } b", "n": {"x": 1}}"#)
        );
        assert_eq!(extract_json_object("no braces"), None);
        assert_eq!(extract_json_object("{ unclosed"), None);
    }

    // ========================================================================
    // normalize
    // ========================================================================

    #[test]
    fn test_full_response_passes_through() {
        let report = normalize(&full_response().to_string());
        assert_eq!(report.score, 34);
        assert_eq!(report.label, "Turbulence Ahead");
        assert_eq!(report.label_category, LabelCategory::Sketchy);
        assert_eq!(report.relationship_type, "romantic");
        assert_eq!(report.confidence_level, ConfidenceLevel::High);
        assert_eq!(report.flags.len(), 2);
        assert_eq!(report.flags[0].kind, "love bombing");
        assert_eq!(report.flags[0].emoji.as_deref(), Some(DEFAULT_FLAG_EMOJI));
        assert_eq!(report.replies.direct.text, "I need consistency or I'm out");
        assert_eq!(report.replies.playful.why, "Defuses with humor");
    }

    #[test]
    fn test_fenced_equals_unwrapped() {
        let plain = full_response().to_string();
        let fenced = format!("```json\n{}\n```", plain);
        assert_eq!(normalize(&fenced), normalize(&plain));

        let bare_fence = format!("```\n{}\n```", plain);
        assert_eq!(normalize(&bare_fence), normalize(&plain));
    }

    #[test]
    fn test_garbage_yields_defaults() {
        for raw in ["", "not json at all", "I'm sorry, I can't help with that.", "{broken", "null", "[1,2]"] {
            assert_eq!(normalize(raw), VibeReport::defaults(), "input: {:?}", raw);
        }
    }

    #[test]
    fn test_json_in_prose_is_recovered() {
        let raw = format!("Here's the analysis:\n{}\nLet me know!", full_response());
        assert_eq!(normalize(&raw).label, "Turbulence Ahead");
    }

    #[test]
    fn test_score_clamped_and_rounded() {
        assert_eq!(normalize(r#"{"score": 140}"#).score, 100);
        assert_eq!(normalize(r#"{"score": -3}"#).score, 0);
        assert_eq!(normalize(r#"{"score": 72.6}"#).score, 73);
        assert_eq!(normalize(r#"{"score": "72"}"#).score, VibeReport::DEFAULT_SCORE);
        assert_eq!(normalize(r#"{"score": null}"#).score, VibeReport::DEFAULT_SCORE);
    }

    #[test]
    fn test_wrong_typed_scalars_use_defaults() {
        let report = normalize(
            r#"{"label": 5, "labelCategory": "Vibey", "confidenceLevel": ["High"], "feedback": "   "}"#,
        );
        let defaults = VibeReport::defaults();
        assert_eq!(report.label, defaults.label);
        assert_eq!(report.label_category, defaults.label_category);
        assert_eq!(report.confidence_level, defaults.confidence_level);
        assert_eq!(report.feedback, defaults.feedback);
    }

    #[test]
    fn test_flags_objects_and_strings() {
        let report = normalize(
            r#"{"flags": ["inconsistency", {"type": "vagueness", "emoji": "🌫️"}, {"type": "  "}, "", 3]}"#,
        );
        assert_eq!(
            report.flags,
            vec![
                Flag {
                    kind: "inconsistency".to_string(),
                    emoji: Some(DEFAULT_FLAG_EMOJI.to_string())
                },
                Flag {
                    kind: "vagueness".to_string(),
                    emoji: Some("🌫️".to_string())
                },
            ]
        );
    }

    #[test]
    fn test_flag_with_non_string_emoji_survives() {
        let report = normalize(r#"{"flags": [{"type": "gaslighting", "emoji": 5}]}"#);
        assert_eq!(
            report.flags,
            vec![Flag {
                kind: "gaslighting".to_string(),
                emoji: None
            }]
        );
    }

    #[test]
    fn test_absent_flags_empty() {
        assert!(normalize("{}").flags.is_empty());
    }

    #[test]
    fn test_reply_shapes_normalize_identically() {
        let array = json!({
            "replies": [
                {"tone": "empathetic", "message": "That sounds rough", "rationale": "Validates"},
                {"tone": "direct", "message": "Are we doing this or not?", "rationale": "Forces clarity"},
                {"tone": "playful", "message": "bestie the mixed signals 😭", "rationale": "Keeps it light"}
            ]
        });
        let object = json!({
            "replies": {
                "empathetic": {"text": "That sounds rough", "why": "Validates"},
                "direct": {"message": "Are we doing this or not?", "rationale": "Forces clarity"},
                "playful": {"text": "bestie the mixed signals 😭", "why": "Keeps it light"}
            }
        });
        let a = normalize(&array.to_string()).replies;
        let b = normalize(&object.to_string()).replies;
        assert_eq!(a, b);
        assert_eq!(a.direct.text, "Are we doing this or not?");
    }

    #[test]
    fn test_partial_replies_filled_per_tone() {
        let report = normalize(
            r#"{"replies": [{"tone": "Direct", "message": "just say it"}, {"tone": "sarcastic", "message": "sure jan"}]}"#,
        );
        assert_eq!(report.replies.direct.text, "just say it");
        assert_eq!(report.replies.direct.why, Tone::Direct.default_reply().why);
        assert_eq!(report.replies.empathetic, Tone::Empathetic.default_reply());
        assert_eq!(report.replies.playful, Tone::Playful.default_reply());
    }

    #[test]
    fn test_suggestions_key_accepted() {
        let report = normalize(
            r#"{"suggestions": [{"tone": "Empathetic", "message": "I'm here", "rationale": "Support"}]}"#,
        );
        assert_eq!(report.replies.empathetic.text, "I'm here");
        assert_eq!(report.replies.empathetic.why, "Support");
    }

    #[test]
    fn test_replies_always_complete() {
        let inputs = [
            "{}",
            r#"{"replies": null}"#,
            r#"{"replies": "nope"}"#,
            r#"{"replies": [{"tone": "direct"}]}"#,
            r#"{"replies": {"empathetic": {}, "unknown": {"text": "x"}}}"#,
        ];
        for raw in inputs {
            let report = normalize(raw);
            for tone in Tone::ALL {
                let reply = report.replies.get(tone);
                assert!(!reply.text.is_empty(), "{} text empty for {}", tone, raw);
                assert!(!reply.why.is_empty(), "{} why empty for {}", tone, raw);
            }
        }
    }
}
