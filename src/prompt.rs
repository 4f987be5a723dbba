// src/prompt.rs
// Fixed instruction template wrapped around the sanitized conversation

/// System message sent ahead of every analysis prompt
const SYSTEM_PERSONA: &str = "You are VibeScore, a tone-savvy AI trained to analyze relationship dynamics with swagger, empathy, and sharp observational skills.";

/// Persona and response schema. The conversation is appended after this.
const INSTRUCTIONS: &str = r#"You are VibeScore's analysis engine. Voice: the brutally honest best friend who reads therapy books but talks in group chat language, spots patterns from the first message, and delivers uncomfortable truths with warmth. Return a JSON object with the following:

- score (number from 0-100): How healthy the overall vibe is
- label (string): Something like "Turbulence Ahead", "Mixed Signals", or "Vibes are Immaculate"
- labelCategory (string): One of "Sketchy", "Mixed", or "Solid"
- relationshipType (string): Guess whether this is romantic, platonic, work, family, etc.
- emojiSummary (string): 2-5 emojis that reflect the emotional tone
- pullQuote (string): A verbatim excerpt from the conversation that most clearly shows the pattern behind the score. Do not paraphrase or summarize.
- feedback (string): Swagger-filled, insightful analysis (max 2 sentences)
- confidence (string): Something like "Through the roof", "Moderate clarity", or "Shooting blanks"
- confidenceLevel (string): One of "High", "Medium", or "Low"
- flags (array of strings): Emotional patterns like "love bombing", "insecurity", "gaslighting"
- replies (array): Exactly three replies, one for each tone: "empathetic", "direct", and "playful". Each has this structure:
  - tone: one of the three tones
  - message: the suggested reply, in the same voice and style as the original conversation
  - rationale: why this message works in this context
  - expectedOutcome: what the sender might expect from sending this

The replies must match the voice and delivery of the original conversation (texting shorthand, slang, emojis, grammar).

Use informal, familiar, witty, warm language. Don't sound like a therapist. Keep it sharp and entertaining but emotionally aware.

SPEAKER IDENTIFICATION: First work out who is speaking. Identify the participant most likely seeking advice (typically the person receiving the concerning messages). All analysis and replies are from THAT person's perspective only.

Here's the conversation:
""""#;

const TRAILER: &str = r#""""

Respond only with a JSON object. Do not include commentary or markdown. Do not explain yourself."#;

/// Rendered prompt ready for the chat completions API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPayload {
    pub system: String,
    pub user: String,
}

/// Renders the analysis template. Stateless and deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Interpolate `sanitized_text` verbatim into the quoted section
    pub fn build(&self, sanitized_text: &str) -> PromptPayload {
        let mut user =
            String::with_capacity(INSTRUCTIONS.len() + sanitized_text.len() + TRAILER.len() + 2);
        user.push_str(INSTRUCTIONS);
        user.push('\n');
        user.push_str(sanitized_text);
        user.push('\n');
        user.push_str(TRAILER);

        PromptPayload {
            system: SYSTEM_PERSONA.to_string(),
            user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_is_deterministic() {
        let builder = PromptBuilder::new();
        assert_eq!(builder.build("hey"), builder.build("hey"));
        assert_ne!(builder.build("hey").user, builder.build("hi").user);
    }

    #[test]
    fn test_text_is_interpolated_verbatim_in_quotes() {
        let text = "him: u up?\nme: it's 3am \"seriously\"";
        let payload = PromptBuilder::new().build(text);
        let expected = format!("\"\"\"\n{}\n\"\"\"", text);
        assert!(payload.user.contains(&expected));
    }

    #[test]
    fn test_template_describes_schema() {
        let payload = PromptBuilder::new().build("x");
        for field in [
            "score",
            "labelCategory",
            "relationshipType",
            "emojiSummary",
            "pullQuote",
            "confidenceLevel",
            "flags",
            "replies",
            "empathetic",
            "direct",
            "playful",
        ] {
            assert!(payload.user.contains(field), "template missing {}", field);
        }
        assert!(payload.user.ends_with("Do not explain yourself."));
    }

    #[test]
    fn test_system_persona() {
        let payload = PromptBuilder::new().build("x");
        assert!(payload.system.starts_with("You are VibeScore"));
    }
}
