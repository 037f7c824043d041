use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Greeting used when no settings row has been stored yet.
pub const DEFAULT_GREETING: &str = "Hello!";

/// Reply for messages that match no FAQ keyword.
pub const FALLBACK_RESPONSE: &str = "Thank you for your message. For specific inquiries, please contact us \
     through our contact form or email us at info@sinfinimarketing.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Faq {
    /// `message` must already be lowercased.
    fn matches(&self, message: &str) -> bool {
        self.keywords
            .iter()
            .any(|kw| !kw.is_empty() && message.contains(kw.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatbotSettings {
    pub greeting: String,
    /// Travels as JSON text, the same form the column holds.
    #[serde(with = "faqs_text")]
    pub faqs: Vec<Faq>,
    /// `None` when the settings were synthesized rather than loaded.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Replacement greeting and FAQ list; also the body of `PUT /api/chatbot/settings`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatbotSettingsUpdate {
    pub greeting: String,
    #[serde(default, deserialize_with = "faqs_text::deserialize")]
    pub faqs: Vec<Faq>,
}

/// FAQ lists are written as a JSON-encoded string and read back from either
/// that string or a plain array.
mod faqs_text {
    use serde::{Deserialize, Deserializer, Serializer, de, ser};

    use super::Faq;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FaqsRepr {
        Text(String),
        List(Vec<Faq>),
    }

    pub fn serialize<S: Serializer>(faqs: &[Faq], serializer: S) -> Result<S::Ok, S::Error> {
        let text = serde_json::to_string(faqs).map_err(<S::Error as ser::Error>::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Faq>, D::Error> {
        match FaqsRepr::deserialize(deserializer)? {
            FaqsRepr::List(faqs) => Ok(faqs),
            FaqsRepr::Text(text) if text.trim().is_empty() => Ok(Vec::new()),
            FaqsRepr::Text(text) => serde_json::from_str(&text).map_err(<D::Error as de::Error>::custom),
        }
    }
}

impl Default for ChatbotSettings {
    fn default() -> Self {
        Self {
            greeting: DEFAULT_GREETING.to_string(),
            faqs: Vec::new(),
            updated_at: None,
        }
    }
}

impl ChatbotSettings {
    /// First FAQ (in stored order) with a keyword contained in the
    /// lowercased message wins. No scoring.
    pub fn respond(&self, message: &str) -> &str {
        let message = message.to_lowercase();
        self.faqs
            .iter()
            .find(|faq| faq.matches(&message))
            .map(|faq| faq.answer.as_str())
            .unwrap_or(FALLBACK_RESPONSE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faq(keywords: &[&str], answer: &str) -> Faq {
        Faq {
            question: String::new(),
            answer: answer.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn settings(faqs: Vec<Faq>) -> ChatbotSettings {
        ChatbotSettings {
            faqs,
            ..Default::default()
        }
    }

    #[test]
    fn matches_keyword_substring() {
        let bot = settings(vec![faq(&["export"], "A"), faq(&["contact"], "B")]);
        assert_eq!(bot.respond("Where do you export to?"), "A");
        assert_eq!(bot.respond("How do I CONTACT you"), "B");
    }

    #[test]
    fn falls_back_when_nothing_matches() {
        let bot = settings(vec![faq(&["export"], "A"), faq(&["contact"], "B")]);
        assert_eq!(bot.respond("hello"), FALLBACK_RESPONSE);
        assert_eq!(ChatbotSettings::default().respond("export"), FALLBACK_RESPONSE);
    }

    #[test]
    fn first_stored_entry_wins_on_overlap() {
        let bot = settings(vec![
            faq(&["ship"], "first"),
            faq(&["export", "ship"], "second"),
        ]);
        assert_eq!(bot.respond("do you ship abroad"), "first");
        assert_eq!(bot.respond("do you export"), "second");
    }

    #[test]
    fn empty_keyword_never_matches() {
        let bot = settings(vec![faq(&[""], "always")]);
        assert_eq!(bot.respond("anything"), FALLBACK_RESPONSE);
    }

    #[test]
    fn faq_fields_default_when_missing() {
        let faqs: Vec<Faq> = serde_json::from_str(r#"[{"answer": "hi"}]"#).unwrap();
        assert_eq!(faqs[0].answer, "hi");
        assert!(faqs[0].keywords.is_empty());
    }

    #[test]
    fn faqs_serialize_as_json_text() {
        let bot = settings(vec![faq(&["export"], "A")]);
        let value = serde_json::to_value(&bot).unwrap();
        let text = value["faqs"].as_str().unwrap();
        let faqs: Vec<Faq> = serde_json::from_str(text).unwrap();
        assert_eq!(faqs, bot.faqs);

        let back: ChatbotSettings = serde_json::from_value(value).unwrap();
        assert_eq!(back, bot);
    }

    #[test]
    fn update_accepts_list_or_text() {
        let from_list: ChatbotSettingsUpdate = serde_json::from_str(
            r#"{"greeting": "Hi", "faqs": [{"answer": "A", "keywords": ["export"]}]}"#,
        )
        .unwrap();
        let from_text: ChatbotSettingsUpdate = serde_json::from_str(
            r#"{"greeting": "Hi", "faqs": "[{\"answer\": \"A\", \"keywords\": [\"export\"]}]"}"#,
        )
        .unwrap();
        assert_eq!(from_list.faqs, from_text.faqs);
        assert_eq!(from_list.faqs[0].keywords, vec!["export"]);

        let omitted: ChatbotSettingsUpdate = serde_json::from_str(r#"{"greeting": "Hi"}"#).unwrap();
        assert!(omitted.faqs.is_empty());
        assert!(serde_json::from_str::<ChatbotSettingsUpdate>(r#"{"greeting": "Hi", "faqs": "not json"}"#).is_err());
    }
}
