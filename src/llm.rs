//! Groq LLM Integration
//!
//! Proxies free-form phrases to Groq's OpenAI-compatible completion API and
//! extracts structured page actions from phrases the keyword dispatcher did
//! not recognize.

use crate::config::Config;
use crate::error::VoiceResult;
use serde::Deserialize;
use tracing::{debug, warn};

/// Page action extracted from natural language
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSuggestion {
    pub action: String,
    pub argument: Option<String>,
    pub confidence: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Handles Groq completion calls
#[derive(Clone)]
pub struct GroqClient {
    url: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
    enabled: bool,
}

impl GroqClient {
    /// Create new Groq client from config
    pub fn new(config: &Config) -> Self {
        Self {
            url: config.groq_url.clone(),
            model: config.groq_model.clone(),
            api_key: config.groq_api_key.clone(),
            temperature: config.groq_temperature,
            max_tokens: config.groq_max_tokens,
            enabled: config.groq_enabled && !config.groq_api_key.is_empty(),
        }
    }

    /// Check if the Groq proxy is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Health check - verify the API is reachable with our key
    pub async fn health_check(&self) -> bool {
        if !self.enabled {
            return false;
        }

        let models_url = self.url.replace("/chat/completions", "/models");
        let client = reqwest::Client::new();
        match client
            .get(models_url)
            .bearer_auth(&self.api_key)
            .timeout(std::time::Duration::from_secs(2))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// Get a plain completion for a prompt
    pub async fn complete(&self, prompt: &str) -> VoiceResult<Option<String>> {
        if !self.enabled {
            return Ok(None);
        }

        let system = "You are a voice assistant embedded in a web page. \
                      Answer briefly, in one or two sentences.";
        self.chat(system, prompt).await
    }

    /// Convert an unrecognized phrase into a page action
    pub async fn extract_action(&self, phrase: &str) -> VoiceResult<Option<ActionSuggestion>> {
        if !self.enabled {
            return Ok(None);
        }

        let prompt = Self::build_action_prompt(phrase);
        let system = "You map voice phrases to page actions. Respond with ONLY valid JSON.";

        match self.chat(system, &prompt).await? {
            Some(content) => Ok(Self::parse_action_response(&content)),
            None => Ok(None),
        }
    }

    async fn chat(&self, system: &str, user: &str) -> VoiceResult<Option<String>> {
        let client = reqwest::Client::new();
        let response = client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [
                    { "role": "system", "content": system },
                    { "role": "user", "content": user }
                ],
                "temperature": self.temperature,
                "max_tokens": self.max_tokens
            }))
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await?;

        let status = response.status();
        let body_text = response.text().await?;

        if !status.is_success() {
            warn!("❌ Groq API Error ({}): {}", status, body_text);
            return Ok(None);
        }

        debug!("🧠 Groq raw body: {}", body_text);

        let chat: ChatResponse = match serde_json::from_str(&body_text) {
            Ok(r) => r,
            Err(e) => {
                warn!("❌ Failed to deserialize Groq response: {} - Body: {}", e, body_text);
                return Ok(None);
            }
        };

        Ok(chat.choices.into_iter().next().map(|c| c.message.content))
    }

    fn build_action_prompt(phrase: &str) -> String {
        format!(
            r#"Phrase: "{phrase}"

Respond with JSON in this exact format:
{{"action": "action_name", "argument": "value or null", "confidence": 0.9}}

Valid actions:
- scroll_down, scroll_up, scroll_top, scroll_bottom: Move the page
- back, forward, refresh: Browser navigation
- type: Insert text into the focused field. Argument: the text
- clear: Empty the focused field
- submit: Submit the current form
- unknown: Cannot determine action

JSON response:"#
        )
    }

    fn parse_action_response(response: &str) -> Option<ActionSuggestion> {
        // Find JSON in the response (the model may include extra text)
        let start = response.find('{')?;
        let end = response.rfind('}')?;
        let json_str = &response[start..=end];

        #[derive(Deserialize)]
        struct ParsedAction {
            action: String,
            #[serde(default)]
            argument: Option<String>,
            #[serde(default)]
            confidence: f32,
        }

        match serde_json::from_str::<ParsedAction>(json_str) {
            Ok(parsed) => {
                if parsed.action == "unknown" {
                    return None;
                }
                Some(ActionSuggestion {
                    action: parsed.action,
                    argument: parsed.argument.filter(|a| !a.is_empty() && a != "null"),
                    confidence: parsed.confidence,
                })
            }
            Err(e) => {
                warn!("❌ Failed to parse Groq action: {} - Raw: {}", e, json_str);
                None
            }
        }
    }
}
