//! Neo4j Knowledge Graph Integration
//!
//! Wraps the Cypher-over-HTTP transactional endpoint so voice commands can
//! capture and recall atomic ideas ("remember ...", "recall ...").

use crate::config::Config;
use crate::error::{VoiceError, VoiceResult};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Handles Cypher queries against the Neo4j transactional HTTP API
#[derive(Clone)]
pub struct GraphClient {
    base_url: String,
    username: String,
    password: String,
    enabled: bool,
}

impl GraphClient {
    /// Create new graph client from config
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.neo4j_url.clone(),
            username: config.neo4j_username.clone(),
            password: config.neo4j_password.clone(),
            enabled: config.neo4j_enabled,
        }
    }

    /// Check if the knowledge graph is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Execute a single Cypher statement in an auto-committed transaction
    pub async fn execute_cypher(&self, statement: &str, parameters: Value) -> VoiceResult<Value> {
        let auth = STANDARD.encode(format!("{}:{}", self.username, self.password));

        let client = reqwest::Client::new();
        let response = client
            .post(format!("{}/commit", self.base_url))
            .header("Authorization", format!("Basic {}", auth))
            .json(&json!({
                "statements": [{
                    "statement": statement,
                    "parameters": parameters
                }]
            }))
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;

        if !status.is_success() {
            return Err(VoiceError::Graph(format!("HTTP {}: {}", status, body)));
        }

        // Neo4j reports Cypher failures in-band, not via HTTP status
        if let Some(errors) = body.get("errors").and_then(|e| e.as_array()) {
            if let Some(first) = errors.first() {
                let message = first
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("unknown Cypher error");
                return Err(VoiceError::Graph(message.to_string()));
            }
        }

        debug!("Cypher executed: {}", statement.lines().next().unwrap_or(""));
        Ok(body["results"][0]["data"].clone())
    }

    /// Capture one atomic idea from a voice utterance
    pub async fn create_idea(&self, content: &str, source: &str) -> VoiceResult<()> {
        if !self.enabled {
            return Ok(());
        }

        let statement = r#"
            CREATE (i:Idea {
                id: randomUUID(),
                content: $content,
                created: timestamp(),
                lastModified: timestamp(),
                wordCount: size(split($content, ' ')),
                source: $source,
                confidence: $confidence
            })
            RETURN i
        "#;

        self.execute_cypher(
            statement,
            json!({
                "content": content,
                "source": source,
                "confidence": 1.0
            }),
        )
        .await?;
        Ok(())
    }

    /// Find ideas whose content contains the given text, most recent first
    pub async fn find_ideas(&self, text: &str, limit: usize) -> VoiceResult<Vec<String>> {
        if !self.enabled {
            return Ok(Vec::new());
        }

        let statement = r#"
            MATCH (i:Idea)
            WHERE toLower(i.content) CONTAINS toLower($text)
            RETURN i.content AS content
            ORDER BY i.created DESC
            LIMIT $limit
        "#;

        let data = self
            .execute_cypher(statement, json!({ "text": text, "limit": limit as i64 }))
            .await?;

        let mut ideas = Vec::new();
        if let Some(rows) = data.as_array() {
            for row in rows {
                if let Some(content) = row["row"][0].as_str() {
                    ideas.push(content.to_string());
                } else {
                    warn!("Unexpected Neo4j row shape: {}", row);
                }
            }
        }
        Ok(ideas)
    }
}
