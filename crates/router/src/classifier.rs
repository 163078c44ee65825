//! External classifier client
//!
//! Talks to an OpenAI-compatible `/chat/completions` endpoint and parses the
//! structured verdict the prompt asks for. The response schema is validated
//! at this boundary: an unknown handler label, a confidence outside [0, 1],
//! or malformed JSON are all classifier failures the router recovers from,
//! never crashes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use shopsaver_config::ClassifierSettings;
use shopsaver_core::{
    ChatModel, ClassifierAnalysis, ClassifierError, ClassifierRequest, ClassifierVerdict,
    IntentClassifier,
};

/// Configuration for the OpenAI-compatible classifier
#[derive(Debug, Clone)]
pub struct OpenAiClassifierConfig {
    /// API base, e.g. `https://api.openai.com/v1`
    pub endpoint: String,
    /// Bearer API key
    pub api_key: String,
    /// Model name
    pub model: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl From<&ClassifierSettings> for OpenAiClassifierConfig {
    fn from(settings: &ClassifierSettings) -> Self {
        Self {
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

/// OpenAI-compatible chat classifier
pub struct OpenAiClassifier {
    config: OpenAiClassifierConfig,
    client: Client,
}

impl OpenAiClassifier {
    pub fn new(config: OpenAiClassifierConfig) -> Result<Self, ClassifierError> {
        if config.api_key.is_empty() {
            return Err(ClassifierError::Configuration(
                "API key required for the classifier endpoint".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn chat_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        )
    }

    /// Build the analysis prompt: handler capabilities, recent turns, and
    /// the current message, asking for a JSON-only reply.
    fn build_prompt(request: &ClassifierRequest) -> String {
        let mut handlers = String::new();
        for (label, description) in &request.handlers {
            handlers.push_str(&format!("- {label}: {description}\n"));
        }

        let context = if request.context.is_empty() {
            "(new conversation)".to_string()
        } else {
            let mut out = String::new();
            for turn in &request.context {
                out.push_str(&format!(
                    "user: {}\nhandled by: {}\n",
                    turn.message, turn.handler
                ));
            }
            out
        };

        format!(
            "You are the intent analyzer of a shopping assistant. Decide which \
             handler should process the user's message.\n\n\
             Available handlers:\n{handlers}\n\
             Conversation history:\n{context}\n\
             Current message: \"{message}\"\n\n\
             Rules:\n\
             1. Understand the real need, not just surface keywords.\n\
             2. Use the conversation history to resolve follow-up messages.\n\
             3. When unsure, prefer the recommendation handler.\n\n\
             Reply with JSON only:\n\
             {{\n\
               \"handler\": \"<handler label>\",\n\
               \"confidence\": <0.0-1.0>,\n\
               \"analysis\": {{\n\
                 \"intent\": \"<the user's actual intent>\",\n\
                 \"keywords\": [\"<recognized concepts>\"],\n\
                 \"reasoning\": \"<why this handler>\"\n\
               }}\n\
             }}",
            message = request.message,
        )
    }

    async fn chat(&self, messages: Vec<ApiMessage>, json_mode: bool) -> Result<String, ClassifierError> {
        let request = ApiChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: 0.3,
            max_tokens: 500,
            response_format: json_mode.then(|| ResponseFormat {
                format_type: "json_object",
            }),
        };

        let response = self
            .client
            .post(self.chat_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifierError::Timeout
                } else {
                    ClassifierError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Api(format!("HTTP {status}: {error_text}")));
        }

        let response: ApiChatResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ClassifierError::InvalidResponse("no choices in response".to_string()))
    }
}

#[async_trait]
impl IntentClassifier for OpenAiClassifier {
    async fn classify(
        &self,
        request: &ClassifierRequest,
    ) -> Result<ClassifierVerdict, ClassifierError> {
        let messages = vec![
            ApiMessage {
                role: "system",
                content: "You are a precise intent analyzer. Understand what the \
                          user actually needs; do not be fooled by surface wording."
                    .to_string(),
            },
            ApiMessage {
                role: "user",
                content: Self::build_prompt(request),
            },
        ];

        let content = self.chat(messages, true).await?;
        let raw: RawVerdict = serde_json::from_str(&content)
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;

        let confidence = raw.confidence.ok_or_else(|| {
            ClassifierError::InvalidResponse("missing confidence field".to_string())
        })?;

        ClassifierVerdict::from_parts(&raw.handler, confidence, raw.analysis).ok_or_else(|| {
            ClassifierError::InvalidResponse(format!(
                "verdict failed schema validation: handler={} confidence={confidence}",
                raw.handler
            ))
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiClassifier {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ClassifierError> {
        let messages = vec![
            ApiMessage {
                role: "system",
                content: system.to_string(),
            },
            ApiMessage {
                role: "user",
                content: user.to_string(),
            },
        ];
        let content = self.chat(messages, false).await?;
        Ok(content.trim().to_string())
    }
}

// =============================================================================
// API wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct ApiChatRequest {
    model: String,
    messages: Vec<ApiMessage>,
    temperature: f32,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ApiChatResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    content: String,
}

/// The model's JSON reply before schema validation
#[derive(Debug, Deserialize)]
struct RawVerdict {
    #[serde(default)]
    handler: String,
    confidence: Option<f32>,
    #[serde(default)]
    analysis: ClassifierAnalysis,
}
