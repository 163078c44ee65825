//! General-purpose product recommendation (the default handler)

use std::sync::Arc;

use async_trait::async_trait;

use shopsaver_core::{ChatModel, Handler, HandlerError, HandlerLabel};

const RECOMMENDATION_SYSTEM_PROMPT: &str =
    "You are a shopping advisor. Recommend 2-3 concrete products for the user's \
     need, each with a one-line reason and a rough price range. If the need is \
     unclear, ask one short clarifying question instead. Plain text only.";

/// Catch-all recommendation handler; also the default routing target when
/// nothing else matches.
pub struct RecommendationHandler {
    chat: Option<Arc<dyn ChatModel>>,
}

impl RecommendationHandler {
    pub fn new(chat: Option<Arc<dyn ChatModel>>) -> Self {
        Self { chat }
    }

    fn offline_guidance() -> String {
        "I can help you find products, compare prices, and track deals. Tell me what \
         you're shopping for and your budget, for example: \"recommend wireless \
         earbuds under 3000\"."
            .to_string()
    }
}

#[async_trait]
impl Handler for RecommendationHandler {
    fn label(&self) -> HandlerLabel {
        HandlerLabel::Recommendation
    }

    async fn handle(&self, _user_id: &str, message: &str) -> Result<String, HandlerError> {
        match &self.chat {
            Some(chat) => match chat.complete(RECOMMENDATION_SYSTEM_PROMPT, message).await {
                Ok(advice) => Ok(advice),
                Err(e) => {
                    tracing::warn!(error = %e, "Recommendation model unavailable");
                    Ok(Self::offline_guidance())
                }
            },
            None => Ok(Self::offline_guidance()),
        }
    }
}
