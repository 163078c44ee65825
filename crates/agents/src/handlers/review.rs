//! Product review analysis

use std::sync::Arc;

use async_trait::async_trait;

use shopsaver_core::{ChatModel, Handler, HandlerError, HandlerLabel};

use crate::extractor::ParameterExtractor;

const REVIEW_SYSTEM_PROMPT: &str =
    "You are a product review analyst for a shopping assistant. Summarize what \
     buyers say about the product: three pros, three cons, and a one-line verdict \
     on who should buy it. Be concrete and concise; plain text only.";

/// Review handler. Composes an analysis through the chat model when one is
/// configured, otherwise gives static research guidance.
pub struct ProductReviewHandler {
    chat: Option<Arc<dyn ChatModel>>,
}

impl ProductReviewHandler {
    pub fn new(chat: Option<Arc<dyn ChatModel>>) -> Self {
        Self { chat }
    }

    fn offline_guidance(product_name: &str) -> String {
        format!(
            "I can't reach the review analysis service right now. For \"{product_name}\", \
             check the rating distribution (not just the average), read the most recent \
             one-star and five-star reviews, and search reviews for \"broke\" or \
             \"returned\" to spot recurring problems."
        )
    }
}

#[async_trait]
impl Handler for ProductReviewHandler {
    fn label(&self) -> HandlerLabel {
        HandlerLabel::ProductReview
    }

    async fn handle(&self, _user_id: &str, message: &str) -> Result<String, HandlerError> {
        let Some(product_name) = ParameterExtractor::product_name(message) else {
            return Ok("Which product would you like reviews for?".to_string());
        };

        match &self.chat {
            Some(chat) => {
                let user_prompt =
                    format!("Analyze buyer reviews for: {product_name}\nUser asked: {message}");
                match chat.complete(REVIEW_SYSTEM_PROMPT, &user_prompt).await {
                    Ok(analysis) => Ok(analysis),
                    Err(e) => {
                        tracing::warn!(error = %e, "Review analysis unavailable");
                        Ok(Self::offline_guidance(&product_name))
                    }
                }
            }
            None => Ok(Self::offline_guidance(&product_name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopsaver_core::ClassifierError;

    struct CannedChat(&'static str);

    #[async_trait]
    impl ChatModel for CannedChat {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, ClassifierError> {
            Ok(self.0.to_string())
        }
    }

    struct DownChat;

    #[async_trait]
    impl ChatModel for DownChat {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, ClassifierError> {
            Err(ClassifierError::Timeout)
        }
    }

    #[tokio::test]
    async fn test_uses_chat_model_analysis() {
        let handler = ProductReviewHandler::new(Some(Arc::new(CannedChat("Pros: ..."))));
        let reply = handler.handle("u1", "reviews for Sony WH-1000XM5").await.unwrap();
        assert_eq!(reply, "Pros: ...");
    }

    #[tokio::test]
    async fn test_chat_failure_degrades_to_guidance() {
        let handler = ProductReviewHandler::new(Some(Arc::new(DownChat)));
        let reply = handler.handle("u1", "reviews for Sony WH-1000XM5").await.unwrap();
        assert!(reply.contains("Sony WH-1000XM5"));
        assert!(reply.contains("rating distribution"));
    }

    #[tokio::test]
    async fn test_no_chat_model_configured() {
        let handler = ProductReviewHandler::new(None);
        let reply = handler.handle("u1", "is the Dyson V12 worth buying").await.unwrap();
        assert!(reply.contains("Dyson V12"));
    }

    #[tokio::test]
    async fn test_missing_product_asks() {
        let handler = ProductReviewHandler::new(None);
        let reply = handler.handle("u1", "is it any good?").await.unwrap();
        assert!(reply.contains("Which product"));
    }
}
