//! Classifier-first routing with rule fallback
//!
//! The router tries the external classifier when one is configured and falls
//! back to the keyword scorer on any classifier failure. It never errors:
//! every message resolves to exactly one handler, and the turn is recorded
//! in the context store regardless of which path decided.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use shopsaver_config::constants::routing;
use shopsaver_core::{
    ClassifierError, ClassifierRequest, ContextTurn, ConversationTurn, DecisionSource,
    IntentClassifier, RoutingDecision,
};

use crate::context::ConversationContextStore;
use crate::scorer::RuleBasedScorer;

/// Resolves inbound messages to handler labels
pub struct IntentRouter {
    context: Arc<ConversationContextStore>,
    classifier: Option<Arc<dyn IntentClassifier>>,
    scorer: RuleBasedScorer,
    context_window: usize,
    classify_timeout: Duration,
}

impl IntentRouter {
    pub fn new(
        context: Arc<ConversationContextStore>,
        classifier: Option<Arc<dyn IntentClassifier>>,
    ) -> Self {
        Self {
            context,
            classifier,
            scorer: RuleBasedScorer::new(),
            context_window: routing::CONTEXT_WINDOW_TURNS,
            classify_timeout: Duration::from_secs(routing::CLASSIFIER_TIMEOUT_SECS),
        }
    }

    /// Number of prior turns sent to the classifier
    pub fn with_context_window(mut self, context_window: usize) -> Self {
        self.context_window = context_window;
        self
    }

    /// Wall-clock bound on one classifier call, enforced here regardless of
    /// what the implementation does internally
    pub fn with_classify_timeout(mut self, classify_timeout: Duration) -> Self {
        self.classify_timeout = classify_timeout;
        self
    }

    /// Whether an external classifier is wired in.
    ///
    /// Callers use this to distinguish "degraded" fallback decisions from
    /// the rule scorer being the only configured path.
    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn context_store(&self) -> &Arc<ConversationContextStore> {
        &self.context
    }

    /// Route a message to a handler.
    ///
    /// Classifier first when configured; any classifier error degrades to
    /// the rule scorer. The resolved turn is appended to the user's history
    /// either way, so follow-up messages see it.
    pub async fn route(&self, user_id: &str, message: &str) -> RoutingDecision {
        let decision = match &self.classifier {
            Some(classifier) => {
                let context: Vec<ContextTurn> = self
                    .context
                    .recent(user_id, self.context_window)
                    .iter()
                    .map(ContextTurn::from)
                    .collect();
                let request = ClassifierRequest::new(message, context);

                // Bound the call here too; a stalling implementation must
                // not stall routing.
                let outcome = timeout(self.classify_timeout, classifier.classify(&request))
                    .await
                    .unwrap_or(Err(ClassifierError::Timeout));

                match outcome {
                    Ok(verdict) => {
                        tracing::info!(
                            handler = %verdict.handler,
                            confidence = verdict.confidence,
                            intent = %verdict.analysis.intent,
                            "Classifier decision"
                        );
                        RoutingDecision {
                            handler: verdict.handler,
                            confidence: verdict.confidence,
                            rationale: verdict.analysis.reasoning,
                            source: DecisionSource::Classifier,
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Classifier failed, using rule fallback");
                        self.scorer.decide(message)
                    }
                }
            }
            None => self.scorer.decide(message),
        };

        self.context
            .record(ConversationTurn::new(user_id, message, decision.handler));

        tracing::debug!(
            user_id,
            handler = %decision.handler,
            confidence = decision.confidence,
            source = ?decision.source,
            "Routed message"
        );
        decision
    }

    /// Whether a decision is too uncertain to act on without asking the
    /// user to rephrase.
    pub fn needs_clarification(decision: &RoutingDecision) -> bool {
        decision.confidence < routing::CLARIFICATION_THRESHOLD
    }
}
