//! The assistant facade
//!
//! One entry point per inbound message: normalize, route, dispatch, and
//! decorate the reply. Concurrency is bounded by a semaphore so a traffic
//! spike queues instead of exhausting the process.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::Semaphore;

use shopsaver_config::constants::assistant;
use shopsaver_config::Settings;
use shopsaver_core::{
    ChatModel, ClassifierError, DecisionSource, IntentClassifier, SearchError, SearchSource,
    ShoppingStore,
};
use shopsaver_router::{ConversationContextStore, IntentRouter, OpenAiClassifier};
use shopsaver_search::{MomoSource, PchomeSource, PriceSearchAggregator, ShopeeSource};

use crate::handlers::{
    FinanceHandler, HelpHandler, MailHandler, PriceTrackerHandler, ProductReviewHandler,
    RecommendationHandler,
};
use crate::registry::{Dispatcher, HandlerRegistry};

/// Startup wiring failures; everything after startup degrades instead of
/// erroring
#[derive(thiserror::Error, Debug)]
pub enum BootstrapError {
    #[error("classifier setup failed: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("search setup failed: {0}")]
    Search(#[from] SearchError),
}

/// Shorthand spellings normalized before routing so the keyword tables and
/// the classifier both see canonical words.
static COLLOQUIALISMS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)\bwanna\b", "want to"),
        (r"(?i)\bgonna\b", "going to"),
        (r"(?i)\bgimme\b", "give me"),
        (r"(?i)\blemme\b", "let me"),
        (r"(?i)\bpls\b", "please"),
        (r"(?i)\bplz\b", "please"),
        (r"(?i)\bthx\b", "thanks"),
        (r"(?i)\bur\b", "your"),
        (r"(?i)\bu\b", "you"),
    ]
    .iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("colloquialism pattern must compile"),
            *replacement,
        )
    })
    .collect()
});

const CLARIFICATION_NOTE: &str =
    "\n\nIf that wasn't what you meant, add a word like \"price\", \"budget\", or \
     \"review\" and I'll route it better.";

const DEGRADED_NOTE: &str =
    "\n\n(Smart analysis is temporarily offline; I matched your message by keywords.)";

/// Top-level message processor
pub struct Assistant {
    router: IntentRouter,
    dispatcher: Dispatcher,
    limiter: Semaphore,
    max_response_chars: usize,
    idle_eviction: std::time::Duration,
}

impl Assistant {
    pub fn new(router: IntentRouter, dispatcher: Dispatcher) -> Self {
        Self::with_max_concurrent(router, dispatcher, assistant::DEFAULT_MAX_CONCURRENT)
    }

    pub fn with_max_concurrent(
        router: IntentRouter,
        dispatcher: Dispatcher,
        max_concurrent: usize,
    ) -> Self {
        Self {
            router,
            dispatcher,
            limiter: Semaphore::new(max_concurrent.max(1)),
            max_response_chars: assistant::MAX_RESPONSE_CHARS,
            idle_eviction: std::time::Duration::from_secs(
                shopsaver_config::constants::history::IDLE_EVICTION_SECS,
            ),
        }
    }

    /// Wire the full stack from settings: live search sources, the
    /// classifier when configured, and the complete handler set.
    pub fn from_settings(
        settings: &Settings,
        store: Arc<dyn ShoppingStore>,
    ) -> Result<Self, BootstrapError> {
        let (classifier, chat): (Option<Arc<dyn IntentClassifier>>, Option<Arc<dyn ChatModel>>) =
            if settings.classifier.is_configured() {
                let client = Arc::new(OpenAiClassifier::new((&settings.classifier).into())?);
                (Some(client.clone()), Some(client))
            } else {
                tracing::info!("No classifier configured; routing by keyword rules only");
                (None, None)
            };

        let sources: Vec<Arc<dyn SearchSource>> = vec![
            Arc::new(PchomeSource::new()?),
            Arc::new(MomoSource),
            Arc::new(ShopeeSource),
        ];
        let aggregator = Arc::new(
            PriceSearchAggregator::new(sources)
                .with_timeout(std::time::Duration::from_secs(settings.search.timeout_secs))
                .with_limit(settings.search.per_source_limit),
        );

        let registry = HandlerRegistry::new()
            .register(Arc::new(FinanceHandler::new(store.clone())))
            .register(Arc::new(PriceTrackerHandler::new(store, aggregator)))
            .register(Arc::new(ProductReviewHandler::new(chat.clone())))
            .register(Arc::new(RecommendationHandler::new(chat)))
            .register(Arc::new(MailHandler::new()))
            .register(Arc::new(HelpHandler::new()));

        let context = Arc::new(ConversationContextStore::with_capacity(
            settings.context.max_turns,
        ));
        let router = IntentRouter::new(context, classifier)
            .with_context_window(settings.context.context_window)
            .with_classify_timeout(std::time::Duration::from_secs(
                settings.classifier.timeout_secs,
            ));

        let mut assistant = Self::with_max_concurrent(
            router,
            Dispatcher::new(registry),
            settings.assistant.max_concurrent,
        );
        assistant.max_response_chars = settings.assistant.max_response_chars;
        assistant.idle_eviction =
            std::time::Duration::from_secs(settings.context.idle_eviction_secs);
        Ok(assistant)
    }

    /// Drop histories of users idle longer than the configured eviction age.
    ///
    /// Call this from a periodic maintenance task; message processing never
    /// triggers it implicitly. Returns how many users were evicted.
    pub fn evict_idle_users(&self) -> usize {
        self.router.context_store().evict_idle(self.idle_eviction)
    }

    /// Process one inbound message end to end. Never fails: every outcome,
    /// including internal errors, is user-facing text.
    pub async fn process(&self, user_id: &str, message: &str) -> String {
        let _permit = match self.limiter.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                tracing::error!("Concurrency limiter closed");
                return "I'm a bit overloaded right now, please try again shortly.".to_string();
            }
        };

        let message = normalize_colloquialisms(message);
        let decision = self.router.route(user_id, &message).await;
        let mut response = self
            .dispatcher
            .dispatch(decision.handler, user_id, &message)
            .await;

        if IntentRouter::needs_clarification(&decision) {
            response.push_str(CLARIFICATION_NOTE);
        }
        if self.router.has_classifier() && decision.source == DecisionSource::RuleFallback {
            response.push_str(DEGRADED_NOTE);
        }

        truncate_response(response, self.max_response_chars)
    }
}

/// Replace shorthand spellings with canonical words
fn normalize_colloquialisms(message: &str) -> String {
    let mut text = message.to_string();
    for (pattern, replacement) in COLLOQUIALISMS.iter() {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }
    text
}

/// Cap a response at `max_chars` characters, marking the cut
fn truncate_response(response: String, max_chars: usize) -> String {
    if response.chars().count() <= max_chars {
        return response;
    }
    let mut truncated: String = response.chars().take(max_chars).collect();
    truncated.push_str("\n... (message truncated)");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use shopsaver_core::{
        ClassifierError, ClassifierRequest, ClassifierVerdict, Handler, HandlerError,
        HandlerLabel, InMemoryStore, IntentClassifier, SearchCandidate, SearchError,
        SearchSource,
    };
    use shopsaver_router::ConversationContextStore;
    use shopsaver_search::PriceSearchAggregator;

    use crate::handlers::{
        FinanceHandler, HelpHandler, MailHandler, PriceTrackerHandler, ProductReviewHandler,
        RecommendationHandler,
    };
    use crate::registry::HandlerRegistry;

    struct StaticSource(Vec<SearchCandidate>);

    #[async_trait]
    impl SearchSource for StaticSource {
        fn platform(&self) -> &str {
            "Test"
        }

        async fn search(
            &self,
            _keyword: &str,
            _limit: usize,
        ) -> Result<Vec<SearchCandidate>, SearchError> {
            Ok(self.0.clone())
        }
    }

    struct FailingClassifier;

    #[async_trait]
    impl IntentClassifier for FailingClassifier {
        async fn classify(
            &self,
            _request: &ClassifierRequest,
        ) -> Result<ClassifierVerdict, ClassifierError> {
            Err(ClassifierError::Timeout)
        }
    }

    fn build_assistant(classifier: Option<Arc<dyn IntentClassifier>>) -> Assistant {
        let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
        let aggregator = Arc::new(PriceSearchAggregator::new(vec![Arc::new(StaticSource(
            vec![SearchCandidate {
                platform: "Test".to_string(),
                name: "iPhone 15 Pro 256GB".to_string(),
                price: 36900.0,
                url: "https://test/1".to_string(),
                image_url: None,
            }],
        ))]));

        let registry = HandlerRegistry::new()
            .register(Arc::new(FinanceHandler::new(store.clone())))
            .register(Arc::new(PriceTrackerHandler::new(store, aggregator)))
            .register(Arc::new(ProductReviewHandler::new(None)))
            .register(Arc::new(RecommendationHandler::new(None)))
            .register(Arc::new(MailHandler::new()))
            .register(Arc::new(HelpHandler::new()));

        let router = IntentRouter::new(Arc::new(ConversationContextStore::new()), classifier);
        Assistant::new(router, Dispatcher::new(registry))
    }

    #[tokio::test]
    async fn test_finance_flow_end_to_end() {
        let assistant = build_assistant(None);
        assistant.process("u1", "record 150 lunch").await;
        let reply = assistant.process("u1", "how much did I spend this month").await;
        assert!(reply.contains("$150"));
    }

    #[tokio::test]
    async fn test_tracking_flow_end_to_end() {
        let assistant = build_assistant(None);
        let reply = assistant
            .process("u1", "track iPhone 15 Pro target price 35000")
            .await;
        assert!(reply.contains("$36900"));
        assert!(reply.contains("$35000 target"));
    }

    #[tokio::test]
    async fn test_low_confidence_appends_clarification() {
        let assistant = build_assistant(None);
        // No keyword matches: default handler at low confidence
        let reply = assistant.process("u1", "blorp").await;
        assert!(reply.contains("route it better"));
    }

    #[tokio::test]
    async fn test_confident_reply_has_no_clarification() {
        let assistant = build_assistant(None);
        let reply = assistant.process("u1", "record 150 lunch").await;
        assert!(!reply.contains("route it better"));
    }

    #[tokio::test]
    async fn test_degraded_note_only_when_classifier_fell_back() {
        // Classifier configured but failing: degraded note present
        let with = build_assistant(Some(Arc::new(FailingClassifier)));
        let reply = with.process("u1", "record 150 lunch").await;
        assert!(reply.contains("temporarily offline"));

        // No classifier configured: rules are the normal path, no note
        let without = build_assistant(None);
        let reply = without.process("u1", "record 150 lunch").await;
        assert!(!reply.contains("temporarily offline"));
    }

    #[tokio::test]
    async fn test_history_recorded_through_facade() {
        let assistant = build_assistant(None);
        assistant.process("u1", "record 150 lunch").await;
        assistant.process("u1", "help").await;
        assert_eq!(assistant.router.context_store().turn_count("u1"), 2);
    }

    #[tokio::test]
    async fn test_from_settings_wires_idle_eviction() {
        let mut settings = Settings::default();
        settings.context.idle_eviction_secs = 0;
        let store: Arc<dyn shopsaver_core::ShoppingStore> = Arc::new(InMemoryStore::new());
        let assistant = Assistant::from_settings(&settings, store).unwrap();

        assistant.process("u1", "record 150 lunch").await;
        assert_eq!(assistant.router.context_store().user_count(), 1);
        // Zero eviction age drops every idle user immediately
        assert_eq!(assistant.evict_idle_users(), 1);
        assert_eq!(assistant.router.context_store().user_count(), 0);
    }

    #[tokio::test]
    async fn test_from_settings_wires_history_cap() {
        let mut settings = Settings::default();
        settings.context.max_turns = 2;
        settings.context.context_window = 1;
        let store: Arc<dyn shopsaver_core::ShoppingStore> = Arc::new(InMemoryStore::new());
        let assistant = Assistant::from_settings(&settings, store).unwrap();

        for i in 0..4 {
            assistant.process("u1", &format!("record {} lunch", 100 + i)).await;
        }
        assert_eq!(assistant.router.context_store().turn_count("u1"), 2);
    }

    #[tokio::test]
    async fn test_default_eviction_age_keeps_active_users() {
        let assistant = build_assistant(None);
        assistant.process("u1", "record 150 lunch").await;
        assert_eq!(assistant.evict_idle_users(), 0);
    }

    #[test]
    fn test_colloquialism_normalization() {
        assert_eq!(
            normalize_colloquialisms("pls track it, I wanna know the price"),
            "please track it, I want to know the price"
        );
        assert_eq!(normalize_colloquialisms("thx u"), "thanks you");
    }

    #[test]
    fn test_truncation_marks_the_cut() {
        let long = "x".repeat(6000);
        let out = truncate_response(long, 100);
        assert!(out.starts_with(&"x".repeat(100)));
        assert!(out.ends_with("(message truncated)"));

        let short = "fine".to_string();
        assert_eq!(truncate_response(short.clone(), 100), short);
    }

    #[tokio::test]
    async fn test_broken_handler_does_not_break_the_loop() {
        struct PanickyFinance;

        #[async_trait]
        impl Handler for PanickyFinance {
            fn label(&self) -> HandlerLabel {
                HandlerLabel::Finance
            }

            async fn handle(&self, _u: &str, _m: &str) -> Result<String, HandlerError> {
                Err(HandlerError::Internal("boom".to_string()))
            }
        }

        let registry = HandlerRegistry::new()
            .register(Arc::new(PanickyFinance))
            .register(Arc::new(HelpHandler::new()));
        let router = IntentRouter::new(Arc::new(ConversationContextStore::new()), None);
        let assistant = Assistant::new(router, Dispatcher::new(registry));

        let reply = assistant.process("u1", "record 150 lunch").await;
        assert!(reply.contains("temporarily unavailable"));
        // The next message still gets a normal reply
        let reply = assistant.process("u1", "help").await;
        assert!(reply.contains("Here's what I can do"));
    }
}
