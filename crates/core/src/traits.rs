//! Capability traits at the seams between crates
//!
//! Handlers, search sources, the classifier, and storage are all consumed
//! through object-safe async traits so the router and dispatcher can be
//! tested with mocks and wired with concrete adapters at startup.

use async_trait::async_trait;

use crate::error::{ClassifierError, HandlerError, SearchError, StoreError};
use crate::label::HandlerLabel;
use crate::types::{
    ClassifierRequest, ClassifierVerdict, FinanceSummary, PeriodSelector, SearchCandidate,
    TrackingEntry,
};

/// Inbound messages longer than this are rejected by the default
/// [`Handler::validate`]
pub const MAX_MESSAGE_CHARS: usize = 1000;

/// A unit of domain logic that consumes a routed message and produces a
/// user-facing response.
///
/// Handlers are independent variants behind this one invocation contract;
/// there is no inheritance hierarchy. Registration happens once at startup.
#[async_trait]
pub trait Handler: Send + Sync {
    /// The label this handler is registered under
    fn label(&self) -> HandlerLabel;

    /// Validate an inbound message before handling.
    ///
    /// The default rejects empty and oversized messages.
    fn validate(&self, message: &str) -> bool {
        let trimmed = message.trim();
        !trimmed.is_empty() && trimmed.chars().count() <= MAX_MESSAGE_CHARS
    }

    /// Produce a response for the message
    async fn handle(&self, user_id: &str, message: &str) -> Result<String, HandlerError>;
}

/// The external language-model classifier.
///
/// Implementations must bound their own latency; the router treats any error
/// as fully recoverable and falls back to the rule scorer.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(
        &self,
        request: &ClassifierRequest,
    ) -> Result<ClassifierVerdict, ClassifierError>;
}

/// A plain chat completion surface for handlers that compose prose answers
/// (review analysis, recommendations). Shares the classifier's transport.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ClassifierError>;
}

/// One external marketplace queried for product listings
#[async_trait]
pub trait SearchSource: Send + Sync {
    /// Marketplace name shown to users and recorded on failure
    fn platform(&self) -> &str;

    /// Fetch up to `limit` raw candidates for a keyword
    async fn search(&self, keyword: &str, limit: usize)
        -> Result<Vec<SearchCandidate>, SearchError>;
}

/// Storage interface consumed as an opaque collaborator.
///
/// Persistence format is the implementor's concern; the core only depends on
/// these operation shapes.
#[async_trait]
pub trait ShoppingStore: Send + Sync {
    async fn finance_summary(
        &self,
        user_id: &str,
        period: PeriodSelector,
    ) -> Result<Option<FinanceSummary>, StoreError>;

    async fn record_expense(
        &self,
        user_id: &str,
        amount: f64,
        category: &str,
        note: &str,
    ) -> Result<(), StoreError>;

    async fn set_budget(&self, user_id: &str, amount: f64) -> Result<(), StoreError>;

    async fn upsert_tracking_entry(&self, entry: TrackingEntry) -> Result<(), StoreError>;

    async fn active_tracking_entries(
        &self,
        user_id: &str,
    ) -> Result<Vec<TrackingEntry>, StoreError>;

    /// Deactivate entries whose product name contains `product_match`
    /// (case-insensitive). Returns the number of entries deactivated.
    async fn deactivate_tracking(
        &self,
        user_id: &str,
        product_match: &str,
    ) -> Result<usize, StoreError>;
}
