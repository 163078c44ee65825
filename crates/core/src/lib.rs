//! Core traits and types for the shopping assistant
//!
//! This crate provides foundational types used across all other crates:
//! - The closed handler enumeration and routing decision types
//! - Conversation turn and extraction result types
//! - Search candidate and aggregation result types
//! - Capability traits for handlers, classifiers, search sources, and storage
//! - Error types

pub mod error;
pub mod label;
pub mod store;
pub mod traits;
pub mod types;

pub use error::{ClassifierError, HandlerError, SearchError, StoreError};
pub use label::HandlerLabel;
pub use store::InMemoryStore;
pub use traits::{
    ChatModel, Handler, IntentClassifier, SearchSource, ShoppingStore, MAX_MESSAGE_CHARS,
};
pub use types::{
    AggregatedSearchResult, ClassifierAnalysis, ClassifierRequest, ClassifierVerdict,
    ContextTurn, ConversationTurn, DecisionSource, ExtractionResult, FinanceSummary,
    PeriodSelector, RoutingDecision, SearchCandidate, TrackingEntry,
};
