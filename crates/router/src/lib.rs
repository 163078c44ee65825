//! Intent routing
//!
//! Decides which handler should process an inbound message:
//! - [`ConversationContextStore`]: bounded per-user history used to
//!   disambiguate follow-up messages
//! - [`RuleBasedScorer`]: deterministic, network-free keyword scoring - the
//!   graceful-degradation path
//! - [`OpenAiClassifier`]: OpenAI-compatible chat classifier with a typed
//!   response schema validated at the boundary
//! - [`IntentRouter`]: orchestrates classifier-first routing with rule
//!   fallback and unconditional history recording

pub mod classifier;
pub mod context;
pub mod router;
pub mod scorer;

pub use classifier::{OpenAiClassifier, OpenAiClassifierConfig};
pub use context::ConversationContextStore;
pub use router::IntentRouter;
pub use scorer::RuleBasedScorer;
