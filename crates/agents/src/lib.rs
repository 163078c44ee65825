//! Capability handlers and the assistant facade
//!
//! The top of the stack: structured parameter extraction, the handler
//! registry and dispatch boundary, one handler per capability, and the
//! [`Assistant`] facade that processes a message end to end.

pub mod assistant;
pub mod extractor;
pub mod handlers;
pub mod registry;

pub use assistant::{Assistant, BootstrapError};
pub use extractor::ParameterExtractor;
pub use handlers::{
    FinanceHandler, HelpHandler, MailHandler, PriceTrackerHandler, ProductReviewHandler,
    RecommendationHandler,
};
pub use registry::{Dispatcher, HandlerRegistry};
