//! Capability handlers
//!
//! One handler per [`HandlerLabel`](shopsaver_core::HandlerLabel) variant.
//! Each consumes a routed message and produces user-facing text; everything
//! they need arrives through constructor-injected collaborators.

mod finance;
mod help;
mod mail;
mod price_tracker;
mod recommendation;
mod review;

pub use finance::FinanceHandler;
pub use help::HelpHandler;
pub use mail::MailHandler;
pub use price_tracker::PriceTrackerHandler;
pub use recommendation::RecommendationHandler;
pub use review::ProductReviewHandler;
