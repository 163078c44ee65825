//! Multi-source price search
//!
//! Fans a keyword out to every registered [`SearchSource`](shopsaver_core::SearchSource)
//! concurrently, bounds each source with its own timeout, and merges whatever
//! came back into one filtered, deduplicated, price-sorted result. A slow or
//! broken marketplace degrades coverage, never availability.

pub mod aggregator;
pub mod sources;

pub use aggregator::PriceSearchAggregator;
pub use sources::{MomoSource, PchomeSource, ShopeeSource};
