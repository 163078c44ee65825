//! Centralized constants
//!
//! Single source of truth for the tuned numeric values of the routing and
//! extraction engine. These are contract values asserted by tests, not
//! incidental defaults.

/// Routing and classification
pub mod routing {
    /// Confidence assigned when no rule matches and the default handler is
    /// used
    pub const DEFAULT_HANDLER_CONFIDENCE: f32 = 0.3;

    /// Upper bound on rule-fallback confidence
    pub const RULE_CONFIDENCE_CAP: f32 = 0.9;

    /// Below this confidence the response gets a clarifying remark appended
    pub const CLARIFICATION_THRESHOLD: f32 = 0.5;

    /// Number of prior turns sent to the external classifier
    pub const CONTEXT_WINDOW_TURNS: usize = 3;

    /// Wall-clock bound on one classifier call (seconds)
    pub const CLASSIFIER_TIMEOUT_SECS: u64 = 10;
}

/// Conversation history
pub mod history {
    /// Per-user history cap; oldest turns are evicted first
    pub const MAX_TURNS_PER_USER: usize = 10;

    /// Users idle longer than this may be evicted entirely (seconds)
    pub const IDLE_EVICTION_SECS: u64 = 24 * 60 * 60;
}

/// Parameter extraction
pub mod extraction {
    /// Extracted numbers below this are discarded as noise, not prices
    pub const MIN_PLAUSIBLE_PRICE: f64 = 100.0;

    /// A candidate product name must be longer than this many characters
    pub const MIN_PRODUCT_NAME_CHARS: usize = 2;
}

/// Multi-source price search
pub mod search {
    /// Wall-clock bound on one search source call (seconds)
    pub const SOURCE_TIMEOUT_SECS: u64 = 10;

    /// Default per-source result limit
    pub const DEFAULT_PER_SOURCE_LIMIT: usize = 10;
}

/// Assistant surface limits. The inbound message cap lives with the
/// `Handler` trait in the core crate, next to the validation that uses it.
pub mod assistant {
    /// Responses longer than this are truncated with a notice
    pub const MAX_RESPONSE_CHARS: usize = 4900;

    /// Default bound on concurrently processed messages
    pub const DEFAULT_MAX_CONCURRENT: usize = 32;
}

/// Service endpoints (defaults)
pub mod endpoints {
    /// OpenAI-compatible chat completions API base
    pub const OPENAI_DEFAULT: &str = "https://api.openai.com/v1";

    /// PChome 24h product search API
    pub const PCHOME_SEARCH: &str =
        "https://ecshweb.pchome.com.tw/search/v3.3/all/results";

    /// PChome 24h product page template, completed with the listing id
    pub const PCHOME_PRODUCT_BASE: &str = "https://24h.pchome.com.tw/prod/";
}
