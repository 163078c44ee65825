//! Shared data types: conversation turns, routing decisions, extraction
//! results, search candidates, and storage rows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::label::HandlerLabel;

/// A single recorded turn in a user's conversation history.
///
/// Immutable once recorded; owned exclusively by the context store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// User the turn belongs to
    pub user_id: String,
    /// The inbound message text
    pub message: String,
    /// Handler the message was resolved to
    pub handler: HandlerLabel,
    /// When the turn was recorded
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(
        user_id: impl Into<String>,
        message: impl Into<String>,
        handler: HandlerLabel,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            message: message.into(),
            handler,
            timestamp: Utc::now(),
        }
    }
}

/// Which path produced a routing decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// The external language-model classifier
    Classifier,
    /// The deterministic rule-based fallback
    RuleFallback,
}

/// The output of classification: which handler should process a message
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    /// Winning handler label
    pub handler: HandlerLabel,
    /// Confidence in [0, 1]
    pub confidence: f32,
    /// Free-text rationale (classifier reasoning or matched rule)
    pub rationale: String,
    /// Which path produced the decision
    pub source: DecisionSource,
}

/// Structured parameters extracted from free text.
///
/// Both fields are independently optional; absence is ordinary control flow,
/// not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionResult {
    /// Product name span, trimmed, if one survived keyword stripping
    pub product_name: Option<String>,
    /// Target price, if a plausible number was found
    pub target_price: Option<f64>,
}

/// One product listing from one search source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCandidate {
    /// Source marketplace name
    pub platform: String,
    /// Listing name
    pub name: String,
    /// Listing price, non-negative, currency-agnostic
    pub price: f64,
    /// Listing URL
    pub url: String,
    /// Thumbnail URL, if the source provides one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Merged, filtered, and price-sorted candidates across all reachable sources
#[derive(Debug, Clone, Default)]
pub struct AggregatedSearchResult {
    /// Deduplicated candidates, price ascending
    pub candidates: Vec<SearchCandidate>,
    /// Platform names of sources that errored or timed out
    pub failed_sources: Vec<String>,
    /// Number of sources queried
    pub total_sources: usize,
}

impl AggregatedSearchResult {
    /// Cheapest surviving candidate, if any
    pub fn cheapest(&self) -> Option<&SearchCandidate> {
        self.candidates.first()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Spending period selector for finance summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodSelector {
    ThisMonth,
    LastMonth,
}

impl PeriodSelector {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodSelector::ThisMonth => "this month",
            PeriodSelector::LastMonth => "last month",
        }
    }
}

/// Finance summary returned by the storage interface
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinanceSummary {
    /// Total spending in the selected period
    pub total_spending: f64,
    /// Configured budget, 0 when unset
    pub budget: f64,
    /// Per-category spending, highest first is the caller's concern
    pub categories: Vec<(String, f64)>,
}

/// A price-tracking row as stored by the storage collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingEntry {
    pub user_id: String,
    /// Name the user asked to track
    pub product_name: String,
    /// Full listing name the search matched
    pub matched_product: String,
    /// Price the user wants to be notified at
    pub target_price: f64,
    /// Lowest price observed at the last check
    pub observed_price: f64,
    /// Platform the observed price came from
    pub platform: String,
    /// Listing URL for the observed price
    pub url: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrackingEntry {
    pub fn new(
        user_id: impl Into<String>,
        product_name: impl Into<String>,
        target_price: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            product_name: product_name.into(),
            matched_product: String::new(),
            target_price,
            observed_price: 0.0,
            platform: String::new(),
            url: String::new(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the last observed price already meets the target
    pub fn target_met(&self) -> bool {
        self.observed_price > 0.0 && self.observed_price <= self.target_price
    }
}

// =============================================================================
// Classifier request/response contract
// =============================================================================

/// A prior turn sent to the classifier for context
#[derive(Debug, Clone, Serialize)]
pub struct ContextTurn {
    pub message: String,
    pub handler: HandlerLabel,
}

impl From<&ConversationTurn> for ContextTurn {
    fn from(turn: &ConversationTurn) -> Self {
        Self {
            message: turn.message.clone(),
            handler: turn.handler,
        }
    }
}

/// Request sent to the external classifier
#[derive(Debug, Clone, Serialize)]
pub struct ClassifierRequest {
    /// Candidate handler labels with capability descriptions
    pub handlers: Vec<(HandlerLabel, &'static str)>,
    /// Up to three prior turns, oldest first
    pub context: Vec<ContextTurn>,
    /// The current message
    pub message: String,
}

impl ClassifierRequest {
    pub fn new(message: impl Into<String>, context: Vec<ContextTurn>) -> Self {
        Self {
            handlers: HandlerLabel::ALL
                .iter()
                .map(|l| (*l, l.description()))
                .collect(),
            context,
            message: message.into(),
        }
    }
}

/// Structured analysis the classifier returns alongside its pick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierAnalysis {
    #[serde(default)]
    pub intent: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
}

/// Validated classifier response.
///
/// Construction goes through [`ClassifierVerdict::from_parts`] so that schema
/// violations (unknown label, confidence outside [0, 1]) surface as `None`
/// and are handled as classifier failures, never as crashes.
#[derive(Debug, Clone)]
pub struct ClassifierVerdict {
    pub handler: HandlerLabel,
    pub confidence: f32,
    pub analysis: ClassifierAnalysis,
}

impl ClassifierVerdict {
    pub fn from_parts(
        handler: &str,
        confidence: f32,
        analysis: ClassifierAnalysis,
    ) -> Option<Self> {
        let handler = HandlerLabel::parse_label(handler)?;
        if !(0.0..=1.0).contains(&confidence) {
            return None;
        }
        Some(Self {
            handler,
            confidence,
            analysis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_rejects_unknown_label() {
        assert!(ClassifierVerdict::from_parts("weather", 0.8, Default::default()).is_none());
    }

    #[test]
    fn test_verdict_rejects_out_of_range_confidence() {
        assert!(ClassifierVerdict::from_parts("finance", 1.2, Default::default()).is_none());
        assert!(ClassifierVerdict::from_parts("finance", -0.1, Default::default()).is_none());
        assert!(ClassifierVerdict::from_parts("finance", 1.0, Default::default()).is_some());
    }

    #[test]
    fn test_target_met() {
        let mut entry = TrackingEntry::new("u1", "console", 15000.0);
        assert!(!entry.target_met());
        entry.observed_price = 14500.0;
        assert!(entry.target_met());
        entry.observed_price = 15500.0;
        assert!(!entry.target_met());
    }

    #[test]
    fn test_classifier_request_carries_all_handlers() {
        let req = ClassifierRequest::new("hello", vec![]);
        assert_eq!(req.handlers.len(), HandlerLabel::ALL.len());
    }
}
