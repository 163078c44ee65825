//! The closed handler enumeration
//!
//! Every routing decision resolves to exactly one of these labels. The
//! variant order doubles as the registration order used for deterministic
//! tie-breaking in the rule-based fallback scorer.

use serde::{Deserialize, Serialize};

/// Label of a registered handler capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerLabel {
    /// Expense recording, budgets, and spending summaries
    Finance,
    /// Price queries and target-price tracking
    PriceTracker,
    /// Product review and pros/cons analysis
    ProductReview,
    /// General-purpose product recommendation (the default handler)
    Recommendation,
    /// Mailbox connection and purchase-mail sync
    Mail,
    /// Catch-all capability overview
    Help,
}

impl HandlerLabel {
    /// All labels in registration order. First entry wins score ties.
    pub const ALL: [HandlerLabel; 6] = [
        HandlerLabel::Finance,
        HandlerLabel::PriceTracker,
        HandlerLabel::ProductReview,
        HandlerLabel::Recommendation,
        HandlerLabel::Mail,
        HandlerLabel::Help,
    ];

    /// The designated general-purpose handler used when nothing matches
    pub const DEFAULT: HandlerLabel = HandlerLabel::Recommendation;

    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerLabel::Finance => "finance",
            HandlerLabel::PriceTracker => "price_tracker",
            HandlerLabel::ProductReview => "product_review",
            HandlerLabel::Recommendation => "recommendation",
            HandlerLabel::Mail => "mail",
            HandlerLabel::Help => "help",
        }
    }

    /// Parse a label returned by the external classifier.
    ///
    /// Accepts both the canonical snake_case names and the PascalCase agent
    /// names the upstream prompt format used. Anything else is `None` and is
    /// treated as a classifier failure by the router.
    pub fn parse_label(s: &str) -> Option<HandlerLabel> {
        match s.trim() {
            "finance" | "Finance" | "FinanceAgent" => Some(HandlerLabel::Finance),
            "price_tracker" | "PriceTracker" => Some(HandlerLabel::PriceTracker),
            "product_review" | "ProductReview" => Some(HandlerLabel::ProductReview),
            "recommendation" | "Recommendation" | "SmartRecommendation" => {
                Some(HandlerLabel::Recommendation)
            }
            "mail" | "Mail" | "Gmail" => Some(HandlerLabel::Mail),
            "help" | "Help" => Some(HandlerLabel::Help),
            _ => None,
        }
    }

    /// Short capability description, included in the classifier prompt
    pub fn description(&self) -> &'static str {
        match self {
            HandlerLabel::Finance => {
                "records expenses, sets budgets, and summarizes monthly spending"
            }
            HandlerLabel::PriceTracker => {
                "looks up current prices, tracks products against a target price, \
                 and manages the tracking list"
            }
            HandlerLabel::ProductReview => {
                "analyzes product reviews: pros, cons, ratings, and buying advice"
            }
            HandlerLabel::Recommendation => {
                "recommends products for any need or budget and compares options"
            }
            HandlerLabel::Mail => {
                "connects a mailbox and syncs shopping receipts from email"
            }
            HandlerLabel::Help => "explains what the assistant can do",
        }
    }
}

impl std::fmt::Display for HandlerLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for HandlerLabel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HandlerLabel::parse_label(s).ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for label in HandlerLabel::ALL {
            assert_eq!(HandlerLabel::parse_label(label.as_str()), Some(label));
        }
    }

    #[test]
    fn test_unknown_label_is_none() {
        assert_eq!(HandlerLabel::parse_label("weather"), None);
        assert_eq!(HandlerLabel::parse_label(""), None);
    }

    #[test]
    fn test_upstream_names_accepted() {
        assert_eq!(
            HandlerLabel::parse_label("SmartRecommendation"),
            Some(HandlerLabel::Recommendation)
        );
        assert_eq!(HandlerLabel::parse_label("Gmail"), Some(HandlerLabel::Mail));
    }

    #[test]
    fn test_default_is_recommendation() {
        assert_eq!(HandlerLabel::DEFAULT, HandlerLabel::Recommendation);
    }
}
