//! Rule-based fallback scorer
//!
//! Deterministic, network-free classification used when the external
//! classifier is unconfigured or fails. Each handler has fixed weighted
//! keyword groups; scores are summed per handler independently. Identical
//! input always yields identical scores, which makes this path testable
//! without any external dependency.

use shopsaver_config::constants::routing;
use shopsaver_core::{DecisionSource, HandlerLabel, RoutingDecision};

/// One weighted keyword group. The group weight is added once when any of
/// its keywords matches, not per keyword.
struct KeywordGroup {
    weight: f32,
    keywords: &'static [&'static str],
}

struct HandlerRules {
    label: HandlerLabel,
    groups: &'static [KeywordGroup],
}

/// Keyword tables in registration order. Order matters: the first entry
/// wins ties at equal nonzero score.
static RULES: &[HandlerRules] = &[
    HandlerRules {
        label: HandlerLabel::Finance,
        groups: &[
            KeywordGroup {
                weight: 0.7,
                keywords: &["spend", "spent", "expense", "budget", "bookkeep", "record"],
            },
            KeywordGroup {
                weight: 0.3,
                keywords: &[
                    "this month",
                    "last month",
                    "today",
                    "summary",
                    "statistic",
                    "overspent",
                ],
            },
        ],
    },
    HandlerRules {
        label: HandlerLabel::PriceTracker,
        groups: &[
            KeywordGroup {
                weight: 0.7,
                keywords: &[
                    "price", "how much", "track", "monitor", "cheap", "deal", "discount",
                    "on sale", "cost",
                ],
            },
            KeywordGroup {
                weight: 0.3,
                keywords: &["notify", "alert", "target", "price drop", "drop below"],
            },
        ],
    },
    HandlerRules {
        label: HandlerLabel::ProductReview,
        groups: &[
            KeywordGroup {
                weight: 0.7,
                keywords: &[
                    "review", "rating", "worth buying", "worth it", "any good",
                    "pros and cons",
                ],
            },
            KeywordGroup {
                weight: 0.3,
                keywords: &["experience", "feedback", "opinion", "complaint"],
            },
        ],
    },
    HandlerRules {
        label: HandlerLabel::Recommendation,
        groups: &[
            KeywordGroup {
                weight: 0.5,
                keywords: &[
                    "buy", "recommend", "suggest", "which", "want", "need",
                    "looking for", "choose",
                ],
            },
            KeywordGroup {
                weight: 0.3,
                keywords: &[
                    "mouse", "keyboard", "headphone", "earbud", "phone", "laptop",
                    "tablet", "camera",
                ],
            },
            KeywordGroup {
                weight: 0.2,
                keywords: &["?"],
            },
        ],
    },
    HandlerRules {
        label: HandlerLabel::Mail,
        groups: &[
            KeywordGroup {
                weight: 0.8,
                keywords: &["gmail", "email", "mail", "inbox"],
            },
            KeywordGroup {
                weight: 0.2,
                keywords: &["connect", "sync", "authorize", "scan"],
            },
        ],
    },
    HandlerRules {
        label: HandlerLabel::Help,
        groups: &[KeywordGroup {
            weight: 0.7,
            keywords: &["help", "what can you do", "how do i use", "instructions"],
        }],
    },
];

/// Stateless keyword scorer
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedScorer;

impl RuleBasedScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score a message against every handler's keyword table.
    ///
    /// Returned in registration order so callers can apply the
    /// first-registered tie-break deterministically.
    pub fn score(&self, message: &str) -> Vec<(HandlerLabel, f32)> {
        let lower = message.to_lowercase();
        RULES
            .iter()
            .map(|rules| {
                let score: f32 = rules
                    .groups
                    .iter()
                    .filter(|group| group.keywords.iter().any(|kw| lower.contains(kw)))
                    .map(|group| group.weight)
                    .sum();
                (rules.label, score)
            })
            .collect()
    }

    /// Produce a full routing decision from the keyword tables.
    ///
    /// An all-zero score defaults to the general-purpose handler at low
    /// confidence; otherwise the strictly highest score wins, with ties
    /// going to the first-registered handler. Nonzero confidence is capped.
    pub fn decide(&self, message: &str) -> RoutingDecision {
        let scores = self.score(message);
        let best = scores
            .iter()
            .copied()
            // max_by with total_cmp keeps the LAST maximum; scan in reverse
            // so the first-registered handler wins ties.
            .rev()
            .max_by(|a, b| a.1.total_cmp(&b.1));

        match best {
            Some((label, score)) if score > 0.0 => {
                let confidence = score.min(routing::RULE_CONFIDENCE_CAP);
                tracing::debug!(%label, score, "Rule scorer matched");
                RoutingDecision {
                    handler: label,
                    confidence,
                    rationale: format!("keyword rules matched {label}"),
                    source: DecisionSource::RuleFallback,
                }
            }
            _ => RoutingDecision {
                handler: HandlerLabel::DEFAULT,
                confidence: routing::DEFAULT_HANDLER_CONFIDENCE,
                rationale: "no keyword rules matched; using default handler".to_string(),
                source: DecisionSource::RuleFallback,
            },
        }
    }
}
