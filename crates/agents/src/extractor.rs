//! Structured parameter extraction from free text
//!
//! Pulls a product name and an optional target price out of a routed
//! message. Extraction is best-effort: a missing field is ordinary control
//! flow the handlers turn into a follow-up question, never an error.

use once_cell::sync::Lazy;
use regex::Regex;

use shopsaver_config::constants::extraction;
use shopsaver_core::ExtractionResult;

/// Price patterns in precedence order. Explicitly labeled prices win over
/// bare numbers so "iPhone 15 target price 35000" never reads 15 as the
/// target.
static PRICE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)target\s*price\s*[:\s]\s*\$?\s*([0-9][0-9,]*(?:\.[0-9]+)?)",
        r"(?i)target\s*[:\s]\s*\$?\s*([0-9][0-9,]*(?:\.[0-9]+)?)",
        r"(?i)(?:price|under|below|within|budget)\s*[:\s]\s*\$?\s*([0-9][0-9,]*(?:\.[0-9]+)?)",
        r"\$\s*([0-9][0-9,]*(?:\.[0-9]+)?)",
        r"(?i)([0-9][0-9,]*(?:\.[0-9]+)?)\s*(?:dollars|bucks|ntd|twd|yuan)",
        r"\b([0-9][0-9,]{3,}(?:\.[0-9]+)?)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("price pattern must compile"))
    .collect()
});

/// Action and filler words stripped when isolating the product name
static ACTION_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b(track|tracking|monitor|watch|notify|alert|price|prices|target|",
        r"please|help|me|my|when|drop|drops|below|under|within|budget|stop|cancel|",
        r"remove|delete|query|check|list|how|much|is|are|the|a|an|to|at|for|of|on|i|want|buy|",
        r"buying|it|review|reviews|rating|ratings|worth|any|good|show|what|which|",
        r"do|you|think|about|should)\b",
    ))
    .expect("action word pattern must compile")
});

/// Stateless extractor for product names and target prices
pub struct ParameterExtractor;

impl ParameterExtractor {
    /// Extract both fields from a message. Either may be absent.
    pub fn extract(message: &str) -> ExtractionResult {
        ExtractionResult {
            product_name: Self::product_name(message),
            target_price: Self::target_price(message),
        }
    }

    /// First plausible price in pattern-precedence order.
    ///
    /// A match below the plausibility floor is treated as noise (a model
    /// number, a quantity) and scanning continues with later patterns.
    pub fn target_price(message: &str) -> Option<f64> {
        for pattern in PRICE_PATTERNS.iter() {
            for captures in pattern.captures_iter(message) {
                let raw = captures.get(1)?.as_str().replace(',', "");
                if let Ok(value) = raw.parse::<f64>() {
                    if value >= extraction::MIN_PLAUSIBLE_PRICE {
                        return Some(value);
                    }
                }
            }
        }
        None
    }

    /// The message with price spans, action words, and punctuation removed.
    ///
    /// Whatever survives, trimmed and whitespace-collapsed, is the product
    /// name. Too-short remainders are discarded rather than guessed at.
    pub fn product_name(message: &str) -> Option<String> {
        let mut text = message.to_string();
        for pattern in PRICE_PATTERNS.iter() {
            text = pattern.replace_all(&text, " ").into_owned();
        }
        text = ACTION_WORDS.replace_all(&text, " ").into_owned();

        let cleaned: String = text
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '+' || c == '-' || c == '\'' {
                    c
                } else {
                    ' '
                }
            })
            .collect();
        let name = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

        if name.chars().count() > extraction::MIN_PRODUCT_NAME_CHARS {
            Some(name)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_target_price_wins_over_model_number() {
        let result = ParameterExtractor::extract("track iPhone 15 Pro target price 35000");
        assert_eq!(result.product_name.as_deref(), Some("iPhone 15 Pro"));
        assert_eq!(result.target_price, Some(35000.0));
    }

    #[test]
    fn test_bare_large_number_is_a_price() {
        assert_eq!(
            ParameterExtractor::target_price("notify me when the PS5 drops to 12900"),
            Some(12900.0)
        );
    }

    #[test]
    fn test_small_number_is_noise_not_price() {
        // 15 is a model number, and no other pattern matches
        assert_eq!(ParameterExtractor::target_price("track iPhone 15"), None);
    }

    #[test]
    fn test_noise_floor_falls_through_to_later_patterns() {
        // "target: 50" is implausible; the bare 25,000 still gets found
        let price = ParameterExtractor::target_price("target: 50 but I could pay 25,000");
        assert_eq!(price, Some(25000.0));
    }

    #[test]
    fn test_currency_symbol_and_commas() {
        assert_eq!(
            ParameterExtractor::target_price("under $1,299.50 please"),
            Some(1299.5)
        );
    }

    #[test]
    fn test_no_price_at_all() {
        assert_eq!(ParameterExtractor::target_price("track the new Kindle"), None);
    }

    #[test]
    fn test_product_name_survives_keyword_stripping() {
        assert_eq!(
            ParameterExtractor::product_name("please track the Sony WH-1000XM5 price"),
            Some("Sony WH-1000XM5".to_string())
        );
    }

    #[test]
    fn test_too_short_remainder_is_none() {
        assert_eq!(ParameterExtractor::product_name("track it please"), None);
        assert_eq!(ParameterExtractor::product_name("ps"), None);
    }

    #[test]
    fn test_punctuation_collapsed() {
        assert_eq!(
            ParameterExtractor::product_name("track: AirPods Pro!!!"),
            Some("AirPods Pro".to_string())
        );
    }

    #[test]
    fn test_extract_handles_price_only_message() {
        let result = ParameterExtractor::extract("target price 20000");
        assert_eq!(result.product_name, None);
        assert_eq!(result.target_price, Some(20000.0));
    }
}
