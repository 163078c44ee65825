//! Price lookup and target-price tracking

use std::sync::Arc;

use async_trait::async_trait;

use shopsaver_core::{
    Handler, HandlerError, HandlerLabel, ShoppingStore, TrackingEntry,
};
use shopsaver_search::PriceSearchAggregator;

use crate::extractor::ParameterExtractor;

const STOP_WORDS: &[&str] = &["stop", "cancel", "remove", "untrack"];
const LIST_WORDS: &[&str] = &["my tracking", "tracking list", "tracked products", "what am i tracking"];

/// Price tracker backed by live multi-source search and the storage
/// collaborator
pub struct PriceTrackerHandler {
    store: Arc<dyn ShoppingStore>,
    aggregator: Arc<PriceSearchAggregator>,
}

impl PriceTrackerHandler {
    pub fn new(store: Arc<dyn ShoppingStore>, aggregator: Arc<PriceSearchAggregator>) -> Self {
        Self { store, aggregator }
    }

    async fn stop_tracking(&self, user_id: &str, message: &str) -> Result<String, HandlerError> {
        let needle = ParameterExtractor::product_name(message).unwrap_or_default();
        let removed = self.store.deactivate_tracking(user_id, &needle).await?;
        Ok(if removed == 0 {
            "You have no matching tracked products.".to_string()
        } else if needle.is_empty() {
            format!("Stopped tracking all {removed} products.")
        } else {
            format!("Stopped tracking {removed} product(s) matching \"{needle}\".")
        })
    }

    async fn list_tracking(&self, user_id: &str) -> Result<String, HandlerError> {
        let entries = self.store.active_tracking_entries(user_id).await?;
        if entries.is_empty() {
            return Ok("You aren't tracking anything yet. Try \"track iPhone 15 target \
                       price 30000\"."
                .to_string());
        }

        let mut out = format!("You're tracking {} product(s):", entries.len());
        for entry in entries {
            out.push_str(&format!(
                "\n- {} (target ${:.0}, last seen ${:.0} on {})",
                entry.product_name, entry.target_price, entry.observed_price, entry.platform
            ));
            if entry.target_met() {
                out.push_str(" - target met!");
            }
        }
        Ok(out)
    }

    async fn lookup_and_track(&self, user_id: &str, message: &str) -> Result<String, HandlerError> {
        let extracted = ParameterExtractor::extract(message);
        let Some(product_name) = extracted.product_name else {
            return Ok("Which product should I look up? For example: \"track Sony \
                       WH-1000XM5 target price 6000\"."
                .to_string());
        };

        let result = self.aggregator.search(&product_name).await;
        if result.is_empty() {
            return Ok(if result.failed_sources.len() == result.total_sources {
                "Price search is temporarily unreachable. Please try again in a few \
                 minutes."
                    .to_string()
            } else {
                format!("I couldn't find any listings for \"{product_name}\".")
            });
        }

        // Non-empty result always has a cheapest candidate
        let cheapest = result
            .cheapest()
            .cloned()
            .ok_or_else(|| HandlerError::Internal("empty result after check".to_string()))?;

        let mut out = format!(
            "Cheapest match for \"{product_name}\": {} at ${:.0} on {}\n{}",
            cheapest.name, cheapest.price, cheapest.platform, cheapest.url
        );
        if !result.failed_sources.is_empty() {
            out.push_str(&format!(
                "\n({} source(s) didn't respond; prices may be incomplete.)",
                result.failed_sources.len()
            ));
        }

        match extracted.target_price {
            Some(target) => {
                let mut entry = TrackingEntry::new(user_id, &product_name, target);
                entry.matched_product = cheapest.name.clone();
                entry.observed_price = cheapest.price;
                entry.platform = cheapest.platform.clone();
                entry.url = cheapest.url.clone();
                let target_met = entry.target_met();
                self.store.upsert_tracking_entry(entry).await?;

                if target_met {
                    out.push_str(&format!(
                        "\nGood news: the current price already meets your ${target:.0} target!"
                    ));
                } else {
                    out.push_str(&format!(
                        "\nNow tracking it against your ${target:.0} target."
                    ));
                }
            }
            None => {
                out.push_str(
                    "\nAdd a target price (\"target price 5000\") and I'll track it for you.",
                );
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl Handler for PriceTrackerHandler {
    fn label(&self) -> HandlerLabel {
        HandlerLabel::PriceTracker
    }

    async fn handle(&self, user_id: &str, message: &str) -> Result<String, HandlerError> {
        let lower = message.to_lowercase();
        if STOP_WORDS.iter().any(|w| lower.contains(w)) {
            return self.stop_tracking(user_id, message).await;
        }
        if LIST_WORDS.iter().any(|w| lower.contains(w)) {
            return self.list_tracking(user_id).await;
        }
        self.lookup_and_track(user_id, message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopsaver_core::{InMemoryStore, SearchCandidate, SearchError, SearchSource};

    struct StaticSource(Vec<SearchCandidate>);

    #[async_trait]
    impl SearchSource for StaticSource {
        fn platform(&self) -> &str {
            "Test"
        }

        async fn search(
            &self,
            _keyword: &str,
            _limit: usize,
        ) -> Result<Vec<SearchCandidate>, SearchError> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl SearchSource for FailingSource {
        fn platform(&self) -> &str {
            "Down"
        }

        async fn search(
            &self,
            _keyword: &str,
            _limit: usize,
        ) -> Result<Vec<SearchCandidate>, SearchError> {
            Err(SearchError::Timeout)
        }
    }

    fn candidate(name: &str, price: f64) -> SearchCandidate {
        SearchCandidate {
            platform: "Test".to_string(),
            name: name.to_string(),
            price,
            url: format!("https://test/{price}"),
            image_url: None,
        }
    }

    fn handler_with(sources: Vec<Arc<dyn SearchSource>>) -> (PriceTrackerHandler, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let aggregator = Arc::new(PriceSearchAggregator::new(sources));
        (PriceTrackerHandler::new(store.clone(), aggregator), store)
    }

    #[tokio::test]
    async fn test_track_with_target_price() {
        let (handler, store) = handler_with(vec![Arc::new(StaticSource(vec![candidate(
            "iPhone 15 Pro 256GB",
            36900.0,
        )]))]);

        let reply = handler
            .handle("u1", "track iPhone 15 Pro target price 35000")
            .await
            .unwrap();
        assert!(reply.contains("$36900"));
        assert!(reply.contains("$35000 target"));

        let entries = store.active_tracking_entries("u1").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].target_price, 35000.0);
        assert_eq!(entries[0].observed_price, 36900.0);
    }

    #[tokio::test]
    async fn test_target_already_met() {
        let (handler, _) = handler_with(vec![Arc::new(StaticSource(vec![candidate(
            "PS5 Slim",
            12900.0,
        )]))]);

        let reply = handler
            .handle("u1", "track PS5 Slim target price 15000")
            .await
            .unwrap();
        assert!(reply.contains("already meets"));
    }

    #[tokio::test]
    async fn test_lookup_without_target_suggests_tracking() {
        let (handler, store) = handler_with(vec![Arc::new(StaticSource(vec![candidate(
            "Kindle Paperwhite",
            4190.0,
        )]))]);

        let reply = handler.handle("u1", "how much is the Kindle Paperwhite").await.unwrap();
        assert!(reply.contains("$4190"));
        assert!(reply.contains("target price"));
        assert!(store.active_tracking_entries("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_product_asks_for_one() {
        let (handler, _) = handler_with(vec![Arc::new(StaticSource(vec![]))]);
        let reply = handler.handle("u1", "track it please").await.unwrap();
        assert!(reply.contains("Which product"));
    }

    #[tokio::test]
    async fn test_all_sources_down_says_unreachable() {
        let (handler, _) = handler_with(vec![Arc::new(FailingSource)]);
        let reply = handler.handle("u1", "track Nintendo Switch").await.unwrap();
        assert!(reply.contains("temporarily unreachable"));
    }

    #[tokio::test]
    async fn test_stop_tracking_by_name() {
        let (handler, store) = handler_with(vec![Arc::new(StaticSource(vec![candidate(
            "Nintendo Switch OLED",
            9780.0,
        )]))]);
        handler
            .handle("u1", "track Nintendo Switch target price 9000")
            .await
            .unwrap();

        let reply = handler.handle("u1", "stop tracking Nintendo Switch").await.unwrap();
        assert!(reply.contains("Stopped tracking 1"));
        assert!(store.active_tracking_entries("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_tracking() {
        let (handler, _) = handler_with(vec![Arc::new(StaticSource(vec![candidate(
            "Dyson V12",
            18900.0,
        )]))]);
        handler.handle("u1", "track Dyson V12 target price 16000").await.unwrap();

        let reply = handler.handle("u1", "show my tracking list").await.unwrap();
        assert!(reply.contains("Dyson V12"));
        assert!(reply.contains("$16000"));
    }
}
