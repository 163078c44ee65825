//! Concrete marketplace adapters

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use shopsaver_config::constants::{endpoints, search};
use shopsaver_core::{SearchCandidate, SearchError};

const PCHOME_IMAGE_BASE: &str = "https://cs-a.ecimg.tw";

/// PChome 24h search adapter.
///
/// Uses the public search API and links candidates to their 24h product
/// pages. Prices come back in TWD.
pub struct PchomeSource {
    client: Client,
    endpoint: String,
}

impl PchomeSource {
    pub fn new() -> Result<Self, SearchError> {
        Self::with_endpoint(endpoints::PCHOME_SEARCH)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(search::SOURCE_TIMEOUT_SECS))
            .build()
            .map_err(|e| SearchError::Network(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl shopsaver_core::SearchSource for PchomeSource {
    fn platform(&self) -> &str {
        "PChome"
    }

    async fn search(
        &self,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<SearchCandidate>, SearchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", keyword), ("page", "1"), ("sort", "sale/dc")])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout
                } else {
                    SearchError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Api(format!("HTTP {status}")));
        }

        let body: PchomeResults = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        let candidates = body
            .prods
            .into_iter()
            .take(limit)
            .map(|prod| SearchCandidate {
                platform: self.platform().to_string(),
                name: prod.name,
                price: prod.price,
                url: format!("{}{}", endpoints::PCHOME_PRODUCT_BASE, prod.id),
                image_url: prod
                    .pic_s
                    .filter(|p| !p.is_empty())
                    .map(|p| format!("{PCHOME_IMAGE_BASE}{p}")),
            })
            .collect();

        Ok(candidates)
    }
}

/// Momo search adapter. The upstream site has no public search API; until a
/// sanctioned feed exists this source contributes nothing.
///
/// TODO: switch to the partner product feed once access is granted.
#[derive(Default)]
pub struct MomoSource;

#[async_trait]
impl shopsaver_core::SearchSource for MomoSource {
    fn platform(&self) -> &str {
        "momo"
    }

    async fn search(
        &self,
        keyword: &str,
        _limit: usize,
    ) -> Result<Vec<SearchCandidate>, SearchError> {
        tracing::debug!(keyword, "momo search skipped, no data source");
        Ok(Vec::new())
    }
}

/// Shopee search adapter, same situation as [`MomoSource`]
#[derive(Default)]
pub struct ShopeeSource;

#[async_trait]
impl shopsaver_core::SearchSource for ShopeeSource {
    fn platform(&self) -> &str {
        "Shopee"
    }

    async fn search(
        &self,
        keyword: &str,
        _limit: usize,
    ) -> Result<Vec<SearchCandidate>, SearchError> {
        tracing::debug!(keyword, "Shopee search skipped, no data source");
        Ok(Vec::new())
    }
}

#[derive(Debug, Deserialize)]
struct PchomeResults {
    #[serde(default)]
    prods: Vec<PchomeProduct>,
}

#[derive(Debug, Deserialize)]
struct PchomeProduct {
    #[serde(rename = "Id")]
    id: String,
    name: String,
    price: f64,
    #[serde(rename = "picS")]
    pic_s: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pchome_payload() {
        let json = r#"{
            "totalRows": 2,
            "prods": [
                {"Id": "DYAJ9D-A900FP0NV", "name": "Sony WH-1000XM5", "price": 9990.0, "picS": "/items/a.jpg"},
                {"Id": "DYAJ9D-B900FP0NX", "name": "Sony WH-CH720N", "price": 3990.0, "picS": ""}
            ]
        }"#;
        let results: PchomeResults = serde_json::from_str(json).unwrap();
        assert_eq!(results.prods.len(), 2);
        assert_eq!(results.prods[0].id, "DYAJ9D-A900FP0NV");
        assert_eq!(results.prods[1].price, 3990.0);
    }

    #[test]
    fn test_parse_tolerates_missing_prods() {
        let results: PchomeResults = serde_json::from_str(r#"{"totalRows": 0}"#).unwrap();
        assert!(results.prods.is_empty());
    }
}
