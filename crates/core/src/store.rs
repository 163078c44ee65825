//! In-memory storage adapter
//!
//! Default `ShoppingStore` implementation backed by process memory. Used in
//! tests and in deployments without a database; a persistent adapter can
//! replace it behind the same trait.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::traits::ShoppingStore;
use crate::types::{FinanceSummary, PeriodSelector, TrackingEntry};

#[derive(Debug, Clone)]
struct ExpenseRow {
    amount: f64,
    category: String,
    #[allow(dead_code)]
    note: String,
    year: i32,
    month: u32,
}

#[derive(Default)]
struct UserFinance {
    expenses: Vec<ExpenseRow>,
    budget: f64,
}

/// Process-memory storage for finance rows and tracking entries
#[derive(Default)]
pub struct InMemoryStore {
    finance: RwLock<HashMap<String, UserFinance>>,
    tracking: RwLock<HashMap<String, Vec<TrackingEntry>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn period_bounds(period: PeriodSelector) -> (i32, u32) {
        let now = Utc::now();
        match period {
            PeriodSelector::ThisMonth => (now.year(), now.month()),
            PeriodSelector::LastMonth => {
                if now.month() == 1 {
                    (now.year() - 1, 12)
                } else {
                    (now.year(), now.month() - 1)
                }
            }
        }
    }
}

#[async_trait]
impl ShoppingStore for InMemoryStore {
    async fn finance_summary(
        &self,
        user_id: &str,
        period: PeriodSelector,
    ) -> Result<Option<FinanceSummary>, StoreError> {
        let (year, month) = Self::period_bounds(period);
        let finance = self.finance.read();
        let Some(user) = finance.get(user_id) else {
            return Ok(None);
        };

        let mut total = 0.0;
        let mut categories: HashMap<String, f64> = HashMap::new();
        for row in user.expenses.iter().filter(|r| r.year == year && r.month == month) {
            total += row.amount;
            *categories.entry(row.category.clone()).or_default() += row.amount;
        }

        if total == 0.0 && user.budget == 0.0 {
            return Ok(None);
        }

        let mut categories: Vec<(String, f64)> = categories.into_iter().collect();
        categories.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(Some(FinanceSummary {
            total_spending: total,
            budget: user.budget,
            categories,
        }))
    }

    async fn record_expense(
        &self,
        user_id: &str,
        amount: f64,
        category: &str,
        note: &str,
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        let mut finance = self.finance.write();
        finance
            .entry(user_id.to_string())
            .or_default()
            .expenses
            .push(ExpenseRow {
                amount,
                category: category.to_string(),
                note: note.to_string(),
                year: now.year(),
                month: now.month(),
            });
        Ok(())
    }

    async fn set_budget(&self, user_id: &str, amount: f64) -> Result<(), StoreError> {
        self.finance
            .write()
            .entry(user_id.to_string())
            .or_default()
            .budget = amount;
        Ok(())
    }

    async fn upsert_tracking_entry(&self, entry: TrackingEntry) -> Result<(), StoreError> {
        let mut tracking = self.tracking.write();
        let entries = tracking.entry(entry.user_id.clone()).or_default();
        match entries
            .iter_mut()
            .find(|e| e.product_name.eq_ignore_ascii_case(&entry.product_name))
        {
            Some(existing) => {
                let created_at = existing.created_at;
                *existing = entry;
                existing.created_at = created_at;
                existing.updated_at = Utc::now();
            }
            None => entries.push(entry),
        }
        Ok(())
    }

    async fn active_tracking_entries(
        &self,
        user_id: &str,
    ) -> Result<Vec<TrackingEntry>, StoreError> {
        Ok(self
            .tracking
            .read()
            .get(user_id)
            .map(|entries| entries.iter().filter(|e| e.active).cloned().collect())
            .unwrap_or_default())
    }

    async fn deactivate_tracking(
        &self,
        user_id: &str,
        product_match: &str,
    ) -> Result<usize, StoreError> {
        let needle = product_match.to_lowercase();
        let mut tracking = self.tracking.write();
        let Some(entries) = tracking.get_mut(user_id) else {
            return Ok(0);
        };

        let mut count = 0;
        for entry in entries.iter_mut().filter(|e| e.active) {
            // Empty needle matches everything ("remove all tracking")
            if needle.is_empty() || entry.product_name.to_lowercase().contains(&needle) {
                entry.active = false;
                entry.updated_at = Utc::now();
                count += 1;
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_expense_and_summary() {
        let store = InMemoryStore::new();
        store.record_expense("u1", 150.0, "food", "lunch").await.unwrap();
        store.record_expense("u1", 300.0, "food", "dinner").await.unwrap();
        store.record_expense("u1", 80.0, "transport", "bus").await.unwrap();
        store.set_budget("u1", 1000.0).await.unwrap();

        let summary = store
            .finance_summary("u1", PeriodSelector::ThisMonth)
            .await
            .unwrap()
            .expect("summary should exist");
        assert_eq!(summary.total_spending, 530.0);
        assert_eq!(summary.budget, 1000.0);
        assert_eq!(summary.categories[0].0, "food");
    }

    #[tokio::test]
    async fn test_summary_absent_for_unknown_user() {
        let store = InMemoryStore::new();
        let summary = store
            .finance_summary("nobody", PeriodSelector::ThisMonth)
            .await
            .unwrap();
        assert!(summary.is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_product() {
        let store = InMemoryStore::new();
        store
            .upsert_tracking_entry(TrackingEntry::new("u1", "phone 15", 30000.0))
            .await
            .unwrap();
        store
            .upsert_tracking_entry(TrackingEntry::new("u1", "Phone 15", 28000.0))
            .await
            .unwrap();

        let entries = store.active_tracking_entries("u1").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].target_price, 28000.0);
    }

    #[tokio::test]
    async fn test_deactivate_by_substring() {
        let store = InMemoryStore::new();
        store
            .upsert_tracking_entry(TrackingEntry::new("u1", "iPhone 15 Pro", 35000.0))
            .await
            .unwrap();
        store
            .upsert_tracking_entry(TrackingEntry::new("u1", "PS5 console", 15000.0))
            .await
            .unwrap();

        let removed = store.deactivate_tracking("u1", "iphone").await.unwrap();
        assert_eq!(removed, 1);
        let entries = store.active_tracking_entries("u1").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].product_name, "PS5 console");
    }

    #[tokio::test]
    async fn test_deactivate_all_with_empty_match() {
        let store = InMemoryStore::new();
        store
            .upsert_tracking_entry(TrackingEntry::new("u1", "a", 100.0))
            .await
            .unwrap();
        store
            .upsert_tracking_entry(TrackingEntry::new("u1", "b", 100.0))
            .await
            .unwrap();

        let removed = store.deactivate_tracking("u1", "").await.unwrap();
        assert_eq!(removed, 2);
        assert!(store.active_tracking_entries("u1").await.unwrap().is_empty());
    }
}
