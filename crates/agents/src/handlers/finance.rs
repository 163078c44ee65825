//! Expense recording, budgets, and spending summaries

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use shopsaver_core::{
    Handler, HandlerError, HandlerLabel, PeriodSelector, ShoppingStore,
};

static BUDGET_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)budget\s*(?:to|is|of|:)?\s*\$?\s*([0-9][0-9,]*(?:\.[0-9]+)?)")
        .expect("budget pattern must compile")
});

static EXPENSE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:spent|spend|record)\s*\$?\s*([0-9][0-9,]*(?:\.[0-9]+)?)\s*(?:on\s+)?(.*)")
        .expect("expense pattern must compile")
});

/// Bookkeeping handler backed by the storage collaborator
pub struct FinanceHandler {
    store: Arc<dyn ShoppingStore>,
}

impl FinanceHandler {
    pub fn new(store: Arc<dyn ShoppingStore>) -> Self {
        Self { store }
    }

    async fn summary(&self, user_id: &str, period: PeriodSelector) -> Result<String, HandlerError> {
        let Some(summary) = self.store.finance_summary(user_id, period).await? else {
            return Ok(format!(
                "You have no expense records for {} yet. Say \"record 150 lunch\" to start \
                 bookkeeping.",
                period.as_str()
            ));
        };

        let mut out = format!(
            "Spending {}: ${:.0}",
            period.as_str(),
            summary.total_spending
        );
        if summary.budget > 0.0 {
            let remaining = summary.budget - summary.total_spending;
            if remaining >= 0.0 {
                out.push_str(&format!(
                    "\nBudget ${:.0}, ${:.0} left.",
                    summary.budget, remaining
                ));
            } else {
                out.push_str(&format!(
                    "\nBudget ${:.0}, overspent by ${:.0}!",
                    summary.budget, -remaining
                ));
            }
        }
        if !summary.categories.is_empty() {
            out.push_str("\nTop categories:");
            for (category, amount) in summary.categories.iter().take(3) {
                out.push_str(&format!("\n- {category}: ${amount:.0}"));
            }
        }
        Ok(out)
    }

    fn parse_amount(raw: &str) -> Option<f64> {
        raw.replace(',', "").parse::<f64>().ok()
    }

    /// Coarse category bucket from expense keywords
    fn guess_category(text: &str) -> &'static str {
        const FOOD: &[&str] = &[
            "lunch", "breakfast", "dinner", "meal", "food", "coffee", "snack", "eat",
            "groceries", "restaurant",
        ];
        const TRANSPORT: &[&str] = &[
            "bus", "taxi", "train", "mrt", "uber", "gas", "fuel", "parking", "transport",
        ];
        const ENTERTAINMENT: &[&str] =
            &["movie", "game", "concert", "entertainment", "streaming"];

        let lower = text.to_lowercase();
        if FOOD.iter().any(|kw| lower.contains(kw)) {
            "food"
        } else if TRANSPORT.iter().any(|kw| lower.contains(kw)) {
            "transport"
        } else if ENTERTAINMENT.iter().any(|kw| lower.contains(kw)) {
            "entertainment"
        } else {
            "other"
        }
    }
}

#[async_trait]
impl Handler for FinanceHandler {
    fn label(&self) -> HandlerLabel {
        HandlerLabel::Finance
    }

    async fn handle(&self, user_id: &str, message: &str) -> Result<String, HandlerError> {
        let lower = message.to_lowercase();

        if lower.contains("budget") {
            if let Some(captures) = BUDGET_PATTERN.captures(message) {
                if let Some(amount) = Self::parse_amount(&captures[1]) {
                    self.store.set_budget(user_id, amount).await?;
                    return Ok(format!(
                        "Monthly budget set to ${amount:.0}. I'll flag it when you overspend."
                    ));
                }
            }
        }

        if let Some(captures) = EXPENSE_PATTERN.captures(message) {
            if let Some(amount) = Self::parse_amount(&captures[1]) {
                let note = captures[2].trim();
                let category = Self::guess_category(message);
                self.store
                    .record_expense(user_id, amount, category, note)
                    .await?;
                return Ok(if note.is_empty() {
                    format!("Recorded ${amount:.0} under \"{category}\".")
                } else {
                    format!("Recorded ${amount:.0} under \"{category}\" ({note}).")
                });
            }
        }

        let period = if lower.contains("last month") {
            PeriodSelector::LastMonth
        } else {
            PeriodSelector::ThisMonth
        };
        self.summary(user_id, period).await
    }
}
