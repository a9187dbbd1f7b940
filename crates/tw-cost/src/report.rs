// report.rs — Cost & budget report.
//
// One report per run, recomputed from scratch; nothing is cached.
//
//   1. cost_by_service over [today - 30d, today)  → totals, per-service map
//   2. forecast over        [today, today + 30d)  → optional
//   3. budget status = total / monthly budget
//
// A failed cost query makes the whole report errored (totals zero, no
// budget status). A failed forecast only leaves `forecast` empty.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tw_lifecycle::TagScope;

use crate::error::CostError;
use crate::explorer::{CostExplorer, CostQuery, Period};

/// Length of the trailing cost window and of the forecast window.
pub const REPORT_WINDOW_DAYS: i64 = 30;

/// Spend relative to the configured monthly budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub monthly_budget: f64,
    pub current_spend: f64,
    /// `current_spend / monthly_budget * 100`, or 0 when the budget is not positive.
    pub percentage_used: f64,
    pub forecast: Option<f64>,
}

impl BudgetStatus {
    pub fn new(monthly_budget: f64, current_spend: f64, forecast: Option<f64>) -> Self {
        let percentage_used = if monthly_budget > 0.0 {
            current_spend / monthly_budget * 100.0
        } else {
            0.0
        };
        Self {
            monthly_budget,
            current_spend,
            percentage_used,
            forecast,
        }
    }

    pub fn is_over_budget(&self) -> bool {
        self.monthly_budget > 0.0 && self.current_spend > self.monthly_budget
    }
}

/// Trailing cost breakdown for one project scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostReport {
    pub period: Period,
    pub total_cost: f64,
    pub by_service: HashMap<String, f64>,
    pub forecast: Option<f64>,
    pub budget_status: Option<BudgetStatus>,
    /// Set when the cost query failed; other fields are then best-effort.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CostReport {
    fn empty(period: Period) -> Self {
        Self {
            period,
            total_cost: 0.0,
            by_service: HashMap::new(),
            forecast: None,
            budget_status: None,
            error: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Services ordered by cost, highest first (ties by name).
    pub fn services_by_cost(&self) -> Vec<(&str, f64)> {
        let mut services: Vec<(&str, f64)> = self
            .by_service
            .iter()
            .map(|(name, cost)| (name.as_str(), *cost))
            .collect();
        services.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        services
    }
}

/// Builds [`CostReport`]s against a fixed monthly budget.
#[derive(Debug, Clone, Copy)]
pub struct CostReporter {
    monthly_budget: f64,
}

impl CostReporter {
    pub fn new(monthly_budget: f64) -> Self {
        Self { monthly_budget }
    }

    /// Build the report for `scope` as of `today`. Never fails: errors are
    /// carried inside the report.
    pub fn build_report(
        &self,
        explorer: &dyn CostExplorer,
        scope: &TagScope,
        today: NaiveDate,
    ) -> CostReport {
        let period = Period::trailing(today, REPORT_WINDOW_DAYS);
        let mut report = CostReport::empty(period);

        let grouped = match explorer.cost_by_service(&CostQuery {
            period,
            scope: scope.clone(),
        }) {
            Ok(grouped) => grouped,
            Err(e) => {
                tracing::warn!("error generating cost report: {}", e);
                report.error = Some(e.to_string());
                return report;
            }
        };

        for group in grouped {
            if !group.amount.is_finite() {
                let e = CostError::InvalidAmount {
                    service: group.service,
                    amount: group.amount,
                };
                tracing::warn!("error generating cost report: {}", e);
                report.error = Some(e.to_string());
                report.total_cost = 0.0;
                report.by_service.clear();
                return report;
            }
            *report.by_service.entry(group.service).or_insert(0.0) += group.amount;
            report.total_cost += group.amount;
        }

        let forecast_query = CostQuery {
            period: Period::forward(today, REPORT_WINDOW_DAYS),
            scope: scope.clone(),
        };
        report.forecast = match explorer.forecast(&forecast_query) {
            Ok(amount) if amount.is_finite() => Some(amount),
            Ok(amount) => {
                tracing::warn!("could not get cost forecast: non-finite amount {}", amount);
                None
            }
            Err(e) => {
                tracing::warn!("could not get cost forecast: {}", e);
                None
            }
        };

        report.budget_status = Some(BudgetStatus::new(
            self.monthly_budget,
            report.total_cost,
            report.forecast,
        ));

        tracing::info!(
            total = report.total_cost,
            services = report.by_service.len(),
            forecast = ?report.forecast,
            "cost report built"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::{ServiceCost, StaticCostExplorer};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn scope() -> TagScope {
        TagScope::project("atlas")
    }

    #[test]
    fn sums_groups_and_computes_budget_percentage() {
        let explorer = StaticCostExplorer {
            costs: vec![ServiceCost::new("A", 10.0), ServiceCost::new("B", 5.0)],
            forecast: Some(30.0),
            ..Default::default()
        };
        let report = CostReporter::new(20.0).build_report(&explorer, &scope(), today());

        assert!(report.error.is_none());
        assert_eq!(report.total_cost, 15.0);
        let status = report.budget_status.unwrap();
        assert_eq!(status.percentage_used, 75.0);
        assert_eq!(status.forecast, Some(30.0));
        assert!(!status.is_over_budget());
    }

    #[test]
    fn repeated_services_across_buckets_are_summed() {
        let explorer = StaticCostExplorer {
            costs: vec![
                ServiceCost::new("EC2", 4.0),
                ServiceCost::new("RDS", 1.5),
                ServiceCost::new("EC2", 6.0),
            ],
            ..Default::default()
        };
        let report = CostReporter::new(200.0).build_report(&explorer, &scope(), today());
        assert_eq!(report.by_service["EC2"], 10.0);
        assert_eq!(report.total_cost, 11.5);
    }

    #[test]
    fn forecast_failure_leaves_report_valid() {
        let explorer = StaticCostExplorer {
            costs: vec![ServiceCost::new("A", 10.0)],
            forecast_error: Some("insufficient history".into()),
            ..Default::default()
        };
        let report = CostReporter::new(200.0).build_report(&explorer, &scope(), today());
        assert!(report.error.is_none());
        assert!(report.forecast.is_none());
        assert_eq!(report.total_cost, 10.0);
        assert!(report.budget_status.unwrap().forecast.is_none());
    }

    #[test]
    fn cost_failure_marks_report_errored() {
        let explorer = StaticCostExplorer {
            cost_error: Some("access denied".into()),
            forecast: Some(99.0),
            ..Default::default()
        };
        let report = CostReporter::new(200.0).build_report(&explorer, &scope(), today());
        assert!(report.is_error());
        assert!(report.error.as_ref().unwrap().contains("access denied"));
        assert_eq!(report.total_cost, 0.0);
        assert!(report.budget_status.is_none());
        assert!(report.forecast.is_none());
    }

    #[test]
    fn zero_budget_reports_zero_percent() {
        let explorer = StaticCostExplorer {
            costs: vec![ServiceCost::new("A", 10.0)],
            ..Default::default()
        };
        let report = CostReporter::new(0.0).build_report(&explorer, &scope(), today());
        assert_eq!(report.budget_status.unwrap().percentage_used, 0.0);
    }

    #[test]
    fn non_finite_amount_marks_report_errored() {
        let explorer = StaticCostExplorer {
            costs: vec![ServiceCost::new("A", 1.0), ServiceCost::new("B", f64::NAN)],
            ..Default::default()
        };
        let report = CostReporter::new(200.0).build_report(&explorer, &scope(), today());
        assert!(report.is_error());
        assert!(report.by_service.is_empty());
    }

    #[test]
    fn services_sorted_by_cost_descending() {
        let explorer = StaticCostExplorer {
            costs: vec![
                ServiceCost::new("S3", 1.0),
                ServiceCost::new("EC2", 9.0),
                ServiceCost::new("RDS", 4.0),
                ServiceCost::new("CloudWatch", 4.0),
            ],
            ..Default::default()
        };
        let report = CostReporter::new(200.0).build_report(&explorer, &scope(), today());
        let names: Vec<&str> = report.services_by_cost().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["EC2", "CloudWatch", "RDS", "S3"]);
    }

    #[test]
    fn report_period_is_trailing_thirty_days() {
        let report =
            CostReporter::new(1.0).build_report(&StaticCostExplorer::default(), &scope(), today());
        assert_eq!(report.period.end, today());
        assert_eq!(report.period.start, NaiveDate::from_ymd_opt(2025, 5, 16).unwrap());
    }
}
