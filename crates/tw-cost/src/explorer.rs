// explorer.rs — Cost query contract.
//
// The cost/usage service is an external collaborator. It answers two
// questions for a tag scope and a date range: how much was spent per
// service, and how much is forecast. Periods are half-open date ranges
// `[start, end)`, matching how billing services bucket by day.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tw_lifecycle::TagScope;

use crate::error::CostError;

/// A half-open date range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    /// The `days` days ending at (and excluding) `end`.
    pub fn trailing(end: NaiveDate, days: i64) -> Self {
        Self {
            start: end - Duration::days(days),
            end,
        }
    }

    /// The `days` days starting at `start`.
    pub fn forward(start: NaiveDate, days: i64) -> Self {
        Self {
            start,
            end: start + Duration::days(days),
        }
    }
}

/// A cost query: date range plus tag scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostQuery {
    pub period: Period,
    pub scope: TagScope,
}

/// One grouped amount. A service may appear once per time bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCost {
    pub service: String,
    pub amount: f64,
}

impl ServiceCost {
    pub fn new(service: impl Into<String>, amount: f64) -> Self {
        Self {
            service: service.into(),
            amount,
        }
    }
}

/// Cost/usage and forecast queries.
///
/// Each call is a single attempt bounded by a timeout; no retries.
pub trait CostExplorer {
    /// Unblended cost over `query.period`, grouped by service.
    fn cost_by_service(&self, query: &CostQuery) -> Result<Vec<ServiceCost>, CostError>;

    /// Forecast total cost over `query.period`.
    fn forecast(&self, query: &CostQuery) -> Result<f64, CostError>;
}

/// In-memory cost explorer with canned answers. Used for replay and tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticCostExplorer {
    #[serde(default)]
    pub costs: Vec<ServiceCost>,
    #[serde(default)]
    pub forecast: Option<f64>,
    /// When set, `cost_by_service` fails with this message.
    #[serde(default)]
    pub cost_error: Option<String>,
    /// When set, `forecast` fails with this message.
    #[serde(default)]
    pub forecast_error: Option<String>,
}

impl CostExplorer for StaticCostExplorer {
    fn cost_by_service(&self, _query: &CostQuery) -> Result<Vec<ServiceCost>, CostError> {
        match &self.cost_error {
            Some(message) => Err(CostError::Unavailable(message.clone())),
            None => Ok(self.costs.clone()),
        }
    }

    fn forecast(&self, _query: &CostQuery) -> Result<f64, CostError> {
        if let Some(message) = &self.forecast_error {
            return Err(CostError::Unavailable(message.clone()));
        }
        self.forecast
            .ok_or_else(|| CostError::NoData("forecast".to_string()))
    }
}
