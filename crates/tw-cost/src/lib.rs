//! # tw-cost
//!
//! Cost and budget reporting for one project scope.
//!
//! [`CostReporter::build_report`] asks a [`CostExplorer`] for the trailing
//! 30 days of spend grouped by service, asks separately for a 30-day forward
//! forecast, and derives a [`BudgetStatus`] against the configured monthly
//! budget. The two queries fail independently: a missing forecast only
//! degrades the report, a failed cost query marks it as errored.

pub mod error;
pub mod explorer;
pub mod report;

pub use error::CostError;
pub use explorer::{CostExplorer, CostQuery, Period, ServiceCost, StaticCostExplorer};
pub use report::{BudgetStatus, CostReport, CostReporter};
