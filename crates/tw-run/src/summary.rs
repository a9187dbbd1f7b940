// summary.rs — Summary Emitter: renders run output into notices.
//
// Pure functions of their inputs. `now` is passed in so rendered text is
// reproducible for a given run.

use chrono::{DateTime, Utc};
use tw_cost::CostReport;
use tw_disposition::DispositionOutcome;
use tw_lifecycle::ResourceRecord;

use crate::config::GovernanceConfig;
use crate::events::{GovernanceEvent, Notice};
use crate::result::RunResult;
use crate::run_state::RunStage;

/// Lists in the weekly summary are cut to this many entries.
pub const SUMMARY_LIST_LIMIT: usize = 10;

const RULE_WIDTH: usize = 50;
const UNKNOWN_OWNER: &str = "Unknown";

/// Builds governance events for one project/environment.
#[derive(Debug, Clone)]
pub struct SummaryEmitter {
    project: String,
    environment: String,
    auto_termination: bool,
    warning_days: u32,
    termination_days: u32,
    monthly_budget: f64,
}

impl SummaryEmitter {
    pub fn new(config: &GovernanceConfig) -> Self {
        Self {
            project: config.project.clone(),
            environment: config.environment.clone(),
            auto_termination: config.auto_termination,
            warning_days: config.warning_days,
            termination_days: config.termination_days,
            monthly_budget: config.monthly_budget,
        }
    }

    fn scope_label(&self) -> String {
        format!("{}-{}", self.project, self.environment)
    }

    pub fn expiration_warning(
        &self,
        result: &RunResult,
        now: DateTime<Utc>,
    ) -> GovernanceEvent {
        let mut lines = vec![
            format!(
                "The following resources in {} are approaching expiration:",
                self.scope_label()
            ),
            String::new(),
        ];
        for r in &result.expiring_soon {
            lines.push(format!("- {}", r.resource_id));
            lines.push(format!("  Days remaining: {}", r.detail.days_remaining()));
            lines.push(format!("  Owner: {}", owner_label(r)));
            lines.push(String::new());
        }
        lines.push(
            "To extend these resources, update the 'ExpiresAt' tag or set 'Lifecycle' to 'persistent'."
                .to_string(),
        );
        lines.push(String::new());
        let fate = if self.auto_termination {
            "automatically terminated"
        } else {
            "flagged for manual review"
        };
        lines.push(format!(
            "Resources will be {} after {} days.",
            fate, self.termination_days
        ));

        GovernanceEvent::ExpirationWarning {
            run_id: result.run_id,
            resources: result.expiring_soon.clone(),
            notice: Notice {
                subject: format!("[{}] Resource Expiration Warning", self.project),
                body: lines.join("\n"),
            },
            timestamp: now,
        }
    }

    pub fn expiration_alert(&self, result: &RunResult, now: DateTime<Utc>) -> GovernanceEvent {
        let mut lines = vec![
            format!(
                "The following resources in {} have EXPIRED:",
                self.scope_label()
            ),
            String::new(),
        ];
        for r in &result.expired {
            lines.push(format!("- {}", r.resource_id));
            if let Some(days) = r.detail.days_expired() {
                lines.push(format!("  Days expired: {}", days));
            }
            if let Some(days) = r.detail.days_old() {
                lines.push(format!("  Days old: {}", days));
            }
            lines.push(format!("  Owner: {}", owner_label(r)));
            lines.push(String::new());
        }
        lines.extend([
            "Auto-termination is DISABLED. Please take manual action:".to_string(),
            "1. Update tags to extend the resources, OR".to_string(),
            "2. Manually terminate the resources if no longer needed".to_string(),
        ]);

        GovernanceEvent::ExpirationAlert {
            run_id: result.run_id,
            resources: result.expired.clone(),
            notice: Notice {
                subject: format!("[{}] URGENT: Expired Resources Need Attention", self.project),
                body: lines.join("\n"),
            },
            timestamp: now,
        }
    }

    pub fn weekly_summary(&self, result: &RunResult, now: DateTime<Utc>) -> GovernanceEvent {
        let rule = "=".repeat(RULE_WIDTH);
        let mut lines = vec![
            format!("Weekly Governance Report for {}", self.scope_label()),
            format!("Generated: {}", now.to_rfc3339()),
            String::new(),
            rule.clone(),
            "RESOURCE LIFECYCLE".to_string(),
            rule.clone(),
            format!("Resources checked: {}", result.checked),
            format!("Warnings sent: {}", result.warned),
            format!("Resources terminated: {}", result.terminated),
        ];

        if !result.expiring_soon.is_empty() {
            lines.push(String::new());
            lines.push("Resources expiring soon:".to_string());
            for r in result.expiring_soon.iter().take(SUMMARY_LIST_LIMIT) {
                lines.push(format!(
                    "  - {} (expires in {} days)",
                    r.resource_id,
                    r.detail.days_remaining()
                ));
            }
        }

        if !result.expired.is_empty() {
            lines.push(String::new());
            lines.push("Expired resources:".to_string());
            for r in result.expired.iter().take(SUMMARY_LIST_LIMIT) {
                lines.push(format!(
                    "  - {} [{}]",
                    r.resource_id,
                    self.expired_label(result, &r.resource_id)
                ));
            }
        }

        if let Some(report) = &result.cost_report {
            self.render_cost(report, &rule, &mut lines);
        }

        lines.extend([
            String::new(),
            rule,
            String::new(),
            format!(
                "Auto-termination: {}",
                if self.auto_termination { "ENABLED" } else { "DISABLED" }
            ),
            format!("Warning threshold: {} days", self.warning_days),
            format!("Termination threshold: {} days", self.termination_days),
        ]);

        GovernanceEvent::WeeklySummary {
            run_id: result.run_id,
            checked: result.checked,
            warned: result.warned,
            terminated: result.terminated,
            total_cost: result
                .cost_report
                .as_ref()
                .filter(|r| !r.is_error())
                .map(|r| r.total_cost),
            notice: Notice {
                subject: format!(
                    "[{}] Weekly Governance Report - {}",
                    self.project,
                    now.format("%Y-%m-%d")
                ),
                body: lines.join("\n"),
            },
            timestamp: now,
        }
    }

    pub fn run_failed(
        &self,
        result: &RunResult,
        stage: RunStage,
        reason: &str,
        now: DateTime<Utc>,
    ) -> GovernanceEvent {
        GovernanceEvent::RunFailed {
            run_id: result.run_id,
            stage,
            reason: reason.to_string(),
            notice: Notice {
                subject: format!("[{}] Governance Check Error", self.project),
                body: format!(
                    "An error occurred during the governance check:\n\n{}",
                    reason
                ),
            },
            timestamp: now,
        }
    }

    fn expired_label(&self, result: &RunResult, resource_id: &str) -> &'static str {
        if !self.auto_termination {
            return "NEEDS ATTENTION";
        }
        match result.disposition_of(resource_id) {
            Some(DispositionOutcome::Disposed { .. }) => "TERMINATED",
            Some(DispositionOutcome::Skipped { .. }) => "UNSUPPORTED",
            Some(DispositionOutcome::Failed { .. }) => "TERMINATION FAILED",
            None => "NEEDS ATTENTION",
        }
    }

    fn render_cost(&self, report: &CostReport, rule: &str, lines: &mut Vec<String>) {
        lines.push(String::new());
        lines.push(rule.to_string());
        lines.push("COST REPORT (Last 30 Days)".to_string());
        lines.push(rule.to_string());

        if let Some(error) = &report.error {
            lines.push(format!("Cost report unavailable: {}", error));
            return;
        }

        let percentage = report
            .budget_status
            .as_ref()
            .map(|b| b.percentage_used)
            .unwrap_or(0.0);
        lines.push(format!("Total spend: ${:.2}", report.total_cost));
        lines.push(format!("Monthly budget: ${:.2}", self.monthly_budget));
        lines.push(format!("Budget used: {:.1}%", percentage));
        if let Some(forecast) = report.forecast {
            lines.push(format!("Forecasted monthly spend: ${:.2}", forecast));
        }

        if !report.by_service.is_empty() {
            lines.push(String::new());
            lines.push("Cost by service:".to_string());
            for (service, cost) in report.services_by_cost().into_iter().take(SUMMARY_LIST_LIMIT) {
                lines.push(format!("  - {}: ${:.2}", service, cost));
            }
        }
    }
}

fn owner_label(record: &ResourceRecord) -> &str {
    record.owner.as_deref().unwrap_or(UNKNOWN_OWNER)
}
