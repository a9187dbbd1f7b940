// run.rs — One governance run, end to end.
//
//   Start → Scanning → Classified → Disposing → Reporting → Summarized
//
// Scanning pages through the tag source and classifies every resource.
// A failed page discards the whole scan (ErrorCaptured(Scanning)) and the
// run resumes at Reporting, since cost data does not depend on the scan.
// Disposing sends the expiration warning and then either disposes of the
// expired batch (auto-termination on) or alerts for manual action.
// Summarized sends the weekly summary, or a run-failed notice when the scan
// failed. Nothing in a run returns an error to the caller.

use chrono::{DateTime, Utc};
use tw_cost::{CostExplorer, CostReporter};
use tw_disposition::Dispatcher;
use tw_lifecycle::{pages, Classifier, SourceError, TagScope, TagSource};

use crate::config::GovernanceConfig;
use crate::events::{EventDispatcher, GovernanceEvent};
use crate::result::RunResult;
use crate::run_state::{RunStage, RunState};
use crate::summary::SummaryEmitter;

/// A configured governance run over external collaborators.
pub struct GovernanceRun<'a> {
    config: &'a GovernanceConfig,
    source: &'a dyn TagSource,
    costs: &'a dyn CostExplorer,
    dispatcher: &'a Dispatcher,
    notifier: &'a EventDispatcher,
}

impl<'a> GovernanceRun<'a> {
    pub fn new(
        config: &'a GovernanceConfig,
        source: &'a dyn TagSource,
        costs: &'a dyn CostExplorer,
        dispatcher: &'a Dispatcher,
        notifier: &'a EventDispatcher,
    ) -> Self {
        Self {
            config,
            source,
            costs,
            dispatcher,
            notifier,
        }
    }

    /// Execute one run as of `now`.
    pub fn execute(&self, now: DateTime<Utc>) -> RunResult {
        let mut result = RunResult::new(now, self.config.auto_termination);
        let emitter = SummaryEmitter::new(self.config);
        let scope = self.config.scope();

        tracing::info!(
            run_id = %result.run_id,
            project = %self.config.project,
            environment = %self.config.environment,
            source = self.source.name(),
            "starting governance check"
        );

        self.step(&mut result, RunState::Scanning);
        let scan_error = match self.scan(&scope, now, &mut result) {
            Ok(()) => {
                self.step(&mut result, RunState::Classified);
                self.step(&mut result, RunState::Disposing);
                self.handle_expiring(&emitter, &mut result, now);
                self.handle_expired(&emitter, &mut result, now);
                None
            }
            Err(e) => {
                let reason = format!("resource enumeration failed: {}", e);
                result.reset_scan();
                result.capture_error(RunStage::Scanning, reason.clone());
                Some(reason)
            }
        };

        self.step(&mut result, RunState::Reporting);
        let report = CostReporter::new(self.config.monthly_budget).build_report(
            self.costs,
            &scope,
            now.date_naive(),
        );
        if let Some(error) = &report.error {
            result.capture_error(RunStage::Reporting, format!("cost report failed: {}", error));
        }
        result.cost_report = Some(report);

        self.step(&mut result, RunState::Summarized);
        let closing = match &scan_error {
            None => emitter.weekly_summary(&result, now),
            Some(reason) => emitter.run_failed(&result, RunStage::Scanning, reason, now),
        };
        self.notify(&mut result, RunStage::Summarized, &closing);

        tracing::info!("{}", result.summary_line());
        result
    }

    /// Page through the source and classify everything. Stops at the first
    /// failed page.
    fn scan(
        &self,
        scope: &TagScope,
        now: DateTime<Utc>,
        result: &mut RunResult,
    ) -> Result<(), SourceError> {
        let classifier = Classifier::new(self.config.thresholds())
            .with_fallback_owner(self.config.owner_contact.clone());

        for page in pages(self.source, scope) {
            for resource in page?.resources {
                result.record_classified(&classifier.classify_resource(now, &resource));
            }
        }

        tracing::info!(
            checked = result.checked,
            expiring_soon = result.expiring_soon.len(),
            expired = result.expired.len(),
            "scan complete"
        );
        Ok(())
    }

    fn handle_expiring(&self, emitter: &SummaryEmitter, result: &mut RunResult, now: DateTime<Utc>) {
        if result.expiring_soon.is_empty() {
            return;
        }
        result.warned = result.expiring_soon.len();
        let event = emitter.expiration_warning(result, now);
        self.notify(result, RunStage::Disposing, &event);
    }

    fn handle_expired(&self, emitter: &SummaryEmitter, result: &mut RunResult, now: DateTime<Utc>) {
        if result.expired.is_empty() {
            return;
        }

        if self.config.auto_termination {
            tracing::info!(
                count = result.expired.len(),
                backend = self.dispatcher.backend(),
                "disposing of expired resources"
            );
            let attempts = self.dispatcher.dispose_batch(&result.expired);
            result.record_dispositions(attempts);
        } else {
            tracing::info!(
                count = result.expired.len(),
                "auto-termination disabled, alerting for manual action"
            );
            let event = emitter.expiration_alert(result, now);
            self.notify(result, RunStage::Disposing, &event);
        }
    }

    fn notify(&self, result: &mut RunResult, stage: RunStage, event: &GovernanceEvent) {
        for failure in self.notifier.dispatch(event) {
            result.record_error(
                stage,
                format!(
                    "failed to send {} via {}: {}",
                    event.event_type(),
                    failure.sink,
                    failure.error
                ),
            );
        }
    }

    fn step(&self, result: &mut RunResult, next: RunState) {
        if let Err(e) = result.advance(next) {
            tracing::warn!(run_id = %result.run_id, "{}", e);
        }
    }
}
