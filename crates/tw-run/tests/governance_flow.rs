// governance_flow.rs — End-to-end governance runs over in-memory collaborators.
//
// Each test drives a full GovernanceRun:
//
//   1. Static tag source with a mixed project scope
//   2. Classification against fixed thresholds at a fixed `now`
//   3. Disposition through the recording backend (JSONL action log)
//   4. Cost report from canned cost data
//   5. Notifications through the JSONL log sink
//
// VERIFY:
//   - Counters and lists match the scope
//   - Only supported, expired resources are disposed, in scan order
//   - One failing resource does not stop the batch
//   - The event log holds exactly the events the run should emit
//   - Enumeration failure zeroes the scan but still reports cost

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tempfile::tempdir;

use tw_cost::{ServiceCost, StaticCostExplorer};
use tw_disposition::{Dispatcher, DispositionOutcome, RecordingActions};
use tw_lifecycle::{SourceError, StaticTagSource, TaggedResource};
use tw_run::{
    EventDispatcher, GovernanceConfig, GovernanceRun, LogSink, RunStage, RunState,
};

const ACCOUNT: &str = "123456789012";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
}

fn arn(service: &str, path: &str) -> String {
    format!("arn:aws:{}:us-east-1:{}:{}", service, ACCOUNT, path)
}

fn resource(id: String, tags: &[(&str, &str)]) -> TaggedResource {
    let tags: HashMap<String, String> = tags
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    TaggedResource::new(id, tags)
}

/// A project scope with one resource per interesting case, over two pages.
fn scope_pages() -> Vec<Vec<TaggedResource>> {
    vec![
        vec![
            // Persistent: never touched.
            resource(
                arn("ec2", "instance/i-keep"),
                &[("Lifecycle", "persistent"), ("CreatedAt", "2020-01-01")],
            ),
            // Explicitly expired instance.
            resource(
                arn("ec2", "instance/i-old"),
                &[
                    ("Lifecycle", "temporary"),
                    ("ExpiresAt", "2025-06-01T00:00:00Z"),
                    ("Owner", "alice@example.com"),
                ],
            ),
            // Expired by age (90 days > 60).
            resource(
                arn("rds", "db:orders"),
                &[("Lifecycle", "temporary"), ("CreatedAt", "2025-03-17T12:00:00Z")],
            ),
            // Expiring in 5 days.
            resource(
                arn("elasticache", "cluster:sessions"),
                &[("Lifecycle", "temporary"), ("ExpiresAt", "2025-06-20T12:00:00Z")],
            ),
        ],
        vec![
            // Expired container service.
            resource(
                arn("ecs", "service/web/api"),
                &[("Lifecycle", "temporary"), ("ExpiresAt", "2025-05-01")],
            ),
            // Expired, but of an unsupported kind.
            resource(
                arn("s3", "scratch-bucket"),
                &[("Lifecycle", "temporary"), ("ExpiresAt", "2025-05-01")],
            ),
            // Temporary with no dates: stays active.
            resource(arn("ec2", "instance/i-new"), &[("Lifecycle", "temporary")]),
        ],
    ]
}

fn costs() -> StaticCostExplorer {
    StaticCostExplorer {
        costs: vec![
            ServiceCost::new("Amazon EC2", 120.0),
            ServiceCost::new("Amazon RDS", 60.0),
            ServiceCost::new("Amazon EC2", 20.0),
        ],
        forecast: Some(210.0),
        ..Default::default()
    }
}

fn read_jsonl(path: &Path) -> Vec<Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn event_types(events: &[Value]) -> Vec<String> {
    events
        .iter()
        .map(|e| e["event_type"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn auto_termination_run_disposes_supported_expired_resources() {
    let dir = tempdir().unwrap();
    let events_path = dir.path().join("events.jsonl");
    let actions_path = dir.path().join("actions.jsonl");

    let config = GovernanceConfig {
        project: "atlas".into(),
        environment: "dev".into(),
        auto_termination: true,
        owner_contact: Some("platform@example.com".into()),
        ..Default::default()
    };
    let source = StaticTagSource::new(scope_pages());
    let costs = costs();
    let actions = RecordingActions::new().with_log(&actions_path);
    let dispatcher = Dispatcher::new(Box::new(actions.clone()));
    let notifier = EventDispatcher::new().with_sink(Box::new(LogSink::new(&events_path)));

    let result =
        GovernanceRun::new(&config, &source, &costs, &dispatcher, &notifier).execute(now());

    // Counters.
    assert_eq!(result.checked, 7);
    assert_eq!(result.warned, 1);
    assert_eq!(result.terminated, 3);
    assert_eq!(result.expiring_soon.len(), 1);
    assert_eq!(result.expired.len(), 4);
    assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
    assert_eq!(result.notes.len(), 1);
    assert!(result.notes[0].contains("s3"));
    assert_eq!(result.state, RunState::Summarized);

    // Fallback owner applies only where no Owner tag exists.
    assert_eq!(result.expired[0].owner.as_deref(), Some("alice@example.com"));
    assert_eq!(result.expired[1].owner.as_deref(), Some("platform@example.com"));

    // Calls in scan order; the container service is scaled before deletion.
    assert_eq!(
        actions.action_names(),
        vec![
            "terminate_instance",
            "delete_db_instance",
            "scale_service",
            "delete_service",
        ]
    );
    let logged_actions = read_jsonl(&actions_path);
    assert_eq!(logged_actions.len(), 4);
    assert_eq!(logged_actions[1]["detail"], "skip_final_snapshot=true");
    assert_eq!(logged_actions[2]["target"], "web/api");

    assert!(matches!(
        result.disposition_of(&arn("s3", "scratch-bucket")),
        Some(DispositionOutcome::Skipped { .. })
    ));

    // Cost report.
    let report = result.cost_report.as_ref().unwrap();
    assert_eq!(report.total_cost, 200.0);
    assert_eq!(report.by_service["Amazon EC2"], 140.0);
    assert_eq!(report.budget_status.as_ref().unwrap().percentage_used, 100.0);

    // Events: warning, then summary. No manual alert in auto mode.
    let events = read_jsonl(&events_path);
    assert_eq!(event_types(&events), vec!["expiration_warning", "weekly_summary"]);
    let summary_body = events[1]["notice"]["body"].as_str().unwrap();
    assert!(summary_body.contains("Resources terminated: 3"));
    assert!(summary_body.contains("[TERMINATED]"));
    assert!(summary_body.contains("[UNSUPPORTED]"));
    assert!(summary_body.contains("Total spend: $200.00"));
}

#[test]
fn manual_run_alerts_and_leaves_resources_alone() {
    let dir = tempdir().unwrap();
    let events_path = dir.path().join("events.jsonl");

    let config = GovernanceConfig {
        project: "atlas".into(),
        ..Default::default()
    };
    let source = StaticTagSource::new(scope_pages());
    let costs = costs();
    let actions = RecordingActions::new();
    let dispatcher = Dispatcher::new(Box::new(actions.clone()));
    let notifier = EventDispatcher::new().with_sink(Box::new(LogSink::new(&events_path)));

    let result =
        GovernanceRun::new(&config, &source, &costs, &dispatcher, &notifier).execute(now());

    assert_eq!(result.terminated, 0);
    assert_eq!(result.expired.len(), 4);
    assert!(result.dispositions.is_empty());
    assert!(actions.calls().is_empty());

    let events = read_jsonl(&events_path);
    assert_eq!(
        event_types(&events),
        vec!["expiration_warning", "expiration_alert", "weekly_summary"]
    );
    assert_eq!(events[1]["resources"].as_array().unwrap().len(), 4);
    let alert_body = events[1]["notice"]["body"].as_str().unwrap();
    assert!(alert_body.contains("Days old: 90"));
    assert!(alert_body.contains("Auto-termination is DISABLED"));
}

#[test]
fn failed_action_is_isolated_to_its_resource() {
    let config = GovernanceConfig {
        auto_termination: true,
        ..Default::default()
    };
    let source = StaticTagSource::new(scope_pages());
    let costs = costs();
    let actions = RecordingActions::new().fail_on("scale_service", "web/api", "service draining");
    let dispatcher = Dispatcher::new(Box::new(actions.clone()));
    let notifier = EventDispatcher::new();

    let result =
        GovernanceRun::new(&config, &source, &costs, &dispatcher, &notifier).execute(now());

    assert_eq!(result.terminated, 2);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].stage, RunStage::Disposing);
    assert!(result.errors[0].message.contains("service draining"));
    // Failed scale-down means the delete was never attempted.
    assert!(!actions.action_names().contains(&"delete_service".to_string()));
    assert!(matches!(
        result.disposition_of(&arn("ecs", "service/web/api")),
        Some(DispositionOutcome::Failed { .. })
    ));
}

#[test]
fn enumeration_failure_reports_cost_and_sends_failure_notice() {
    let dir = tempdir().unwrap();
    let events_path = dir.path().join("events.jsonl");

    let config = GovernanceConfig {
        auto_termination: true,
        ..Default::default()
    };
    let source = StaticTagSource::new(scope_pages())
        .failing_at(1, SourceError::Timeout { seconds: 10 });
    let costs = costs();
    let actions = RecordingActions::new();
    let dispatcher = Dispatcher::new(Box::new(actions.clone()));
    let notifier = EventDispatcher::new().with_sink(Box::new(LogSink::new(&events_path)));

    let result =
        GovernanceRun::new(&config, &source, &costs, &dispatcher, &notifier).execute(now());

    assert_eq!(result.checked, 0);
    assert_eq!(result.warned, 0);
    assert_eq!(result.terminated, 0);
    assert!(result.expiring_soon.is_empty());
    assert!(result.expired.is_empty());
    assert!(actions.calls().is_empty());
    assert!(result.enumeration_failed());
    assert_eq!(result.cost_report.as_ref().unwrap().total_cost, 200.0);
    assert_eq!(result.state, RunState::Summarized);

    let events = read_jsonl(&events_path);
    assert_eq!(event_types(&events), vec!["run_failed"]);
    assert_eq!(events[0]["stage"], "scanning");
}

#[test]
fn cost_failure_is_recorded_but_run_completes() {
    let config = GovernanceConfig::default();
    let source = StaticTagSource::new(scope_pages());
    let costs = StaticCostExplorer {
        cost_error: Some("access denied".into()),
        ..Default::default()
    };
    let dispatcher = Dispatcher::new(Box::new(RecordingActions::new()));
    let notifier = EventDispatcher::new();

    let result =
        GovernanceRun::new(&config, &source, &costs, &dispatcher, &notifier).execute(now());

    assert_eq!(result.checked, 7);
    let report = result.cost_report.as_ref().unwrap();
    assert!(report.is_error());
    assert!(report.budget_status.is_none());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].stage, RunStage::Reporting);
    assert!(result.history.iter().any(|s| matches!(
        s,
        RunState::ErrorCaptured {
            stage: RunStage::Reporting,
            ..
        }
    )));
    assert_eq!(result.history.last(), Some(&RunState::Summarized));
}

#[test]
fn unwritable_sink_is_recorded_not_fatal() {
    let dir = tempdir().unwrap();
    // A directory where the log file should be: opening it for append fails.
    let blocked = dir.path().join("events.jsonl");
    fs::create_dir_all(&blocked).unwrap();

    let config = GovernanceConfig::default();
    let source = StaticTagSource::new(scope_pages());
    let costs = costs();
    let dispatcher = Dispatcher::new(Box::new(RecordingActions::new()));
    let notifier = EventDispatcher::new().with_sink(Box::new(LogSink::new(&blocked)));

    let result =
        GovernanceRun::new(&config, &source, &costs, &dispatcher, &notifier).execute(now());

    // warning + alert + summary all failed to deliver.
    assert_eq!(result.errors.len(), 3);
    assert_eq!(result.warned, 1);
    assert_eq!(result.state, RunState::Summarized);
    assert!(result.errors.iter().all(|e| e.message.contains("via log")));
}
