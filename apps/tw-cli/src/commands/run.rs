// run.rs — Execute one governance run against a snapshot.

use std::path::Path;

use tw_disposition::{Dispatcher, RecordingActions};
use tw_run::{EventDispatcher, GovernanceConfig, GovernanceRun, LogSink, WebhookSink};

use crate::commands::parse_now;
use crate::snapshot::Snapshot;

pub fn execute(
    config: &GovernanceConfig,
    snapshot: &Path,
    now: Option<&str>,
    events_log: Option<&Path>,
    actions_log: Option<&Path>,
) -> anyhow::Result<()> {
    let now = parse_now(now)?;
    let snapshot = Snapshot::load(snapshot)?;
    let source = snapshot.tag_source();
    let costs = snapshot.cost_explorer();

    // Dispositions are recorded, never sent to a provider.
    let mut actions = RecordingActions::new();
    if let Some(path) = actions_log {
        actions = actions.with_log(path);
    }
    let dispatcher = Dispatcher::new(Box::new(actions));

    let mut notifier = EventDispatcher::new();
    if let Some(path) = events_log {
        notifier.add_sink(Box::new(LogSink::new(path)));
    }
    if let Some(url) = &config.webhook_url {
        notifier.add_sink(Box::new(WebhookSink::new(url.clone(), config.call_timeout())?));
    }

    let result = GovernanceRun::new(config, &source, &costs, &dispatcher, &notifier).execute(now);

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
