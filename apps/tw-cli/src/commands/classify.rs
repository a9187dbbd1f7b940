// classify.rs — Classify a snapshot without side effects.

use std::path::Path;

use tw_lifecycle::{pages, Classifier};
use tw_run::GovernanceConfig;

use crate::commands::parse_now;
use crate::snapshot::Snapshot;

pub fn execute(config: &GovernanceConfig, snapshot: &Path, now: Option<&str>) -> anyhow::Result<()> {
    let now = parse_now(now)?;
    let snapshot = Snapshot::load(snapshot)?;
    let source = snapshot.tag_source();
    let scope = config.scope();
    let classifier =
        Classifier::new(config.thresholds()).with_fallback_owner(config.owner_contact.clone());

    let mut count = 0;
    for page in pages(&source, &scope) {
        for resource in page?.resources {
            let classified = classifier.classify_resource(now, &resource);
            let days = classified
                .state
                .detail()
                .map(|d| format!("{:>5}d", d.days_remaining()))
                .unwrap_or_else(|| "     -".to_string());
            println!(
                "{:<14} {} {}  owner={}",
                classified.state.to_string(),
                days,
                classified.resource_id,
                classified.owner.as_deref().unwrap_or("-")
            );
            count += 1;
        }
    }

    if count == 0 {
        println!("No resources in scope {}={}.", scope.key, scope.value);
    }
    Ok(())
}
