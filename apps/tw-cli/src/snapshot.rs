// snapshot.rs — Replayable snapshot of a project scope.
//
// A snapshot is what the external services would have answered for one
// run: the tag enumeration pages plus the cost and forecast figures. It lets
// a run be replayed offline, byte for byte.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tw_cost::{ServiceCost, StaticCostExplorer};
use tw_lifecycle::{SourceError, StaticTagSource, TaggedResource};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Tag enumeration pages, in order.
    #[serde(default)]
    pub pages: Vec<Vec<TaggedResource>>,
    #[serde(default)]
    pub costs: Vec<ServiceCost>,
    #[serde(default)]
    pub forecast: Option<f64>,
    #[serde(default)]
    pub cost_error: Option<String>,
    #[serde(default)]
    pub forecast_error: Option<String>,
    /// When set, enumeration fails on the first page with this message.
    #[serde(default)]
    pub enumeration_error: Option<String>,
}

impl Snapshot {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("invalid snapshot {}", path.display()))
    }

    pub fn tag_source(&self) -> StaticTagSource {
        let source = StaticTagSource::new(self.pages.clone());
        match &self.enumeration_error {
            Some(message) => source.failing_at(0, SourceError::Unavailable(message.clone())),
            None => source,
        }
    }

    pub fn cost_explorer(&self) -> StaticCostExplorer {
        StaticCostExplorer {
            costs: self.costs.clone(),
            forecast: self.forecast,
            cost_error: self.cost_error.clone(),
            forecast_error: self.forecast_error.clone(),
        }
    }
}
