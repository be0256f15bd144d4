//! Boundary to the community server that hosts published experiments.
//!
//! This crate does not talk to the network itself. Callers plug in an
//! [`ExperimentSource`] (an HTTP client, a cache, a test fake) and the lab
//! turns its responses into save documents.

use std::fmt;

use anyhow::Context;
use plab_sav::SaveDocument;
use serde_json::Value;

use crate::error::{LabError, Result};

/// Section of the community a published piece of content lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Category {
    #[default]
    Experiment,
    Discussion,
}

impl Category {
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Experiment => "Experiment",
            Category::Discussion => "Discussion",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fetches published experiments.
///
/// Both calls return the raw API response; the payload is under `Data`.
pub trait ExperimentSource {
    fn get_summary(&self, content_id: &str, category: Category) -> anyhow::Result<Value>;

    fn get_experiment(&self, content_id: &str) -> anyhow::Result<Value>;
}

fn data(mut response: Value, what: &str) -> anyhow::Result<Value> {
    response
        .get_mut("Data")
        .map(Value::take)
        .filter(Value::is_object)
        .with_context(|| format!("{what} response has no 'Data' object"))
}

/// Download a published experiment and build a save document from it.
///
/// The experiment body is requested under the `ContentID` the summary
/// reports, which differs from `content_id` for discussion posts.
pub fn fetch_document(
    source: &dyn ExperimentSource,
    content_id: &str,
    category: Category,
) -> Result<SaveDocument> {
    log::info!("Fetching {category} {content_id}");
    let summary = source
        .get_summary(content_id, category)
        .and_then(|r| data(r, "summary"))
        .map_err(LabError::Remote)?;
    let experiment_id = summary
        .get("ContentID")
        .and_then(Value::as_str)
        .unwrap_or(content_id)
        .to_string();
    if experiment_id != content_id {
        log::debug!("{content_id} resolves to experiment {experiment_id}");
    }
    let experiment = source
        .get_experiment(&experiment_id)
        .and_then(|r| data(r, "experiment"))
        .map_err(LabError::Remote)?;
    Ok(SaveDocument::from_remote(summary, experiment)?)
}
