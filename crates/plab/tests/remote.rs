use std::cell::RefCell;

use anyhow::{Result, anyhow};
use assert_fs::TempDir;
use plab::{Category, ExperimentSource, LabError, OpenMode};
use plab_sav::{ExperimentType, SaveDocument};
use serde_json::{Value, json};

mod helpers;
use helpers::*;

/// Serves one published experiment and records what was asked for.
struct FakeSource {
    experiment: Value,
    /// `ContentID` the summary reports; the requested id when unset.
    resolved_id: Option<String>,
    calls: RefCell<Vec<String>>,
}

impl FakeSource {
    fn new(experiment_type: ExperimentType) -> Self {
        let mut doc = SaveDocument::new(experiment_type);
        doc.entitle("Published");
        let mut root = doc.into_value();
        let mut experiment = root["Experiment"].take();
        experiment["$type"] = "Quantum.Models.Experiment".into();
        Self {
            experiment,
            resolved_id: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    fn resolving_to(mut self, id: &str) -> Self {
        self.resolved_id = Some(id.to_string());
        self
    }
}

impl ExperimentSource for FakeSource {
    fn get_summary(&self, content_id: &str, category: Category) -> Result<Value> {
        self.calls
            .borrow_mut()
            .push(format!("summary {category} {content_id}"));
        Ok(json!({
            "Data": {
                "$type": "Quantum.Models.Summary",
                "ContentID": self.resolved_id.as_deref().unwrap_or(content_id),
                "Subject": "Published"
            }
        }))
    }

    fn get_experiment(&self, content_id: &str) -> Result<Value> {
        self.calls
            .borrow_mut()
            .push(format!("experiment {content_id}"));
        Ok(json!({ "Data": self.experiment }))
    }
}

struct DownSource;

impl ExperimentSource for DownSource {
    fn get_summary(&self, _: &str, _: Category) -> Result<Value> {
        Err(anyhow!("connection refused"))
    }

    fn get_experiment(&self, _: &str) -> Result<Value> {
        Err(anyhow!("connection refused"))
    }
}

#[test]
fn remote_experiment_is_saved_under_content_id() -> Result<()> {
    let temp = TempDir::new()?;
    let lab = lab_in(&temp);
    let source = FakeSource::new(ExperimentType::Electromagnetism);

    let mut exp = lab.open(OpenMode::LoadRemote {
        content_id: "642cf37a494746375aae306a".into(),
        category: Category::Discussion,
        source: &source,
    })?;
    assert_eq!(
        source.calls.borrow().as_slice(),
        &[
            "summary Discussion 642cf37a494746375aae306a",
            "experiment 642cf37a494746375aae306a"
        ]
    );
    assert_eq!(exp.experiment_type(), ExperimentType::Electromagnetism);
    assert_eq!(
        exp.path(),
        lab.config().sav_dir.join("642cf37a494746375aae306a.sav")
    );

    let summary = exp.document().summary().unwrap();
    assert_eq!(summary["ContentID"], "642cf37a494746375aae306a");
    assert!(!summary.contains_key("$type"));

    exp.create_element("Bar Magnet", 0.0, 0.0, 0.0)?;
    exp.save(None)?;
    assert_eq!(
        sav_files(&lab.config().sav_dir),
        vec![exp.path().to_path_buf()]
    );
    Ok(())
}

#[test]
fn discussion_ids_fetch_the_experiment_the_summary_names() -> Result<()> {
    let temp = TempDir::new()?;
    let lab = lab_in(&temp);
    let source = FakeSource::new(ExperimentType::Circuit).resolving_to("5f1e0c3aa1b2c3d4e5f60718");

    let exp = lab.open(OpenMode::LoadRemote {
        content_id: "discussion-post".into(),
        category: Category::Discussion,
        source: &source,
    })?;
    assert_eq!(
        source.calls.borrow().as_slice(),
        &[
            "summary Discussion discussion-post",
            "experiment 5f1e0c3aa1b2c3d4e5f60718"
        ]
    );
    assert_eq!(
        exp.path().file_name().and_then(|n| n.to_str()),
        Some("discussion-post.sav")
    );
    assert_eq!(
        exp.document().summary().unwrap()["ContentID"],
        "5f1e0c3aa1b2c3d4e5f60718"
    );
    Ok(())
}

#[test]
fn open_remote_target_is_rejected_before_fetching() -> Result<()> {
    let temp = TempDir::new()?;
    let lab = lab_in(&temp);
    let source = FakeSource::new(ExperimentType::Celestial);

    let _first = lab.open(OpenMode::LoadRemote {
        content_id: "already-here".into(),
        category: Category::Experiment,
        source: &source,
    })?;
    source.calls.borrow_mut().clear();

    let err = lab
        .open(OpenMode::LoadRemote {
            content_id: "already-here".into(),
            category: Category::Experiment,
            source: &source,
        })
        .err()
        .unwrap();
    assert!(matches!(err, LabError::AlreadyOpen(ref p) if p.ends_with("already-here.sav")));
    assert!(source.calls.borrow().is_empty());
    assert_eq!(lab.stack().len(), 1);
    Ok(())
}

#[test]
fn remote_failures_propagate() -> Result<()> {
    let temp = TempDir::new()?;
    let lab = lab_in(&temp);

    let err = lab
        .open(OpenMode::LoadRemote {
            content_id: "abc".into(),
            category: Category::Experiment,
            source: &DownSource,
        })
        .err()
        .unwrap();
    assert!(matches!(err, LabError::Remote(_)));
    assert!(err.to_string().contains("connection refused"));
    assert!(lab.stack().is_empty());
    Ok(())
}
