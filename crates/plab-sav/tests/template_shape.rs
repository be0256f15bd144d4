//! Key shape of encoded documents: one line per key path with the kind of
//! value found there. Encoding must keep every path of the blank template.

use std::collections::BTreeSet;

use plab_sav::{
    Catalogue, CoordinateMode, ExperimentGraph, ExperimentType, Pin, SaveDocument, WireColor,
};
use serde_json::Value;

const EMBEDDED: [&str; 2] = ["StatusSave", "CameraSave"];

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn walk(path: String, key: &str, value: &Value, lines: &mut BTreeSet<String>) {
    if EMBEDDED.contains(&key) {
        if let Some(inner) = value
            .as_str()
            .and_then(|text| serde_json::from_str::<Value>(text).ok())
        {
            lines.insert(format!("{path}: embedded {}", kind(&inner)));
            descend(&path, key, &inner, lines);
            return;
        }
    }
    lines.insert(format!("{path}: {}", kind(value)));
    descend(&path, key, value, lines);
}

fn descend(path: &str, key: &str, value: &Value, lines: &mut BTreeSet<String>) {
    match value {
        // Model specific.
        Value::Object(_) if key == "Properties" => {}
        Value::Object(map) => {
            for (child_key, child) in map {
                // Celestial bodies are keyed by their identifier.
                let name = if key == "Elements" { "*" } else { child_key.as_str() };
                walk(format!("{path}.{name}"), child_key, child, lines);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(format!("{path}[]"), "", item, lines);
            }
        }
        _ => {}
    }
}

fn shape(value: &Value) -> String {
    let mut lines = BTreeSet::new();
    walk("$".to_string(), "", value, &mut lines);
    lines.into_iter().collect::<Vec<_>>().join("\n")
}

fn encoded(experiment_type: ExperimentType, build: impl FnOnce(&mut ExperimentGraph)) -> String {
    let mut graph = ExperimentGraph::new(experiment_type);
    build(&mut graph);
    let mut doc = SaveDocument::new(experiment_type);
    doc.encode(&graph).unwrap();

    let result = shape(&doc.into_value());
    let lines: BTreeSet<&str> = result.lines().collect();
    let template = shape(&SaveDocument::new(experiment_type).into_value());
    for line in template.lines() {
        assert!(
            lines.contains(line),
            "encoding a {experiment_type} experiment dropped `{line}`"
        );
    }
    result
}

#[test]
fn circuit_shape() {
    let catalogue = Catalogue::builtin();
    let shape = encoded(ExperimentType::Circuit, |graph| {
        let a = graph
            .create_element(catalogue, "Logic Input", 0.0, 0.0, 0.0, CoordinateMode::Native)
            .unwrap();
        let b = graph
            .create_element(catalogue, "Logic Output", 0.15, 0.0, 0.0, CoordinateMode::Native)
            .unwrap();
        graph
            .connect(Pin::new(a, 0), Pin::new(b, 0), WireColor::Blue)
            .unwrap();
    });
    insta::assert_snapshot!("circuit", shape);
}

#[test]
fn celestial_shape() {
    let catalogue = Catalogue::builtin();
    let shape = encoded(ExperimentType::Celestial, |graph| {
        graph
            .create_element(catalogue, "Sun", 0.0, 0.0, 0.0, CoordinateMode::Native)
            .unwrap();
        graph
            .create_element(catalogue, "Earth", 1.0, 0.0, 0.0, CoordinateMode::Native)
            .unwrap();
    });
    insta::assert_snapshot!("celestial", shape);
}

#[test]
fn electromagnetism_shape() {
    let catalogue = Catalogue::builtin();
    let shape = encoded(ExperimentType::Electromagnetism, |graph| {
        graph
            .create_element(catalogue, "Positive Charge", 0.0, 0.0, 0.0, CoordinateMode::Native)
            .unwrap();
        graph
            .create_element(catalogue, "Bar Magnet", 0.5, 0.0, 0.0, CoordinateMode::Native)
            .unwrap();
    });
    insta::assert_snapshot!("electromagnetism", shape);
}
