//! Blank save documents and element skeletons for each experiment type.
//!
//! Templates are built fresh on every call, so callers may mutate the result
//! freely.

use serde_json::{json, Map, Value};

use crate::ExperimentType;

fn summary(experiment_type: ExperimentType) -> Value {
    json!({
        "Type": experiment_type.code(),
        "ParentID": null,
        "ParentName": null,
        "ParentCategory": null,
        "ContentID": null,
        "Editor": null,
        "Coauthors": [],
        "Description": null,
        "LocalizedDescription": null,
        "Tags": [format!("Type-{}", experiment_type.code())],
        "ModelID": null,
        "ModelName": null,
        "ModelTags": [],
        "Version": 0,
        "Language": null,
        "Visits": 0,
        "Stars": 0,
        "Supports": 0,
        "Remixes": 0,
        "Comments": 0,
        "Price": 0,
        "Popularity": 0,
        "CreationDate": 0,
        "UpdateDate": 0,
        "SortingDate": 0,
        "ID": null,
        "Category": null,
        "Subject": null,
        "LocalizedSubject": null,
        "Image": 0,
        "ImageRegion": 0,
        "User": {
            "ID": null,
            "Nickname": null,
            "Signature": null,
            "Avatar": 0,
            "AvatarRegion": 0,
            "Decoration": 0,
            "Verification": null
        },
        "Visibility": 0,
        "Settings": {},
        "Multilingual": false
    })
}

/// `StatusSave` of an experiment with no elements.
pub fn empty_status(experiment_type: ExperimentType) -> Value {
    match experiment_type {
        ExperimentType::Circuit => json!({
            "SimulationSpeed": 1.0,
            "Elements": [],
            "Wires": []
        }),
        ExperimentType::Celestial => json!({
            "MainIdentifier": null,
            "Elements": {},
            "WorldTime": 0.0,
            "ScalingName": "内太阳系",
            "LengthScale": 1.0,
            "SizeLinked": true,
            "KeepLanes": false,
            "SimulationSpeed": 1.0,
            "SimulationTarget": null,
            "TrailStyle": "默认",
            "TrailLength": 1.0
        }),
        ExperimentType::Electromagnetism => json!({
            "SimulationSpeed": 1.0,
            "Elements": []
        }),
    }
}

/// Complete blank save document.
///
/// `StatusSave` and `CameraSave` hold embedded JSON strings, as in real saves.
pub fn document(experiment_type: ExperimentType) -> Value {
    let code = experiment_type.code();
    let camera = serde_json::to_string(&crate::Camera::default_for(experiment_type))
        .unwrap_or_default();
    json!({
        "Type": code,
        "Experiment": {
            "ID": null,
            "Type": code,
            "Components": 0,
            "Subject": null,
            "StatusSave": empty_status(experiment_type).to_string(),
            "CameraSave": camera,
            "Version": 2405,
            "CreationDate": 0,
            "Paused": false,
            "Summary": null,
            "Plots": null
        },
        "ID": null,
        "Summary": summary(experiment_type),
        "CreationDate": 0,
        "InternalName": null,
        "Speed": 1.0,
        "SpeedMinimum": 0.0002,
        "SpeedMaximum": 2.0,
        "SpeedReal": 0.0,
        "Paused": false,
        "Version": 0,
        "CameraSnapshot": null,
        "Plots": [],
        "Widgets": [],
        "WidgetGroups": [],
        "Bookmarks": {},
        "Interfaces": {
            "Play-Expanded": false,
            "Chart-Expanded": false
        }
    })
}

/// Template `Summary` region, used when a loaded document has a null one.
pub fn default_summary(experiment_type: ExperimentType) -> Value {
    summary(experiment_type)
}

/// Object a new element starts from, minus the fields [`crate::Element`] models.
pub fn element_skeleton(experiment_type: ExperimentType) -> Map<String, Value> {
    let value = match experiment_type {
        ExperimentType::Circuit => json!({
            "ModelID": null,
            "Identifier": null,
            "IsBroken": false,
            "IsLocked": false,
            "Properties": {},
            "Statistics": {},
            "Position": null,
            "Rotation": null,
            "DiagramCached": false,
            "DiagramPosition": {"X": 0, "Y": 0, "Magnitude": 0.0},
            "DiagramRotation": 0
        }),
        ExperimentType::Celestial => json!({
            "Model": null,
            "Identifier": null,
            "Position": null,
            "Velocity": "0,0,0",
            "Acceleration": "0,0,0",
            "Mass": 1.0,
            "Radius": 1.0,
            "Lifespan": 0.0,
            "Trail": null,
            "Unstable": false
        }),
        ExperimentType::Electromagnetism => json!({
            "ModelID": null,
            "Identifier": null,
            "IsBroken": false,
            "IsLocked": false,
            "Properties": {},
            "Statistics": {},
            "Position": null,
            "Rotation": null,
            "Velocity": "0,0,0",
            "AngularVelocity": "0,0,0",
            "Magnitude": 0.0
        }),
    };
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
