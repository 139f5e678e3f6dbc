use std::collections::BTreeMap;

use docform_core::{EditError, EditSession, Path, ValueChange};
use serde_json::json;

fn manifest() -> serde_json::Value {
    json!({
        "name": "project-board",
        "version": "0.3.1",
        "private": true,
        "workers": 4,
        "dependencies": { "solid-js": "^1.8.0", "video.js": "^8.6.0" },
        "files": ["dist", "README.md"],
        "homepage": null
    })
}

#[test]
fn get_returns_values_from_loaded_document() {
    let doc = manifest();
    let s = EditSession::load(&doc);
    assert_eq!(s.get(&Path::from(["name"])).unwrap(), &json!("project-board"));
    assert_eq!(
        s.get(&Path::from(["dependencies", "solid-js"])).unwrap(),
        &json!("^1.8.0")
    );
    assert_eq!(s.get(&Path::from(["files", "1"])).unwrap(), &json!("README.md"));
    assert!(matches!(
        s.get(&Path::from(["name", "first"])),
        Err(EditError::PathNotFound { .. })
    ));
}

#[test]
fn commit_coerces_to_original_type() {
    let s = EditSession::load(&manifest());
    let s = s.commit(&Path::from(["workers"]), "8").unwrap();
    let s = s.commit(&Path::from(["private"]), "False").unwrap();
    let s = s.commit(&Path::from(["version"]), "0.4.0").unwrap();
    let s = s.commit(&Path::from(["homepage"]), "https://example.org").unwrap();
    assert_eq!(s.get(&Path::from(["workers"])).unwrap(), &json!(8));
    assert_eq!(s.get(&Path::from(["private"])).unwrap(), &json!(false));
    assert_eq!(s.get(&Path::from(["version"])).unwrap(), &json!("0.4.0"));
    assert_eq!(s.get(&Path::from(["homepage"])).unwrap(), &json!("https://example.org"));

    let bad = s.commit(&Path::from(["workers"]), "lots").unwrap();
    assert_eq!(bad.get(&Path::from(["workers"])).unwrap(), &json!(8));
}

#[test]
fn commit_is_idempotent() {
    let s = EditSession::load(&manifest());
    let p = Path::from(["dependencies", "solid-js"]);
    let once = s.commit(&p, "^1.9.0").unwrap();
    let twice = once.commit(&p, "^1.9.0").unwrap();
    assert_eq!(once.working(), twice.working());

    let n = Path::from(["workers"]);
    let once = s.commit(&n, "12").unwrap();
    let twice = once.commit(&n, "12").unwrap();
    assert_eq!(once.working(), twice.working());

    let fresh = Path::from(["scripts", "dev"]);
    let once = s.commit(&fresh, "vite").unwrap();
    let twice = once.commit(&fresh, "vite").unwrap();
    assert_eq!(once.working(), twice.working());
}

#[test]
fn commit_vivifies_missing_paths() {
    let s = EditSession::load(&json!({}));
    let s = s.commit(&Path::from(["a", "b", "c"]), "x").unwrap();
    assert_eq!(s.working(), &json!({"a": {"b": {"c": "x"}}}));
}

#[test]
fn commit_leaves_caller_value_and_prior_session_untouched() {
    let doc = manifest();
    let snapshot = doc.clone();
    let s0 = EditSession::load(&doc);
    let s1 = s0.commit(&Path::from(["name"]), "renamed").unwrap();
    assert_eq!(doc, snapshot);
    assert_eq!(s0.working(), &snapshot);
    assert!(!s0.is_dirty());
    assert!(s1.is_dirty());
    assert_eq!(s1.original(), &snapshot);
    assert_eq!(s1.get(&Path::from(["name"])).unwrap(), &json!("renamed"));
}

#[test]
fn failed_commit_reports_invalid_path() {
    let s = EditSession::load(&manifest());
    assert!(matches!(
        s.commit(&Path::root(), "x"),
        Err(EditError::InvalidPath(_))
    ));
    let scalar = EditSession::load(&json!("just text"));
    assert_eq!(scalar.get(&Path::root()).unwrap(), &json!("just text"));
    assert!(matches!(
        scalar.commit(&Path::from(["a"]), "x"),
        Err(EditError::InvalidPath(_))
    ));
    assert!(scalar.changes().is_empty());
}

#[test]
fn untouched_round_trip_preserves_key_order() {
    let text = r#"{"zeta":1,"alpha":{"y":2,"x":3},"mid":[true,null]}"#;
    let s = EditSession::from_json_str(text).unwrap();
    assert_eq!(serde_json::to_string(s.working()).unwrap(), text);
    assert!(s.diff().is_empty());
    assert_eq!(s.into_working(), serde_json::from_str::<serde_json::Value>(text).unwrap());
}

#[test]
fn diff_reports_committed_paths() {
    let s = EditSession::load(&manifest())
        .commit(&Path::from(["workers"]), "6")
        .unwrap()
        .commit(&Path::from(["files", "0"]), "build")
        .unwrap()
        .commit(&Path::from(["scripts", "dev"]), "vite")
        .unwrap();
    let d = s.diff();
    let mut expected = BTreeMap::new();
    expected.insert(
        Path::from(["workers"]),
        ValueChange { before: Some(json!(4)), after: Some(json!(6)) },
    );
    expected.insert(
        Path::from(["files", "0"]),
        ValueChange { before: Some(json!("dist")), after: Some(json!("build")) },
    );
    expected.insert(
        Path::from(["scripts"]),
        ValueChange { before: None, after: Some(json!({"dev": "vite"})) },
    );
    assert_eq!(d, expected);
}

#[test]
fn diff_values_handles_removals_and_type_changes() {
    let d = docform_core::diff_values(&json!({"a": 1, "b": [1, 2], "c": "x"}), &json!({"a": "1", "b": [1]}));
    assert_eq!(d.len(), 3);
    assert_eq!(d[&Path::from(["a"])].after, Some(json!("1")));
    assert_eq!(d[&Path::from(["b", "1"])], ValueChange { before: Some(json!(2)), after: None });
    assert_eq!(d[&Path::from(["c"])].after, None);
}

#[test]
fn reset_restores_original_and_clears_log() {
    let s = EditSession::load(&manifest())
        .commit(&Path::from(["name"]), "other")
        .unwrap();
    assert_eq!(s.changes().len(), 1);
    assert_eq!(s.changes()[0].before, Some(json!("project-board")));
    assert_eq!(s.changes()[0].after, json!("other"));
    let r = s.reset();
    assert_eq!(r.working(), &manifest());
    assert!(!r.is_dirty());
    assert!(r.changes().is_empty());
}

#[test]
fn change_log_records_absent_before_for_new_paths() {
    let s = EditSession::load(&json!({"a": 1}))
        .commit(&Path::from(["b"]), "new")
        .unwrap();
    let rec = &s.changes()[0];
    assert_eq!(rec.path, Path::from(["b"]));
    assert_eq!(rec.before, None);
    assert_eq!(rec.after, json!("new"));
}

#[test]
fn commit_value_assigns_typed_json() {
    let s = EditSession::load(&manifest())
        .commit_value(&Path::from(["dependencies", "rxjs"]), json!({"version": "7"}))
        .unwrap();
    assert_eq!(
        s.get(&Path::from(["dependencies", "rxjs", "version"])).unwrap(),
        &json!("7")
    );
}

#[test]
fn from_serialize_rejects_non_string_keys() {
    #[derive(serde::Serialize)]
    struct Board {
        title: String,
        columns: Vec<String>,
    }
    let s = EditSession::from_serialize(&Board {
        title: "Sprint".into(),
        columns: vec!["todo".into(), "done".into()],
    })
    .unwrap();
    assert_eq!(s.get(&Path::from(["columns", "1"])).unwrap(), &json!("done"));

    let mut odd: BTreeMap<(u8, u8), u8> = BTreeMap::new();
    odd.insert((1, 2), 3);
    assert!(matches!(
        EditSession::from_serialize(&odd),
        Err(EditError::InvalidDocument(_))
    ));
    assert!(matches!(
        EditSession::from_json_str("{not json"),
        Err(EditError::InvalidDocument(_))
    ));
}

#[test]
fn only_mapping_roots_are_writable() {
    assert!(EditSession::load(&manifest()).is_writable());
    assert!(EditSession::load(&json!({})).is_writable());

    for root in [json!([1, "a"]), json!("text"), json!(null)] {
        let s = EditSession::load(&root);
        assert!(!s.is_writable());
        assert!(matches!(
            s.commit(&Path::from(["0"]), "x"),
            Err(EditError::InvalidPath(_))
        ));
        assert_eq!(s.working(), &root);
        assert!(!s.is_dirty());
    }
}
