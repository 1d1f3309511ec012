use prefbind::{
    binder::shared,
    error::{BindError, StoreError},
    store::PreferenceStore,
};
use prefbind_tests::schema::{
    layout::{Layout, LayoutPreferences, Theme, Window},
    profile::{Profile, ProfilePreferences},
};
use std::fs;
use tempfile::tempdir;

#[test]
fn preferences_survive_reopening_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("prefs").join("settings.json");

    {
        let store = PreferenceStore::open(&path).unwrap();
        let target = shared(Profile {
            score: 12,
            name: "kim".to_string(),
            ..Profile::default()
        });
        ProfilePreferences::write(&target, &store).unwrap();
    }

    let store = PreferenceStore::open(&path).unwrap();
    let target = shared(Profile::default());
    ProfilePreferences::read(&target, &store).unwrap();

    let profile = target.lock();
    assert_eq!(profile.score, 12);
    assert_eq!(profile.name, "kim");
    assert!(!store.contains("nickname").unwrap());
}

#[test]
fn non_finite_fields_are_refused_by_the_file_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    let store = PreferenceStore::open(&path).unwrap();
    store.put("ratio", 0.75f32).unwrap();
    let target = shared(Profile {
        ratio: f32::INFINITY,
        ..Profile::default()
    });

    let err = ProfilePreferences::bind(&target, &store)
        .write_ratio()
        .unwrap_err();

    assert!(matches!(
        err,
        BindError::Store(StoreError::UnsupportedKind { ref key, .. }) if key == "ratio"
    ));
    let reopened = PreferenceStore::open(&path).unwrap();
    assert_eq!(reopened.get("ratio", 0.0f32).unwrap(), 0.75);
}

#[test]
fn transformed_values_are_stored_as_their_native_kind() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("layout.json");
    let store = PreferenceStore::open(&path).unwrap();
    let target = shared(Layout {
        window: Window {
            width: 1,
            height: 2,
        },
        theme: Theme::Dark,
    });

    LayoutPreferences::write(&target, &store).unwrap();

    let json: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(json["theme"]["type"], "Integer");
    assert_eq!(json["theme"]["value"], 1);
    assert_eq!(json["window"]["type"], "String");
}

#[test]
fn hand_edited_entries_fail_only_when_read() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    fs::write(
        &path,
        r#"{"score":{"type":"Integer","value":3},"userName":[1,2]}"#,
    )
    .unwrap();

    let store = PreferenceStore::open(&path).unwrap();
    assert_eq!(store.get("score", 0i32).unwrap(), 3);

    let err = store.get("userName", String::new()).unwrap_err();
    assert!(matches!(err, StoreError::UnsupportedKind { ref found, .. } if found == "array"));
}
