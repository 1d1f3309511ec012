use prefbind::{
    binder::{PreferenceBinder, shared},
    error::{BindError, StoreError},
    kind::StorageKind,
    store::PreferenceStore,
    value::PrefValue,
};
use prefbind_tests::schema::{
    audio::{Audio, AudioPreferences},
    layout::{Layout, LayoutPreferences, Theme, Window},
    profile::{Profile, ProfilePreferences},
};

#[test]
fn key_constants_follow_configuration() {
    assert_eq!(ProfilePreferences::SCORE_KEY, "score");
    assert_eq!(ProfilePreferences::NAME_KEY, "userName");
    assert_eq!(ProfilePreferences::LAST_SEEN_KEY, "last_seen");
    assert_eq!(ProfilePreferences::DARK_MODE_KEY, "darkMode");
    assert_eq!(AudioPreferences::VOLUME_KEY, "volume");
}

#[test]
fn read_falls_back_to_configured_defaults() {
    let store = PreferenceStore::in_memory();
    let target = shared(Profile::default());

    ProfilePreferences::read(&target, &store).unwrap();

    let profile = target.lock();
    assert_eq!(profile.score, 10);
    assert_eq!(profile.name, "");
    assert_eq!(profile.last_seen, -1);
    assert!((profile.ratio - 0.5).abs() < f32::EPSILON);
    assert!(profile.dark_mode);
    assert_eq!(profile.nickname.as_deref(), Some(""));
}

#[test]
fn cleared_store_restores_the_default() {
    let store = PreferenceStore::in_memory();
    let target = shared(Profile::default());
    let binder = ProfilePreferences::bind(&target, &store);

    target.lock().score = 5;
    binder.write_all().unwrap();
    assert_eq!(store.get(ProfilePreferences::SCORE_KEY, 0i32).unwrap(), 5);

    store.clear().unwrap();
    binder.read_all().unwrap();

    assert_eq!(target.lock().score, 10);
}

#[test]
fn write_puts_every_field_under_its_key() {
    let store = PreferenceStore::in_memory();
    let target = shared(Profile {
        score: 3,
        name: "ann".to_string(),
        last_seen: 99,
        dark_mode: false,
        nickname: Some("a".to_string()),
        ..Profile::default()
    });

    ProfilePreferences::write(&target, &store).unwrap();

    let all = store.get_all().unwrap();
    assert_eq!(all.get("score"), Some(&PrefValue::Integer(3)));
    assert_eq!(all.get("userName"), Some(&PrefValue::String("ann".to_string())));
    assert_eq!(all.get("last_seen"), Some(&PrefValue::Long(99)));
    assert_eq!(all.get("darkMode"), Some(&PrefValue::Boolean(false)));
    assert_eq!(all.get("nickname"), Some(&PrefValue::String("a".to_string())));
}

#[test]
fn absent_optional_value_removes_its_key() {
    let store = PreferenceStore::in_memory();
    store.put("nickname", "old".to_string()).unwrap();
    let target = shared(Profile {
        score: 12,
        ..Profile::default()
    });
    let binder = ProfilePreferences::bind(&target, &store);

    binder.write_all().unwrap();
    assert!(!store.contains("nickname").unwrap());
    assert_eq!(store.get("score", 0i32).unwrap(), 12);

    store.put("nickname", "again".to_string()).unwrap();
    binder.write_nickname().unwrap();
    assert!(!store.contains("nickname").unwrap());

    // reading it back yields the configured default
    binder.read_nickname().unwrap();
    assert_eq!(target.lock().nickname.as_deref(), Some(""));
}

#[test]
fn single_field_operations_touch_only_their_key() {
    let store = PreferenceStore::in_memory();
    store.put("score", 7i32).unwrap();
    store.put("userName", "zed".to_string()).unwrap();
    let target = shared(Profile::default());
    let binder = ProfilePreferences::bind(&target, &store);

    binder.read_score().unwrap();
    {
        let profile = target.lock();
        assert_eq!(profile.score, 7);
        assert_eq!(profile.name, "");
    }

    target.lock().dark_mode = false;
    binder.write_dark_mode().unwrap();
    assert_eq!(store.get_all().unwrap().len(), 3);
}

#[test]
fn stored_value_of_the_wrong_kind_is_reported() {
    let store = PreferenceStore::in_memory();
    store.put("score", 7i64).unwrap();
    let target = shared(Profile::default());

    let err = ProfilePreferences::read(&target, &store).unwrap_err();

    assert!(matches!(
        err,
        BindError::Store(StoreError::KindMismatch {
            expected: StorageKind::Integer,
            found: StorageKind::Long,
            ..
        })
    ));
}

#[test]
fn set_type_defaults_ignores_configured_defaults() {
    let store = PreferenceStore::in_memory();
    let target = shared(Profile::default());
    let binder = ProfilePreferences::read_and_bind(&target, &store).unwrap();

    binder.set_type_defaults().unwrap();

    let profile = target.lock();
    assert_eq!(profile.score, 0);
    assert_eq!(profile.last_seen, 0);
    assert!(!profile.dark_mode);
    assert_eq!(profile.nickname, None);
}

#[test]
fn private_fields_use_accessors() {
    let store = PreferenceStore::in_memory();
    let target = shared(Audio::default());

    AudioPreferences::read(&target, &store).unwrap();
    assert_eq!(target.lock().get_volume(), 50);

    target.lock().set_volume(80);
    AudioPreferences::write(&target, &store).unwrap();
    assert_eq!(store.get("volume", 0i32).unwrap(), 80);
}

#[test]
fn converters_translate_both_ways() {
    let store = PreferenceStore::in_memory();
    let target = shared(Layout::default());
    let binder = LayoutPreferences::read_and_bind(&target, &store).unwrap();

    {
        let layout = target.lock();
        assert_eq!(
            layout.window,
            Window {
                width: 640,
                height: 480
            }
        );
        assert_eq!(layout.theme, Theme::Dark);
    }

    target.lock().window = Window {
        width: 1024,
        height: 768,
    };
    target.lock().theme = Theme::Light;
    binder.write_all().unwrap();

    assert_eq!(
        store.get("window", String::new()).unwrap(),
        r#"{"width":1024,"height":768}"#
    );
    assert_eq!(store.get("theme", -1i32).unwrap(), 0);
}

#[test]
fn conversion_failures_surface_from_reads() {
    let store = PreferenceStore::in_memory();
    store.put("theme", 9i32).unwrap();
    let target = shared(Layout::default());

    let err = LayoutPreferences::read(&target, &store).unwrap_err();

    assert!(matches!(
        err,
        BindError::Store(StoreError::Transform { ref key, .. }) if key == "theme"
    ));
}

#[test]
fn unbound_binder_fails_fast() {
    let store = PreferenceStore::in_memory();
    let target = shared(Profile::default());
    let mut binder = ProfilePreferences::bind(&target, &store);

    binder.unbind();

    assert!(matches!(binder.read_all(), Err(BindError::Unbound)));
    assert!(matches!(binder.write_all(), Err(BindError::Unbound)));
    assert!(matches!(binder.read_score(), Err(BindError::Unbound)));
    assert!(matches!(binder.observe_changes(), Err(BindError::Unbound)));
    assert!(matches!(binder.set_type_defaults(), Err(BindError::Unbound)));
    assert!(matches!(binder.store(), Err(BindError::Unbound)));
}

#[test]
fn store_handle_is_shared() {
    let store = PreferenceStore::in_memory();
    let target = shared(Profile::default());
    let binder = ProfilePreferences::bind(&target, &store);

    binder.store().unwrap().put("score", 4i32).unwrap();

    assert_eq!(store.get("score", 0i32).unwrap(), 4);
}
