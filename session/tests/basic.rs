use session::{
    validate_session, LayerDefinition, LayoutDefinition, LayoutKind, SessionDefinition,
    SessionError, SessionRuleError, SessionSettings, TableDefinition, MAX_MATRIX_COORDS,
    MAX_STACK_ZONES,
};
use std::collections::BTreeMap;

fn layer(control: &str, table: &str) -> LayerDefinition {
    LayerDefinition {
        control: control.to_string(),
        plotter: "mark".to_string(),
        table: Some(table.to_string()),
        subset: "All".to_string(),
        coords: vec!["x".to_string(), "y".to_string()],
        zone: None,
        config: BTreeMap::new(),
        auto: Vec::new(),
    }
}

fn sample_session() -> SessionDefinition {
    let mut config = BTreeMap::new();
    config.insert("size".to_string(), serde_json::json!(3));
    let mut first = layer("points", "stars");
    first.config = config;
    first.auto = vec!["opacity".to_string()];
    SessionDefinition {
        name: "test".to_string(),
        description: "desc".to_string(),
        layout: LayoutDefinition {
            kind: LayoutKind::Stack,
            zones: 2,
            ncoord: 2,
        },
        tables: vec![TableDefinition {
            name: "stars".to_string(),
            columns: vec!["x".to_string(), "y".to_string()],
            rows: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            synthetic: None,
        }],
        layers: vec![first],
        global: BTreeMap::new(),
        zones: BTreeMap::new(),
        settings: SessionSettings::default(),
    }
}

#[test]
fn save_and_load_json_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session.json");
    let session = sample_session();

    session.save_to_file(&path).unwrap();
    let loaded = SessionDefinition::load_from_file(&path).unwrap();

    assert_eq!(loaded.name, session.name);
    assert_eq!(loaded.layout.kind, LayoutKind::Stack);
    assert_eq!(loaded.layout.zones, 2);
    assert_eq!(loaded.tables[0].rows.len(), 2);
    assert_eq!(loaded.layers[0].config["size"], serde_json::json!(3));
    assert_eq!(loaded.layers[0].auto, vec!["opacity".to_string()]);
    assert_eq!(loaded.settings, SessionSettings::default());
}

#[test]
fn save_and_load_toml_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session.toml");
    let session = sample_session();

    session.save_to_file(&path).unwrap();
    let loaded = SessionDefinition::load_from_file(&path).unwrap();

    assert_eq!(loaded.name, "test");
    assert_eq!(loaded.layers.len(), 1);
    assert_eq!(loaded.layers[0].coords, vec!["x", "y"]);
}

#[test]
fn minimal_json_uses_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("minimal.json");
    std::fs::write(&path, r#"{"name": "tiny", "settings": {"progress_steps": 0}}"#).unwrap();

    let loaded = SessionDefinition::load_from_file(&path).unwrap();
    assert_eq!(loaded.layout.kind, LayoutKind::Single);
    assert!(loaded.layers.is_empty());
    assert_eq!(loaded.settings.progress_steps, 1);
    assert_eq!(loaded.settings.worker_name_prefix, "plotdeck-worker");
}

#[test]
fn unknown_extension_is_rejected() {
    let err = SessionDefinition::load_from_file("session.yaml").unwrap_err();
    assert!(matches!(err, SessionError::UnsupportedFormat(ext) if ext == "yaml"));
}

#[test]
fn session_rules() {
    let mut session = sample_session();
    assert_eq!(validate_session(&session), Ok(()));

    session.layers.push(layer("points", "stars"));
    assert_eq!(
        validate_session(&session),
        Err(SessionRuleError::DuplicateControl("points".to_string()))
    );

    session.layers.pop();
    session.layers.push(layer("other", "galaxies"));
    assert_eq!(
        validate_session(&session),
        Err(SessionRuleError::UnknownTable {
            control: "other".to_string(),
            table: "galaxies".to_string(),
        })
    );

    session.layers.pop();
    session.tables[0].rows.push(vec![1.0]);
    assert_eq!(
        validate_session(&session),
        Err(SessionRuleError::RowWidth {
            table: "stars".to_string(),
            row: 2,
            found: 1,
            expected: 2,
        })
    );
}

#[test]
fn layout_sizes_are_bounded() {
    let mut session = sample_session();
    session.layout.kind = LayoutKind::Stack;
    session.layout.zones = 4_294_967_298;
    assert_eq!(
        validate_session(&session),
        Err(SessionRuleError::LayoutSize {
            field: "zones",
            value: 4_294_967_298,
            max: MAX_STACK_ZONES,
        })
    );
    session.layout.zones = 0;
    assert!(validate_session(&session).is_err());
    session.layout.zones = MAX_STACK_ZONES;
    assert_eq!(validate_session(&session), Ok(()));

    session.layout.kind = LayoutKind::Matrix;
    session.layout.ncoord = MAX_MATRIX_COORDS + 1;
    assert!(matches!(
        validate_session(&session),
        Err(SessionRuleError::LayoutSize { field: "ncoord", .. })
    ));

    session.layout.kind = LayoutKind::Single;
    assert_eq!(validate_session(&session), Ok(()));
}
