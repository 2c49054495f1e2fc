use plotdeck_core::config::{
    AutoConfig, AutoDefault, ConfigSource, DatasetContext, FixedDefault, GroupedConfig,
    KeyDefault, MultiConfigger, RowScaled, Specifier, StaticConfig,
};
use plotdeck_core::{ConfigKey, ConfigMap, ConfigValue};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn size() -> ConfigKey {
    ConfigKey::integer("size", 2).with_range(0.0, 20.0)
}

fn color() -> ConfigKey {
    ConfigKey::color("color", "#ff0000")
}

fn label() -> ConfigKey {
    ConfigKey::text("label", "")
}

#[test]
fn later_sources_override_earlier_ones() {
    let mut defaults = StaticConfig::new(vec![size(), color()]);
    defaults.set("size", ConfigValue::Int(4)).unwrap();
    defaults.set_text("color", "blue").unwrap();

    let mut explicit = StaticConfig::new(vec![size(), label()]);
    explicit.set("size", ConfigValue::Int(9)).unwrap();

    let merged = MultiConfigger::new()
        .with_source(&defaults)
        .with_source(&explicit);
    assert_eq!(merged.source_count(), 2);

    let config = merged.config();
    assert_eq!(config.get(&size()), Some(&ConfigValue::Int(9)));
    assert_eq!(config.get(&color()), Some(&ConfigValue::Text("#0000ff".into())));
    assert!(!config.contains(&label()));

    let names: Vec<String> = merged.keys().iter().map(|k| k.name().to_string()).collect();
    assert_eq!(names, vec!["size", "color", "label"]);
}

#[test]
fn unset_keys_fall_back_to_declared_defaults() {
    let config = ConfigMap::new();
    assert_eq!(config.int_value(&size()).unwrap(), 2);
    assert_eq!(config.text_value(&color()).unwrap(), "#ff0000");
    let err = config.bool_value(&size()).unwrap_err();
    assert_eq!(err.key, "size");
}

#[test]
fn static_config_validates_on_set() {
    let mut config = StaticConfig::new(vec![size(), color()]);
    assert!(config.set("size", ConfigValue::Int(25)).is_err());
    assert!(config.set("size", ConfigValue::Text("big".into())).is_err());
    assert!(config.set_text("color", "not-a-colour").is_err());
    let unknown = config.set("width", ConfigValue::Int(1)).unwrap_err();
    assert_eq!(unknown.key, "width");
    assert!(config.config().is_empty());

    config.set_json("size", &serde_json::json!("7")).unwrap();
    assert_eq!(config.get("size"), Some(&ConfigValue::Int(7)));
    assert_eq!(config.clear("size"), Some(ConfigValue::Int(7)));
    assert_eq!(config.get("size"), None);
}

#[test]
fn grouping_does_not_change_merge_order() {
    let mut grouped = GroupedConfig::new();
    grouped.add_group("Marker", StaticConfig::new(vec![size(), color()]));
    grouped.add_group("Text", StaticConfig::new(vec![label()]));
    grouped.set_json("size", &serde_json::json!(6)).unwrap();
    grouped.set_json("label", &serde_json::json!("stars")).unwrap();
    assert!(grouped.set_json("width", &serde_json::json!(1)).is_err());

    let names: Vec<&str> = grouped.group_names().collect();
    assert_eq!(names, vec!["Marker", "Text"]);
    assert_eq!(
        grouped.group("Marker").and_then(|g| g.get("size")),
        Some(&ConfigValue::Int(6))
    );

    let mut flat = StaticConfig::new(vec![size(), color(), label()]);
    flat.set("size", ConfigValue::Int(6)).unwrap();
    flat.set_text("label", "stars").unwrap();
    assert_eq!(grouped.config(), flat.config());
    assert_eq!(grouped.keys().len(), 3);
}

#[test]
fn specifiers_round_trip_text() {
    let key = ConfigKey::boolean("grid", false);
    let spec = Specifier::for_key(&key);
    let value = spec.parse(&key, " Yes ").unwrap();
    assert_eq!(value, ConfigValue::Bool(true));
    assert_eq!(spec.format(&value), "true");
    assert!(spec.parse(&key, "maybe").is_err());
}

#[derive(Debug, Clone, Default)]
struct Counting {
    calls: Arc<AtomicUsize>,
}

impl AutoDefault for Counting {
    fn auto_value(&self, _key: &ConfigKey, data: &DatasetContext) -> ConfigValue {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ConfigValue::Int(data.row_count.unwrap_or(0) as i64 % 20)
    }
}

#[test]
fn enabled_auto_keys_do_not_consult_their_strategy() {
    let counting = Counting::default();
    let calls = Arc::clone(&counting.calls);
    let mut auto = AutoConfig::new();
    auto.add_key(size(), Box::new(counting));
    auto.set_dataset(DatasetContext::new("stars", Some(13)));

    assert_eq!(auto.config().get(&size()), Some(&ConfigValue::Int(13)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    auto.set_literal("size", ConfigValue::Int(5)).unwrap();
    assert!(auto.is_enabled("size"));
    for _ in 0..3 {
        assert_eq!(auto.config().get(&size()), Some(&ConfigValue::Int(5)));
    }
    auto.set_dataset(DatasetContext::new("galaxies", Some(4)));
    assert_eq!(auto.config().get(&size()), Some(&ConfigValue::Int(5)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    auto.set_enabled("size", false).unwrap();
    assert_eq!(auto.config().get(&size()), Some(&ConfigValue::Int(4)));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn enabled_key_without_literal_contributes_nothing() {
    let mut auto = AutoConfig::new();
    auto.add_key(label(), Box::new(FixedDefault(ConfigValue::Text("auto".into()))));
    assert_eq!(auto.config().get(&label()), Some(&ConfigValue::Text("auto".into())));
    auto.set_enabled("label", true).unwrap();
    assert!(auto.config().is_empty());
    assert!(auto.set_literal("size", ConfigValue::Int(1)).is_err());
    assert!(auto.set_literal("label", ConfigValue::Int(1)).is_err());
}

#[test]
fn row_scaled_shrinks_with_dataset_size() {
    let strategy = RowScaled {
        max: 5.0,
        min: 1.0,
        per_decade: 1.0,
    };
    let value = |rows: Option<u64>| strategy.auto_value(&size(), &DatasetContext::new("t", rows));
    assert_eq!(value(Some(1)), ConfigValue::Int(5));
    assert_eq!(value(Some(1_000)), ConfigValue::Int(2));
    assert_eq!(value(Some(10_000_000)), ConfigValue::Int(1));
    assert_eq!(value(None), ConfigValue::Int(2));
    assert_eq!(
        KeyDefault.auto_value(&size(), &DatasetContext::default()),
        ConfigValue::Int(2)
    );
}
