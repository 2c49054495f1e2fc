use plotdeck_core::config::{ConfigSource, StaticConfig};
use plotdeck_core::plotter::{style_keys, LinePlotter, MarkPlotter};
use plotdeck_core::{
    ConfigMap, ConfigValidationError, ConfigValue, DataGeom, DataSpec, LayerId, LayerStyler,
    Plotter, Style,
};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn config(entries: &[(plotdeck_core::ConfigKey, ConfigValue)]) -> ConfigMap {
    let mut config = ConfigMap::new();
    for (key, value) in entries {
        config.put(key, value.clone());
    }
    config
}

fn hash_of(style: &Style) -> u64 {
    let mut hasher = DefaultHasher::new();
    style.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn identical_failures_are_reported_once() {
    let plotter = MarkPlotter;
    let mut styler = LayerStyler::new();
    let mut reported: Vec<ConfigValidationError> = Vec::new();

    let bad_shape = config(&[(style_keys::shape(), "hexagon".into())]);
    for _ in 0..3 {
        assert!(styler.create_style(&plotter, &bad_shape, &mut reported).is_err());
    }
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].key, "shape");
    assert!(styler.has_reported());

    let bad_size = config(&[(style_keys::size(), ConfigValue::Int(50))]);
    assert!(styler.create_style(&plotter, &bad_size, &mut reported).is_err());
    assert!(styler.create_style(&plotter, &bad_size, &mut reported).is_err());
    assert_eq!(reported.len(), 2);
    assert_eq!(reported[1].key, "size");
}

#[test]
fn success_rearms_reporting() {
    let plotter = MarkPlotter;
    let mut styler = LayerStyler::new();
    let mut reported: Vec<ConfigValidationError> = Vec::new();
    let bad = config(&[(style_keys::shape(), "hexagon".into())]);

    assert!(styler.create_style(&plotter, &bad, &mut reported).is_err());
    assert!(styler
        .create_style(&plotter, &ConfigMap::new(), &mut reported)
        .is_ok());
    assert!(!styler.has_reported());
    assert!(styler.create_style(&plotter, &bad, &mut reported).is_err());
    assert_eq!(reported.len(), 2);

    styler.reset();
    assert!(styler.create_style(&plotter, &bad, &mut reported).is_err());
    assert_eq!(reported.len(), 3);
}

#[test]
fn styles_from_equal_configs_are_equal() {
    let plotter = LinePlotter;
    let entries = [
        (style_keys::thickness(), ConfigValue::Int(3)),
        (style_keys::color(), ConfigValue::Text("#00ff00".into())),
    ];
    let forward = config(&entries);
    let mut backward = ConfigMap::new();
    for (key, value) in entries.iter().rev() {
        backward.put(key, value.clone());
    }

    let a = plotter.create_style(&forward).unwrap();
    let b = plotter.create_style(&backward).unwrap();
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
    assert_eq!(a.get("thickness"), Some(&ConfigValue::Int(3)));
    assert_eq!(a.get("antialias"), Some(&ConfigValue::Bool(false)));

    let c = plotter
        .create_style(&config(&[(style_keys::thickness(), ConfigValue::Int(4))]))
        .unwrap();
    assert_ne!(a, c);
}

#[test]
fn created_layer_carries_style_and_data() {
    let plotter = MarkPlotter;
    let mut styler = LayerStyler::new();
    let mut reported: Vec<ConfigValidationError> = Vec::new();
    let spec = DataSpec::new("stars", "All", vec!["ra".into(), "dec".into()]);
    let layer = styler
        .create_layer(
            &plotter,
            Some(DataGeom::plane()),
            Some(spec.clone()),
            &ConfigMap::new(),
            &mut reported,
        )
        .unwrap();
    assert_eq!(layer.plotter(), "mark");
    assert_eq!(layer.data_spec(), Some(&spec));
    assert_eq!(layer.style().get("shape"), Some(&ConfigValue::Text("circle".into())));
    assert!(reported.is_empty());
}

#[test]
fn whole_numbers_on_float_keys_style_like_floats() {
    let plotter = MarkPlotter;
    let mut styler = LayerStyler::new();
    let mut reported: Vec<ConfigValidationError> = Vec::new();
    let spec = DataSpec::new("stars", "All", vec!["ra".into(), "dec".into()]);

    let mut as_int = StaticConfig::new(plotter.style_keys());
    as_int.set("opacity", ConfigValue::Int(1)).unwrap();
    assert_eq!(as_int.get("opacity"), Some(&ConfigValue::Float(1.0)));
    let mut as_float = StaticConfig::new(plotter.style_keys());
    as_float.set("opacity", ConfigValue::Float(1.0)).unwrap();
    assert!(as_int.set("opacity", ConfigValue::Int(2)).is_err());

    let mut layer = |config: &StaticConfig| {
        styler
            .create_layer(
                &plotter,
                Some(DataGeom::plane()),
                Some(spec.clone()),
                &config.config(),
                &mut reported,
            )
            .unwrap()
    };
    let a = layer(&as_int);
    let b = layer(&as_float);
    assert_eq!(a.style().get("opacity"), Some(&ConfigValue::Float(1.0)));
    assert_eq!(a.style(), b.style());
    assert_eq!(hash_of(a.style()), hash_of(b.style()));
    assert_eq!(LayerId::of(&a), LayerId::of(&b));

    let mut raw = ConfigMap::new();
    raw.put(&style_keys::opacity(), ConfigValue::Int(0));
    let style = plotter.create_style(&raw).unwrap();
    assert_eq!(style.get("opacity"), Some(&ConfigValue::Float(0.0)));
    assert!(reported.is_empty());
}
