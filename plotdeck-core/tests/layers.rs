use plotdeck_core::layer::{layer_ids, layer_list_equals, layer_set_equals};
use plotdeck_core::{ConfigValue, DataGeom, DataSpec, LayerCache, LayerId, PlotLayer, Style};
use proptest::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

fn layer(table: &str, size: i64) -> PlotLayer {
    varied_layer("mark", table, false, size)
}

fn geom(volume: bool) -> DataGeom {
    if volume {
        DataGeom {
            name: "volume".to_string(),
            dimensions: 3,
        }
    } else {
        DataGeom::plane()
    }
}

/// The style is built the same way whatever the plotter, so a plotter
/// change differs in that component alone.
fn varied_layer(plotter: &str, table: &str, volume: bool, size: i64) -> PlotLayer {
    PlotLayer::new(
        plotter,
        Some(DataSpec::new(table, "All", vec!["x".into(), "y".into()])),
        Some(geom(volume)),
        Style::new("mark", vec![("size".to_string(), ConfigValue::Int(size))]),
    )
}

fn hash_of(id: &LayerId) -> u64 {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    hasher.finish()
}

proptest! {
    #[test]
    fn ids_match_exactly_when_components_match(
        p1 in "mark|line",
        p2 in "mark|line",
        t1 in "[a-c]",
        t2 in "[a-c]",
        g1 in any::<bool>(),
        g2 in any::<bool>(),
        s1 in 0i64..3,
        s2 in 0i64..3
    ) {
        let a = varied_layer(&p1, &t1, g1, s1);
        let b = varied_layer(&p2, &t2, g2, s2);
        let same = p1 == p2 && t1 == t2 && g1 == g2 && s1 == s2;
        prop_assert_eq!(LayerId::of(&a) == LayerId::of(&b), same);
        if same {
            prop_assert_eq!(hash_of(&LayerId::of(&a)), hash_of(&LayerId::of(&b)));
        }
        prop_assert_eq!(
            LayerId::without_style(&a) == LayerId::without_style(&b),
            p1 == p2 && t1 == t2 && g1 == g2
        );
    }

    #[test]
    fn list_equality_is_ordered_and_set_equality_is_not(
        specs in prop::collection::vec(("[a-c]", 0i64..3), 0..6)
    ) {
        let layers: Vec<PlotLayer> = specs.iter().map(|(t, s)| layer(t, *s)).collect();
        let mut reversed = layers.clone();
        reversed.reverse();

        prop_assert!(layer_list_equals(&layers, &layers.clone()));
        prop_assert!(layer_set_equals(&layers, &reversed));
        prop_assert_eq!(
            layer_list_equals(&layers, &reversed),
            layer_ids(&layers) == layer_ids(&reversed)
        );

        let distinct: HashSet<LayerId> = layer_ids(&layers).into_iter().collect();
        let expected: HashSet<(String, i64)> = specs.into_iter().collect();
        prop_assert_eq!(distinct.len(), expected.len());
    }
}

#[test]
fn id_fields_follow_the_layer() {
    let source = layer("stars", 2);
    let id = LayerId::of(&source);
    assert_eq!(id.plotter(), "mark");
    assert_eq!(id.data_spec().map(|spec| spec.table.as_str()), Some("stars"));
    assert_eq!(id.style(), Some(source.style()));
    assert_eq!(LayerId::without_style(&source).style(), None);
    assert_eq!(
        LayerId::new("mark", source.data_spec().cloned(), Some(DataGeom::plane()), None),
        LayerId::without_style(&source)
    );
}

#[test]
fn cache_keeps_only_live_layers() {
    let mut cache = LayerCache::new();
    let a = LayerId::of(&layer("a", 1));
    let b = LayerId::of(&layer("b", 1));
    cache.insert(a.clone(), 10);
    cache.insert(b.clone(), 20);
    assert_eq!(cache.insert(a.clone(), 11), Some(10));

    cache.retain_only(std::slice::from_ref(&b));
    assert!(!cache.contains(&a));
    assert_eq!(cache.get(&b), Some(&20));
    assert_eq!(cache.len(), 1);

    cache.retain_only(&[]);
    assert!(cache.is_empty());
}

#[test]
fn each_component_alone_breaks_equality() {
    let base = varied_layer("mark", "stars", false, 2);
    let variants = [
        varied_layer("line", "stars", false, 2),
        varied_layer("mark", "galaxies", false, 2),
        varied_layer("mark", "stars", true, 2),
        varied_layer("mark", "stars", false, 3),
    ];
    for variant in &variants {
        assert_ne!(LayerId::of(&base), LayerId::of(variant));
    }
    let again = varied_layer("mark", "stars", false, 2);
    assert_eq!(LayerId::of(&base), LayerId::of(&again));
    assert_eq!(hash_of(&LayerId::of(&base)), hash_of(&LayerId::of(&again)));
}
