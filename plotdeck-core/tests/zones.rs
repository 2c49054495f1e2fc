use plotdeck_core::zone::{
    AxesController, AxisState, GangShape, MatrixZoneFactory, MultiAxesController, Range,
    SingleAxesController, SingleZoneFactory, StackZoneFactory, ZoneError,
};
use plotdeck_core::{ConfigMap, ConfigValue, GangLayout, ZoneFactory, ZoneId};

#[test]
fn single_factory_resolves_every_name_to_the_default() {
    let mut factory = SingleZoneFactory;
    assert!(factory.is_single_zone());
    assert_eq!(factory.create_zone_specifier().selected(), ZoneId::DEFAULT);
    assert_eq!(factory.name_to_id("anything"), Some(ZoneId::DEFAULT));
    assert_eq!(factory.layout(), GangLayout::single());
    assert_eq!(factory.add_zone(), None);
}

#[test]
fn stack_factory_hands_out_the_default_then_fresh_zones() {
    let mut factory = StackZoneFactory::new();
    assert!(!factory.is_single_zone());
    let first = factory.create_zone_specifier();
    let second = factory.create_zone_specifier();
    let third = factory.create_zone_specifier();
    assert_eq!(first.selected(), factory.default_zone());
    assert_eq!(second.selected(), ZoneId::index(1));
    assert_eq!(third.selected(), ZoneId::index(2));
    assert_eq!(factory.layout().zone_count(), 3);
    assert_eq!(factory.layout().shape(), GangShape::Stack);

    assert_eq!(factory.name_to_id("2"), Some(ZoneId::index(1)));
    assert_eq!(factory.name_to_id("0"), None);
    assert_eq!(factory.name_to_id("9"), None);

    assert!(!factory.remove_zone(&ZoneId::index(0)));
    assert!(factory.remove_zone(&ZoneId::index(2)));
    assert!(!factory.remove_zone(&ZoneId::index(2)));
    assert_eq!(factory.add_zone(), Some(ZoneId::index(3)));
}

#[test]
fn prepopulated_stack_dispenses_existing_zones_first() {
    let mut factory = StackZoneFactory::with_zones(2);
    assert_eq!(factory.create_zone_specifier().selected(), ZoneId::index(0));
    let mut second = factory.create_zone_specifier();
    assert_eq!(second.selected(), ZoneId::index(1));
    assert!(second.select(ZoneId::index(0)));
    assert!(!second.select(ZoneId::index(5)));
    assert_eq!(second.selected(), ZoneId::index(0));
}

#[test]
fn matrix_layout_is_row_major() {
    let layout = GangLayout::matrix(2);
    assert_eq!(
        layout.zones(),
        &[
            ZoneId::cell(0, 0),
            ZoneId::cell(1, 0),
            ZoneId::cell(0, 1),
            ZoneId::cell(1, 1)
        ]
    );
    let mut factory = MatrixZoneFactory::new(2);
    assert_eq!(factory.create_zone_specifier().selected(), ZoneId::cell(0, 0));
    factory.set_ncoord(3);
    assert_eq!(factory.name_to_id("3-3"), Some(ZoneId::cell(2, 2)));
    assert!(ZoneId::cell(2, 2).is_diagonal());
    assert!(!ZoneId::index(2).is_diagonal());
}

#[test]
fn single_controller_rejects_multi_zone_layouts() {
    let mut axes = SingleAxesController::new();
    assert_eq!(
        axes.zone_controllers(&GangLayout::stack(2)).unwrap_err(),
        ZoneError::LayoutMismatch {
            expected: 1,
            found: 2
        }
    );
    let controllers = axes.zone_controllers(&GangLayout::single()).unwrap();
    assert_eq!(controllers.len(), 1);
    assert_eq!(controllers[0].zone(), ZoneId::DEFAULT);
}

#[test]
fn controllers_survive_relayout() {
    let mut axes = MultiAxesController::new();
    let layout = GangLayout::stack(2);
    axes.zone_controllers(&layout).unwrap();
    let config = axes.effective_config(&ZoneId::index(0)).unwrap();
    axes.zone_controller_mut(&ZoneId::index(0))
        .unwrap()
        .configure(&config, Range::new(0.0, 1.0), Range::new(0.0, 2.0))
        .unwrap();

    axes.set_axis_lock(true);
    let grown = layout.with_zone(ZoneId::index(2));
    let controllers = axes.zone_controllers(&grown).unwrap();
    assert_eq!(controllers.len(), 3);
    assert!(matches!(controllers[0].state(), AxisState::RangeLocked { .. }));
    assert_eq!(controllers[1].state(), &AxisState::Unconfigured);
    assert_eq!(controllers[2].state(), &AxisState::Unconfigured);
    assert!(controllers[2].axis().is_locked());

    let shrunk = grown.without_zone(&ZoneId::index(1));
    axes.zone_controllers(&shrunk).unwrap();
    assert!(axes.zone_controller(&ZoneId::index(1)).is_none());
    assert!(matches!(
        axes.zone_controller(&ZoneId::index(0)).unwrap().state(),
        AxisState::RangeLocked { .. }
    ));
}

#[test]
fn zone_values_override_global_ones() {
    let mut axes = MultiAxesController::new();
    axes.zone_controllers(&GangLayout::stack(2)).unwrap();
    axes.global_config_mut()
        .set("grid", ConfigValue::Bool(true))
        .unwrap();
    axes.zone_controller_mut(&ZoneId::index(1))
        .unwrap()
        .config_mut()
        .set("grid", ConfigValue::Bool(false))
        .unwrap();

    let grid = |config: Option<ConfigMap>| {
        config.and_then(|c| c.get_by_name("grid").map(|(_, v)| v.clone()))
    };
    assert_eq!(grid(axes.effective_config(&ZoneId::index(0))), Some(ConfigValue::Bool(true)));
    assert_eq!(grid(axes.effective_config(&ZoneId::index(1))), Some(ConfigValue::Bool(false)));
    assert_eq!(axes.effective_config(&ZoneId::index(7)), None);
}

#[test]
fn matrix_diagonal_ignores_aspect_ratio() {
    let mut axes = MultiAxesController::matrix(2, false);
    axes.zone_controllers(&GangLayout::matrix(2)).unwrap();
    axes.global_config_mut()
        .set("aspect_ratio", ConfigValue::Float(1.0))
        .unwrap();
    axes.coord_config_mut(0)
        .unwrap()
        .set("label", ConfigValue::Text("Mass".into()))
        .unwrap();

    let diagonal = axes.effective_config(&ZoneId::cell(0, 0)).unwrap();
    assert!(diagonal.get_by_name("aspect_ratio").is_none());
    assert_eq!(
        diagonal.get_by_name("ylabel").map(|(_, v)| v.clone()),
        Some(ConfigValue::Text("Mass".into()))
    );
    assert!(diagonal.get_by_name("xlabel").is_none());

    let off = axes.effective_config(&ZoneId::cell(1, 0)).unwrap();
    assert_eq!(
        off.get_by_name("aspect_ratio").map(|(_, v)| v.clone()),
        Some(ConfigValue::Float(1.0))
    );
    assert_eq!(
        off.get_by_name("ylabel").map(|(_, v)| v.clone()),
        Some(ConfigValue::Text("Mass".into()))
    );
}
