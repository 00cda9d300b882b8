//! Headless демо physics weapon
//!
//! Поднимает Bevy App без рендера: игрок с field rifle стреляет по
//! seeded набору целей. Trace хоста заменён простым ray-sphere тестом.

use bevy::prelude::*;
use rand::Rng;

use physics_weapon::{
    create_headless_app, log_error, ActorKilled, AnimationInstance, AttachWeaponIntent, Character, Controller,
    DamageTaken, DamageTypeDef, DamageTypes, DestructionField, DetachWeaponIntent, DeterministicRng,
    EnhancedInput, FieldInstantiated, FirstPersonMesh, Health, HitResolved, HitResult, MappingContext, PhysicsWeapon,
    RawInputEvent, SimulationPlugin, WeaponAttached, WeaponConfig, WeaponFired, WeaponSet, GRIP_POINT,
};
use physics_weapon::input::{InputKey, TriggerEvent};

const FIELD_RIFLE: &str = include_str!("../assets/weapons/field_rifle.ron");

/// Радиус hit sphere цели для demo trace
const TARGET_RADIUS: f32 = 60.0;
const TARGET_COUNT: usize = 8;
const TICKS: u32 = 300;
/// Выстрел каждые N тиков
const FIRE_INTERVAL: u32 = 20;

/// Цель на полигоне
#[derive(Component, Debug)]
struct Target;

/// Demo статистика
#[derive(Resource, Debug, Default)]
struct Report {
    shots: u32,
    hits: u32,
    damage_dealt: f32,
    kills: u32,
    fields: u32,
}

/// Demo trace: ближайшая живая цель, чью sphere пересекает луч выстрела
fn trace_weapon_hits(
    mut fired: EventReader<WeaponFired>,
    targets: Query<(Entity, &Transform, &Health), With<Target>>,
    mut hits: EventWriter<HitResolved>,
    mut report: ResMut<Report>,
) {
    for shot in fired.read() {
        report.shots += 1;
        let origin = shot.muzzle_location;
        let dir = shot.aim_direction.normalize_or_zero();

        let closest = targets
            .iter()
            .filter(|(_, _, health)| health.is_alive())
            .filter_map(|(entity, transform, _)| {
                let center = transform.translation;
                let along = (center - origin).dot(dir);
                let miss_sq = (center - origin).length_squared() - along * along;
                let radius_sq = TARGET_RADIUS * TARGET_RADIUS;
                (along > 0.0 && miss_sq < radius_sq)
                    .then(|| (entity, center, along - (radius_sq - miss_sq).sqrt()))
            })
            .min_by(|a, b| a.2.total_cmp(&b.2));

        if let Some((entity, center, distance)) = closest {
            let impact_point = origin + dir * distance;
            let impact_normal = (impact_point - center).normalize_or(-dir);
            hits.write(HitResolved {
                weapon: shot.weapon,
                hit: HitResult::new(Some(entity), impact_point, impact_normal),
            });
            report.hits += 1;
        }
    }
}

/// Demo хост: "инстанцирует" каждый новый field и отдаёт entity на cleanup
fn instantiate_fields(
    mut commands: Commands,
    fields: Query<Entity, (Added<DestructionField>, Without<FieldInstantiated>)>,
    mut report: ResMut<Report>,
) {
    for entity in &fields {
        report.fields += 1;
        commands.entity(entity).insert(FieldInstantiated);
    }
}

fn collect_report(
    mut taken: EventReader<DamageTaken>,
    mut killed: EventReader<ActorKilled>,
    mut report: ResMut<Report>,
) {
    for event in taken.read() {
        report.damage_dealt += event.amount;
    }
    report.kills += killed.read().count() as u32;
}

fn main() {
    let seed = 42;
    println!("Starting physics weapon headless demo (seed: {})", seed);

    let mut app = create_headless_app(seed);

    let config = match WeaponConfig::from_ron(FIELD_RIFLE) {
        Ok(config) => config,
        Err(err) => {
            log_error(&format!("Invalid field rifle config: {}", err));
            std::process::exit(1);
        }
    };

    app.add_plugins(SimulationPlugin)
        .insert_resource(DamageTypes::default().with_type("Explosive", DamageTypeDef { impulse: 500.0 }))
        .init_resource::<Report>()
        .add_systems(
            Update,
            (
                trace_weapon_hits.after(WeaponSet::Fire).before(WeaponSet::Dispatch),
                (instantiate_fields, collect_report).after(WeaponSet::Response),
            ),
        );

    // Player: controller с baseline контекстом, first-person mesh, персонаж
    let world = app.world_mut();
    let mut input = EnhancedInput::default();
    input.add_mapping_context(
        MappingContext::new("Default")
            .with_mapping("SpaceBar", "Jump")
            .with_mapping("Touch1", "Jump"),
        0,
    );
    let controller = world.spawn((Controller::Player, input)).id();
    let mesh = world
        .spawn((
            Transform::default(),
            FirstPersonMesh::default().with_socket(GRIP_POINT, Transform::from_xyz(20.0, -8.0, -4.0)),
            AnimationInstance,
        ))
        .id();
    let character = world
        .spawn((Transform::default(), Character::new(mesh).with_controller(controller)))
        .id();
    let weapon = world.spawn(PhysicsWeapon::new(config)).id();

    // Seeded полигон: цели впереди по +X
    let positions: Vec<Vec3> = {
        let mut rng = world.resource_mut::<DeterministicRng>();
        (0..TARGET_COUNT)
            .map(|_| {
                Vec3::new(
                    rng.rng.gen_range(300.0..1500.0),
                    rng.rng.gen_range(-40.0..40.0),
                    rng.rng.gen_range(0.0..20.0),
                )
            })
            .collect()
    };
    for position in positions {
        world.spawn((Target, Transform::from_translation(position), Health::new(60.0)));
    }

    world.send_event(AttachWeaponIntent {
        weapon,
        character: Some(character),
    });

    for tick in 0..TICKS {
        if tick % FIRE_INTERVAL == 1 {
            // Touch1 есть в обоих контекстах — weapon context (priority 1) побеждает
            app.world_mut().send_event(RawInputEvent {
                controller,
                key: InputKey::new("Touch1"),
                trigger: TriggerEvent::Triggered,
            });
        }

        app.update();

        if tick == 0 {
            let attached = app.world_mut().resource_mut::<Events<WeaponAttached>>().drain().count();
            println!("Weapon attached: {}", attached > 0);
        }
    }

    app.world_mut().send_event(DetachWeaponIntent { weapon });
    app.update();

    let pending_fields = {
        let world = app.world_mut();
        let mut query = world.query::<&DestructionField>();
        query.iter(world).count()
    };
    let report = app.world().resource::<Report>();
    println!(
        "Shots: {}, hits: {}, damage: {:.1}, kills: {}, destruction fields: {} (pending: {})",
        report.shots, report.hits, report.damage_dealt, report.kills, report.fields, pending_fields
    );
    println!("Simulation complete!");
}
