//! Общие helpers для integration тестов: headless App + сцена + сбор событий

#![allow(dead_code)]

use bevy::prelude::*;
use physics_weapon::*;

/// Все события E, прочитанные за время теста
#[derive(Resource)]
pub struct Captured<E: Event + Clone>(pub Vec<E>);

impl<E: Event + Clone> Default for Captured<E> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

fn capture<E: Event + Clone>(mut events: EventReader<E>, mut captured: ResMut<Captured<E>>) {
    captured.0.extend(events.read().cloned());
}

/// Подписывает тест на событие E (читается в Last, после всех weapon систем)
pub fn capture_events<E: Event + Clone>(app: &mut App) {
    app.init_resource::<Captured<E>>()
        .add_systems(Last, capture::<E>);
}

pub fn captured<E: Event + Clone>(app: &App) -> Vec<E> {
    app.world().resource::<Captured<E>>().0.clone()
}

pub fn clear_captured<E: Event + Clone>(app: &mut App) {
    app.world_mut().resource_mut::<Captured<E>>().0.clear();
}

/// Helper: полный weapon App с захватом всех выходных событий
pub fn create_weapon_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);

    capture_events::<WeaponAttached>(&mut app);
    capture_events::<WeaponAttachRejected>(&mut app);
    capture_events::<WeaponDetached>(&mut app);
    capture_events::<PlaySoundAtLocation>(&mut app);
    capture_events::<PlayMontage>(&mut app);
    capture_events::<WeaponFired>(&mut app);
    capture_events::<DamageRequest>(&mut app);
    capture_events::<DamageTaken>(&mut app);
    capture_events::<ActorKilled>(&mut app);

    app
}

pub struct PlayerScene {
    pub controller: Entity,
    pub mesh: Entity,
    pub character: Entity,
}

/// Baseline контекст персонажа: Touch1 → Jump (перекрывается weapon context)
pub fn baseline_context() -> MappingContext {
    MappingContext::new("Default")
        .with_mapping("SpaceBar", "Jump")
        .with_mapping("Touch1", "Jump")
}

/// Weapon config: Touch1/LMB → Fire, sound + montage настроены
pub fn rifle_config() -> WeaponConfig {
    let mut config = WeaponConfig::default()
        .with_fire_sound("sounds/rifle_shot")
        .with_fire_animation("anims/fp_fire");
    config.input.mapping_context = MappingContext::new("Weapons")
        .with_mapping("LeftMouseButton", "Fire")
        .with_mapping("Touch1", "Fire");
    config
}

/// Helper: spawn player персонажа (controller + mesh с GripPoint + animation instance)
pub fn spawn_player(app: &mut App, position: Vec3) -> PlayerScene {
    let world = app.world_mut();

    let mut input = EnhancedInput::default();
    input.add_mapping_context(baseline_context(), 0);
    let controller = world.spawn((Controller::Player, input)).id();
    let mesh = world
        .spawn((
            Transform::default(),
            FirstPersonMesh::default().with_socket(GRIP_POINT, Transform::from_xyz(20.0, -8.0, -4.0)),
            AnimationInstance,
        ))
        .id();
    let character = world
        .spawn((
            Transform::from_translation(position),
            Character::new(mesh).with_controller(controller),
        ))
        .id();

    PlayerScene {
        controller,
        mesh,
        character,
    }
}

pub fn spawn_weapon(app: &mut App, config: WeaponConfig) -> Entity {
    app.world_mut().spawn(PhysicsWeapon::new(config)).id()
}

/// Attach через intent + один update
pub fn attach(app: &mut App, weapon: Entity, character: Entity) {
    app.world_mut().send_event(AttachWeaponIntent {
        weapon,
        character: Some(character),
    });
    app.update();
}

pub fn press(app: &mut App, controller: Entity, key: &str) {
    app.world_mut().send_event(RawInputEvent {
        controller,
        key: physics_weapon::input::InputKey::new(key),
        trigger: physics_weapon::input::TriggerEvent::Triggered,
    });
    app.update();
}

pub fn input_of(app: &App, controller: Entity) -> &EnhancedInput {
    app.world()
        .get::<EnhancedInput>(controller)
        .expect("controller has EnhancedInput")
}
