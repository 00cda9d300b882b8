//! Physics Weapon Simulation Core
//!
//! ECS-слой оружия персонажа на Bevy 0.16:
//! - attachment (attach-once, input registration, detach)
//! - fire feedback (sound, montage, WeaponFired)
//! - damage dispatch (Point / Radial / Undirected + destruction field)
//!
//! Хост (engine bridge) владеет рендером, звуком, анимацией, trace и fracture
//! физикой; общение только через события.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod combat;
pub mod components;
pub mod input;
pub mod logger;
pub mod weapon;

// Re-export для удобства
pub use combat::{ActorKilled, DamageResponsePlugin, DamageTaken, DamageTypeDef, DamageTypes};
pub use components::*;
pub use input::{EnhancedInput, InputActionEvent, MappingContext, RawInputEvent, WeaponInputPlugin};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use weapon::{
    attach_weapon, detach_weapon, AssetRef, AttachError, AttachWeaponIntent, DamageConfig, DamageRequest,
    DamageTypeId, DestructionField, DetachWeaponIntent, FieldInstantiated, FireIntent, HitResolved, HitResult,
    ImpulseType, PhysicsWeapon, PlayMontage, PlaySoundAtLocation, WeaponAttachRejected, WeaponAttached,
    WeaponAttachment, WeaponConfig, WeaponDetached, WeaponFired, WeaponPlugin, WeaponSet,
};

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Seed из create_headless_app не перетираем
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.add_plugins((WeaponPlugin, WeaponInputPlugin, DamageResponsePlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Snapshot мира для сравнения детерминизма
///
/// Компоненты сериализуются через Debug, отсортированные по Entity index.
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();
    entities.sort_by_key(|(entity, _)| entity.index());

    let mut snapshot = Vec::new();
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
