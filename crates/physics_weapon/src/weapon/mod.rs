//! Weapon module: attachment, fire feedback, damage dispatch
//!
//! ECS ответственность:
//! - Attachment state machine (Unattached → Attached → Detached)
//! - Input registration (mapping context + fire binding) через handle
//! - Fire feedback requests (sound, montage) + WeaponFired
//! - Damage dispatch (Point / Radial / Undirected) + destruction field spawn
//!
//! Хост ответственность:
//! - Проигрывание sound/montage, projectile trace → HitResolved
//! - Physics/fracture симуляция destruction field
//!
//! # Events flow
//!
//! ```text
//! AttachWeaponIntent → process_attach_intents → WeaponAttached / WeaponAttachRejected
//! FireIntent → process_fire_intents → PlaySoundAtLocation, PlayMontage, WeaponFired
//! (host trace) HitResolved → dispatch_weapon_damage → DamageRequest + DestructionField
//! (host) FieldInstantiated → despawn_consumed_fields → field entity despawned
//! despawn / DetachWeaponIntent → detach → WeaponDetached
//! ```

use bevy::prelude::*;

pub mod attachment;
pub mod config;
pub mod dispatch;
pub mod fire;


pub use attachment::*;
pub use config::*;
pub use dispatch::*;
pub use fire::*;

/// Оружие, которое держит персонаж
///
/// Config неизменяем после создания (только `config()`), поэтому dispatch
/// читает его без синхронизации. Состояние attachment — отдельный компонент.
#[derive(Component, Debug, Clone, Default)]
#[require(WeaponAttachment, Transform)]
pub struct PhysicsWeapon {
    config: WeaponConfig,
}

impl PhysicsWeapon {
    pub fn new(config: WeaponConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WeaponConfig {
        &self.config
    }
}

/// Порядок выполнения weapon pipeline внутри `Update`
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeaponSet {
    /// Raw input → actions → FireIntent
    Input,
    /// Attach / detach intents
    Attachment,
    /// FireIntent → feedback
    Fire,
    /// HitResolved → DamageRequest + DestructionField
    Dispatch,
    /// DamageRequest → Health / impulses
    Response,
}

/// Weapon Plugin
///
/// Регистрирует weapon события и системы в Update.
///
/// Порядок выполнения (WeaponSet chain):
/// 1. Input — mapping contexts + binding dispatch (WeaponInputPlugin)
/// 2. Attachment — process_attach_intents, process_detach_intents
/// 3. Fire — process_fire_intents
/// 4. Dispatch — despawn_consumed_fields, dispatch_weapon_damage
/// 5. Response — apply_damage_requests (DamageResponsePlugin)
///
/// Despawn оружия → observer `detach_on_weapon_removed` (end-of-life cleanup).
pub struct WeaponPlugin;

impl Plugin for WeaponPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<AttachWeaponIntent>()
            .add_event::<DetachWeaponIntent>()
            .add_event::<WeaponAttached>()
            .add_event::<WeaponAttachRejected>()
            .add_event::<WeaponDetached>()
            .add_event::<FireIntent>()
            .add_event::<PlaySoundAtLocation>()
            .add_event::<PlayMontage>()
            .add_event::<WeaponFired>()
            .add_event::<HitResolved>()
            .add_event::<DamageRequest>();

        app.configure_sets(
            Update,
            (
                WeaponSet::Input,
                WeaponSet::Attachment,
                WeaponSet::Fire,
                WeaponSet::Dispatch,
                WeaponSet::Response,
            )
                .chain(),
        );

        app.add_systems(
            Update,
            (
                (process_attach_intents, process_detach_intents)
                    .chain()
                    .in_set(WeaponSet::Attachment),
                process_fire_intents.in_set(WeaponSet::Fire),
                (despawn_consumed_fields, dispatch_weapon_damage)
                    .chain()
                    .in_set(WeaponSet::Dispatch),
            ),
        );

        app.add_observer(detach_on_weapon_removed);
    }
}
