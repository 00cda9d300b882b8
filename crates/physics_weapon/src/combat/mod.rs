//! Damage response module
//!
//! Reference реализация damage collaborator'а: принимает DamageRequest от
//! weapon dispatch и применяет его к Health + rapier `ExternalImpulse`.
//! Хост может заменить его своим (тогда просто не добавлять plugin).

use bevy::prelude::*;

pub mod damage;
pub mod systems;

pub use damage::*;
pub use systems::apply_damage_requests;

use crate::weapon::WeaponSet;

/// Damage Response Plugin
///
/// Регистрирует DamageTaken / ActorKilled и `apply_damage_requests`
/// в `WeaponSet::Response` (после dispatch в том же кадре).
pub struct DamageResponsePlugin;

impl Plugin for DamageResponsePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DamageTypes>()
            .add_event::<DamageTaken>()
            .add_event::<ActorKilled>()
            .add_systems(Update, apply_damage_requests.in_set(WeaponSet::Response));
    }
}
