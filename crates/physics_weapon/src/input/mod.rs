//! Weapon input module
//!
//! Local-player input subsystem: prioritized mapping contexts + explicit
//! handler table. Заменяет reflective "BindAction(this, &Fire)" на таблицу
//! `ActionBinding`, которой владеет attachment controller через handle.
//!
//! # Архитектура
//!
//! ```text
//! Host input (keyboard/touch)
//!     ↓
//! RawInputEvent (controller, key, trigger)
//!     ↓ map_raw_input — highest-priority mapping context
//! InputActionEvent (controller, action, trigger)
//!     ↓ dispatch_action_bindings — handler table
//! FireIntent (weapon)
//! ```
//!
//! # Компоненты модуля
//!
//! - `context` - MappingContext, EnhancedInput, InputContexts (resolve)
//! - `events` - RawInputEvent, InputActionEvent
//! - `systems` - mapping + dispatch systems

use bevy::prelude::*;

pub mod context;
pub mod events;
pub mod systems;

#[cfg(test)]
mod context_tests;

// Re-exports для external use
pub use context::*;
pub use events::*;
pub use systems::*;

use crate::weapon::WeaponSet;

/// Input plugin: raw input → actions → handlers
pub struct WeaponInputPlugin;

impl Plugin for WeaponInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<RawInputEvent>()
            .add_event::<InputActionEvent>()
            .add_systems(
                Update,
                (map_raw_input, dispatch_action_bindings)
                    .chain()
                    .in_set(WeaponSet::Input),
            );
    }
}
