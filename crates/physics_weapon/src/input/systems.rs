//! Input systems (ECS)
//!
//! - `map_raw_input`: RawInputEvent → InputActionEvent (mapping contexts)
//! - `dispatch_action_bindings`: InputActionEvent → handler (FireIntent)

use bevy::prelude::*;

use super::context::{EnhancedInput, InputHandler};
use super::events::{InputActionEvent, RawInputEvent};
use crate::weapon::FireIntent;

/// Резолвит raw key через mapping contexts controller'а
///
/// Key без mapping → отбрасывается (не ошибка).
/// Controller без EnhancedInput (AI, despawned) → отбрасывается.
pub fn map_raw_input(
    mut raw_events: EventReader<RawInputEvent>,
    subsystems: Query<&EnhancedInput>,
    mut action_events: EventWriter<InputActionEvent>,
) {
    for raw in raw_events.read() {
        let Ok(subsystem) = subsystems.get(raw.controller) else {
            continue;
        };

        let Some(action) = subsystem.resolve_key(&raw.key) else {
            continue;
        };

        action_events.write(InputActionEvent {
            controller: raw.controller,
            action: action.clone(),
            trigger: raw.trigger,
        });
    }
}

/// Вызывает handlers из binding table
///
/// Один InputActionEvent → максимум один FireIntent на binding.
pub fn dispatch_action_bindings(
    mut action_events: EventReader<InputActionEvent>,
    subsystems: Query<&EnhancedInput>,
    mut fire_intents: EventWriter<FireIntent>,
) {
    for event in action_events.read() {
        let Ok(subsystem) = subsystems.get(event.controller) else {
            continue;
        };

        for handler in subsystem.handlers_for(&event.action, event.trigger) {
            match handler {
                InputHandler::FireWeapon(weapon) => {
                    fire_intents.write(FireIntent { weapon });
                }
            }
        }
    }
}
