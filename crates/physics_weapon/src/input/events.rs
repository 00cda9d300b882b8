//! Input events
//!
//! `RawInputEvent` эмитит хост (engine bridge) каждый раз когда key меняет
//! состояние. `InputActionEvent` — уже разрешённое действие.

use bevy::prelude::*;

use super::context::{InputActionId, InputKey, TriggerEvent};

/// Raw key event от хоста
///
/// # Fields
/// - `controller`: player controller, которому принадлежит input
/// - `key`: физическая клавиша / touch zone
/// - `trigger`: фаза (Started / Triggered / Completed)
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct RawInputEvent {
    pub controller: Entity,
    pub key: InputKey,
    pub trigger: TriggerEvent,
}

/// Action, разрешённый через активные mapping contexts
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct InputActionEvent {
    pub controller: Entity,
    pub action: InputActionId,
    pub trigger: TriggerEvent,
}
