//! Controller — кто управляет персонажем

use bevy::prelude::*;

/// Controlling agent персонажа
///
/// - `Player`: локальный игрок, несёт `EnhancedInput` (input subsystem)
/// - `Ai`: scripted/AI — input subsystem нет, Fire приходит через `FireIntent`
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub enum Controller {
    Player,
    Ai,
}

impl Controller {
    pub fn is_player(&self) -> bool {
        matches!(self, Controller::Player)
    }
}
