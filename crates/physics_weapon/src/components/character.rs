//! Character компоненты: носитель оружия

use bevy::prelude::*;

/// Персонаж, способный держать оружие
///
/// `mesh_1p` — first-person mesh (viewmodel) с sockets для attachment.
/// `controller` — кто управляет персонажем (Player/AI), может отсутствовать.
///
/// Автоматически добавляет HeldWeapon через Required Components.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(HeldWeapon)]
pub struct Character {
    pub mesh_1p: Entity,
    pub controller: Option<Entity>,
}

impl Character {
    pub fn new(mesh_1p: Entity) -> Self {
        Self {
            mesh_1p,
            controller: None,
        }
    }

    pub fn with_controller(mut self, controller: Entity) -> Self {
        self.controller = Some(controller);
        self
    }
}

/// Registry оружия персонажа: максимум одно оружие одновременно
///
/// Пишет только attachment controller (attach → Some, detach → None).
/// Проверка "уже вооружён" — lookup сюда, без сканирования компонентов.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldWeapon(pub Option<Entity>);

impl HeldWeapon {
    pub fn weapon(&self) -> Option<Entity> {
        self.0
    }

    pub fn is_armed(&self) -> bool {
        self.0.is_some()
    }
}
