//! Damage response типы: damage type registry + события результата
//!
//! DamageRequest (из weapon dispatch) → apply_damage_requests → Health/impulse
//! → DamageTaken / ActorKilled (для UI, звуков, эффектов).

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::weapon::DamageTypeId;

/// Физические свойства типа урона
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DamageTypeDef {
    /// Величина impulse на rigid body при полном уроне
    pub impulse: f32,
}

/// Registry типов урона
///
/// Неизвестный id → нулевой impulse (урон всё равно применяется).
#[derive(Resource, Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DamageTypes {
    #[serde(default)]
    pub types: HashMap<DamageTypeId, DamageTypeDef>,
}

impl DamageTypes {
    pub fn with_type(mut self, id: impl Into<String>, def: DamageTypeDef) -> Self {
        self.types.insert(DamageTypeId::new(id), def);
        self
    }

    pub fn get(&self, id: &DamageTypeId) -> Option<&DamageTypeDef> {
        self.types.get(id)
    }

    pub fn impulse_of(&self, id: &DamageTypeId) -> f32 {
        self.get(id).map_or(0.0, |def| def.impulse)
    }
}

/// Как был нанесён урон
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DamageKind {
    Point,
    Radial,
    Undirected,
}

/// Событие: актор получил урон
#[derive(Event, Debug, Clone, PartialEq)]
pub struct DamageTaken {
    pub target: Entity,
    pub causer: Entity,
    pub instigator: Option<Entity>,
    /// Реально снятое здоровье (после falloff и clamp)
    pub amount: f32,
    pub kind: DamageKind,
}

/// Событие: актор умер (health дошло до 0 от этого урона)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorKilled {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Линейный falloff радиального урона: 1 в центре, 0 на границе радиуса
///
/// Вне радиуса (или радиус ≤ 0) → 0.
pub fn radial_falloff(distance: f32, radius: f32) -> f32 {
    if !(radius > 0.0) || distance > radius {
        return 0.0;
    }
    (1.0 - distance / radius).clamp(0.0, 1.0)
}
