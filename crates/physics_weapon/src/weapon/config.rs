//! Weapon configuration
//!
//! Plain config structs вместо editor-exposed properties. Хост (или RON файл)
//! заполняет их до attach; после этого `PhysicsWeapon` отдаёт только `&WeaponConfig`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::GRIP_POINT;
use crate::input::{InputActionId, MappingContext};

/// Default offset дула от позиции персонажа (+X forward, +Z up)
pub const DEFAULT_MUZZLE_OFFSET: Vec3 = Vec3::new(100.0, 0.0, 10.0);

/// Priority weapon mapping context: перекрывает baseline (Jump) на touch input
pub const WEAPON_MAPPING_PRIORITY: i32 = 1;

/// Opaque ссылка на asset хоста (sound, montage, prefab)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(pub String);

impl AssetRef {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Opaque tag типа урона (резолвится damage response через `DamageTypes`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DamageTypeId(pub String);

impl DamageTypeId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl Default for DamageTypeId {
    fn default() -> Self {
        Self::new("Default")
    }
}

/// Как урон применяется в пространстве
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ImpulseType {
    /// Undirected damage по struck actor
    #[default]
    None,
    /// Point damage вдоль -impact_normal
    Linear,
    /// Radial damage вокруг impact point (falloff_radius)
    Radial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageConfig {
    pub damage_amount: f32,
    #[serde(default)]
    pub damage_type: DamageTypeId,
    #[serde(default)]
    pub impulse_type: ImpulseType,
    /// Только для `ImpulseType::Radial`
    #[serde(default)]
    pub falloff_radius: f32,
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self {
            damage_amount: 20.0,
            damage_type: DamageTypeId::default(),
            impulse_type: ImpulseType::None,
            falloff_radius: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponInputConfig {
    pub mapping_context: MappingContext,
    pub fire_action: InputActionId,
    #[serde(default = "default_mapping_priority")]
    pub priority: i32,
}

impl Default for WeaponInputConfig {
    fn default() -> Self {
        Self {
            mapping_context: MappingContext::new("Weapons").with_mapping("LeftMouseButton", "Fire"),
            fire_action: InputActionId::new("Fire"),
            priority: WEAPON_MAPPING_PRIORITY,
        }
    }
}

fn default_mapping_priority() -> i32 {
    WEAPON_MAPPING_PRIORITY
}

fn default_muzzle_offset() -> Vec3 {
    DEFAULT_MUZZLE_OFFSET
}

fn default_attach_socket() -> String {
    GRIP_POINT.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponConfig {
    #[serde(default = "default_muzzle_offset")]
    pub muzzle_offset: Vec3,
    #[serde(default)]
    pub fire_sound: Option<AssetRef>,
    #[serde(default)]
    pub fire_animation: Option<AssetRef>,
    #[serde(default = "default_attach_socket")]
    pub attach_socket: String,
    #[serde(default)]
    pub input: WeaponInputConfig,
    #[serde(default)]
    pub damage: DamageConfig,
    /// Prefab destruction field, спавнится на каждый hit
    pub destruction_field: AssetRef,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            muzzle_offset: DEFAULT_MUZZLE_OFFSET,
            fire_sound: None,
            fire_animation: None,
            attach_socket: default_attach_socket(),
            input: WeaponInputConfig::default(),
            damage: DamageConfig::default(),
            destruction_field: AssetRef::new("fields/master_field"),
        }
    }
}

#[derive(Debug, Error)]
pub enum WeaponConfigError {
    #[error("RON parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("damage amount must be a non-negative number, got {0}")]
    InvalidDamageAmount(f32),

    #[error("radial impulse requires a positive falloff radius, got {0}")]
    InvalidFalloffRadius(f32),

    #[error("fire action is not set")]
    MissingFireAction,

    #[error("destruction field prefab is not set")]
    MissingDestructionField,
}

impl WeaponConfig {
    pub fn from_ron(source: &str) -> Result<Self, WeaponConfigError> {
        let config: WeaponConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), WeaponConfigError> {
        let damage = &self.damage;
        if !(damage.damage_amount >= 0.0) {
            return Err(WeaponConfigError::InvalidDamageAmount(damage.damage_amount));
        }
        if damage.impulse_type == ImpulseType::Radial && !(damage.falloff_radius > 0.0) {
            return Err(WeaponConfigError::InvalidFalloffRadius(damage.falloff_radius));
        }
        if self.input.fire_action.is_empty() {
            return Err(WeaponConfigError::MissingFireAction);
        }
        if self.destruction_field.is_empty() {
            return Err(WeaponConfigError::MissingDestructionField);
        }
        Ok(())
    }

    pub fn with_damage(mut self, damage: DamageConfig) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_fire_sound(mut self, sound: impl Into<String>) -> Self {
        self.fire_sound = Some(AssetRef::new(sound));
        self
    }

    pub fn with_fire_animation(mut self, montage: impl Into<String>) -> Self {
        self.fire_animation = Some(AssetRef::new(montage));
        self
    }
}
