//! Damage dispatcher: HitResolved → DamageRequest + DestructionField
//!
//! Три стратегии по `ImpulseType`:
//! - `Linear` → Point damage (direction = -impact_normal)
//! - `Radial` → Radial damage вокруг impact point (ignore: owner)
//! - `None` → Undirected damage по struck actor
//!
//! Destruction field спавнится на каждый dispatch, независимо от ветки.

use bevy::prelude::*;

use super::config::{AssetRef, DamageConfig, DamageTypeId, ImpulseType};
use super::{PhysicsWeapon, WeaponAttachment};
use crate::components::Character;
use crate::logger::{log, log_error};

/// Результат trace/projectile от хоста (transient, читается один раз)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    /// Struck actor (None — попали в мир без актора)
    pub actor: Option<Entity>,
    pub impact_point: Vec3,
    pub impact_normal: Vec3,
    /// Hit/impulse normal (информативно, dispatch использует impact_normal)
    pub normal: Vec3,
}

impl HitResult {
    pub fn new(actor: Option<Entity>, impact_point: Vec3, impact_normal: Vec3) -> Self {
        Self {
            actor,
            impact_point,
            impact_normal,
            normal: impact_normal,
        }
    }
}

/// Event: хост разрешил попадание выстрела (Godot → ECS аналог ProjectileHit)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HitResolved {
    pub weapon: Entity,
    pub hit: HitResult,
}

/// Кто наносит урон: owner оружия и его controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageInstigator {
    /// Damage causer (owning character)
    pub character: Entity,
    /// Instigator controller (может отсутствовать)
    pub controller: Option<Entity>,
}

/// Event: запрос на нанесение урона (ECS → damage response / хост)
#[derive(Event, Debug, Clone, PartialEq)]
pub enum DamageRequest {
    Point {
        target: Entity,
        amount: f32,
        /// Всегда -impact_normal
        direction: Vec3,
        hit: HitResult,
        instigator: Option<Entity>,
        causer: Entity,
        damage_type: DamageTypeId,
    },
    Radial {
        origin: Vec3,
        radius: f32,
        amount: f32,
        damage_type: DamageTypeId,
        /// Содержит owning character (нет self-damage)
        ignore: Vec<Entity>,
        causer: Entity,
        instigator: Option<Entity>,
    },
    Undirected {
        target: Entity,
        amount: f32,
        instigator: Option<Entity>,
        causer: Entity,
        damage_type: DamageTypeId,
    },
}

impl DamageRequest {
    pub fn amount(&self) -> f32 {
        match self {
            DamageRequest::Point { amount, .. }
            | DamageRequest::Radial { amount, .. }
            | DamageRequest::Undirected { amount, .. } => *amount,
        }
    }

    pub fn causer(&self) -> Entity {
        match self {
            DamageRequest::Point { causer, .. }
            | DamageRequest::Radial { causer, .. }
            | DamageRequest::Undirected { causer, .. } => *causer,
        }
    }

    pub fn damage_type(&self) -> &DamageTypeId {
        match self {
            DamageRequest::Point { damage_type, .. }
            | DamageRequest::Radial { damage_type, .. }
            | DamageRequest::Undirected { damage_type, .. } => damage_type,
        }
    }
}

/// Выбор стратегии урона (pure)
///
/// Owner обязателен на уровне типа: dispatch для unattached оружия не
/// строится вообще. None — Point/Undirected без struck actor (урон некому
/// наносить, field всё равно спавнится).
pub fn build_damage_request(
    config: &DamageConfig,
    hit: &HitResult,
    owner: DamageInstigator,
) -> Option<DamageRequest> {
    let ignore = vec![owner.character];

    match config.impulse_type {
        ImpulseType::Linear => hit.actor.map(|target| DamageRequest::Point {
            target,
            amount: config.damage_amount,
            direction: -hit.impact_normal,
            hit: *hit,
            instigator: owner.controller,
            causer: owner.character,
            damage_type: config.damage_type.clone(),
        }),
        ImpulseType::Radial => Some(DamageRequest::Radial {
            origin: hit.impact_point,
            radius: config.falloff_radius,
            amount: config.damage_amount,
            damage_type: config.damage_type.clone(),
            ignore,
            causer: owner.character,
            instigator: owner.controller,
        }),
        ImpulseType::None => hit.actor.map(|target| DamageRequest::Undirected {
            target,
            amount: config.damage_amount,
            instigator: owner.controller,
            causer: owner.character,
            damage_type: config.damage_type.clone(),
        }),
    }
}

/// Rotation, у которой forward (+X) смотрит вдоль `direction`
///
/// Yaw вокруг +Z, pitch от горизонтали, без roll. Нулевой вектор → identity.
pub fn facing_rotation(direction: Vec3) -> Quat {
    let Some(dir) = direction.try_normalize() else {
        return Quat::IDENTITY;
    };

    let yaw = dir.y.atan2(dir.x);
    let pitch = dir.z.atan2(dir.truncate().length());
    Quat::from_rotation_z(yaw) * Quat::from_rotation_y(-pitch)
}

/// Transform destruction field: impact point, facing -impact_normal, scale 1
pub fn destruction_field_transform(hit: &HitResult) -> Transform {
    Transform {
        translation: hit.impact_point,
        rotation: facing_rotation(-hit.impact_normal),
        scale: Vec3::ONE,
    }
}

/// Destruction field, заспавненный попаданием
///
/// Хост инстанцирует `prefab` в transform entity и запускает fracture
/// симуляцию. ECS результат не ждёт.
///
/// # Lifecycle
/// Entity — одноразовый spawn request. Хост вешает `FieldInstantiated`
/// после инстанцирования prefab'а; `despawn_consumed_fields` удаляет такие
/// entity на следующем кадре. Сам fracture живёт на стороне хоста.
#[derive(Component, Debug, Clone, PartialEq)]
#[require(Transform)]
pub struct DestructionField {
    pub prefab: AssetRef,
    pub weapon: Entity,
    pub causer: Entity,
}

/// Маркер: хост инстанцировал prefab, field entity больше не нужна
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct FieldInstantiated;

/// System: despawn destruction fields, которые хост уже забрал
///
/// Работает в WeaponSet::Dispatch до `dispatch_weapon_damage`, поэтому
/// field текущего кадра хост всегда успевает увидеть.
pub fn despawn_consumed_fields(
    mut commands: Commands,
    consumed: Query<Entity, (With<DestructionField>, With<FieldInstantiated>)>,
) {
    for entity in &consumed {
        commands.entity(entity).despawn();
    }
}

/// System: HitResolved → DamageRequest + DestructionField
///
/// Hit для unattached оружия — нарушение контракта вызывающего
/// (gate на attachment state до отправки HitResolved): логируем error, ничего
/// не эмитим.
pub fn dispatch_weapon_damage(
    mut commands: Commands,
    mut hits: EventReader<HitResolved>,
    weapons: Query<(&PhysicsWeapon, &WeaponAttachment)>,
    characters: Query<&Character>,
    mut damage_requests: EventWriter<DamageRequest>,
) {
    for HitResolved { weapon, hit } in hits.read() {
        let Ok((physics_weapon, attachment)) = weapons.get(*weapon) else {
            log_error(&format!("HitResolved for unknown weapon {:?}", weapon));
            continue;
        };

        let Some(character) = attachment.character() else {
            log_error(&format!(
                "HitResolved for unattached weapon {:?}: caller must gate on attachment",
                weapon
            ));
            continue;
        };

        let owner = DamageInstigator {
            character,
            controller: characters
                .get(character)
                .ok()
                .and_then(|character| character.controller),
        };
        let config = physics_weapon.config();

        if let Some(request) = build_damage_request(&config.damage, hit, owner) {
            log(&format!(
                "💥 Weapon {:?} dispatches {:?} damage {:.1}",
                weapon, config.damage.impulse_type, request.amount()
            ));
            damage_requests.write(request);
        }

        commands.spawn((
            DestructionField {
                prefab: config.destruction_field.clone(),
                weapon: *weapon,
                causer: character,
            },
            destruction_field_transform(hit),
        ));
    }
}
