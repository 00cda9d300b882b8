//! Fire feedback: sound, montage, WeaponFired
//!
//! Architecture:
//! - ECS: решает, стрелять ли (attached + controlled), считает muzzle location
//! - Хост: проигрывает sound/montage, делает trace и присылает HitResolved
//! - Events: FireIntent (input/AI → ECS), PlaySoundAtLocation / PlayMontage /
//!   WeaponFired (ECS → хост)

use bevy::prelude::*;

use super::config::{AssetRef, WeaponConfig};
use super::{PhysicsWeapon, WeaponAttachment};
use crate::components::{AnimationInstance, Character, Controller, WorldTransforms};
use crate::logger::log;

/// Montage всегда играет на нормальной скорости
pub const MONTAGE_PLAY_RATE: f32 = 1.0;

/// Event: оружие должно выстрелить (fire binding или scripted AI)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireIntent {
    pub weapon: Entity,
}

/// Event: проиграть sound в world position (fire-and-forget, ECS → хост)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct PlaySoundAtLocation {
    pub sound: AssetRef,
    pub location: Vec3,
}

/// Event: проиграть montage на animation instance mesh'а (ECS → хост)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct PlayMontage {
    pub mesh: Entity,
    pub montage: AssetRef,
    pub play_rate: f32,
}

/// Event: выстрел состоялся (ECS → хост trace/projectile)
///
/// Хост делает trace из `muzzle_location` вдоль `aim_direction` и отвечает
/// `HitResolved`, если попал.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct WeaponFired {
    pub weapon: Entity,
    pub shooter: Entity,
    pub muzzle_location: Vec3,
    pub aim_direction: Vec3,
}

/// World position дула: character location + rotation * offset
pub fn muzzle_location(character: &Transform, muzzle_offset: Vec3) -> Vec3 {
    character.translation + character.rotation * muzzle_offset
}

/// Всё, что Fire отправляет хосту за один выстрел
#[derive(Debug, Clone, PartialEq)]
pub struct FireFeedback {
    pub sound: Option<PlaySoundAtLocation>,
    pub montage: Option<PlayMontage>,
    pub fired: WeaponFired,
}

/// Собирает feedback выстрела (pure, без ECS)
///
/// `character` — world transform персонажа. `animated_mesh` — first-person
/// mesh, если у него резолвится animation instance; иначе montage пропускается.
pub fn fire_feedback(
    weapon: Entity,
    shooter: Entity,
    config: &WeaponConfig,
    character: &Transform,
    animated_mesh: Option<Entity>,
) -> FireFeedback {
    let sound = config.fire_sound.as_ref().map(|sound| PlaySoundAtLocation {
        sound: sound.clone(),
        location: character.translation,
    });

    let montage = match (config.fire_animation.as_ref(), animated_mesh) {
        (Some(montage), Some(mesh)) => Some(PlayMontage {
            mesh,
            montage: montage.clone(),
            play_rate: MONTAGE_PLAY_RATE,
        }),
        _ => None,
    };

    FireFeedback {
        sound,
        montage,
        fired: WeaponFired {
            weapon,
            shooter,
            muzzle_location: muzzle_location(character, config.muzzle_offset),
            aim_direction: character.rotation * Vec3::X,
        },
    }
}

/// System: FireIntent → feedback events
///
/// No-op (без ошибки) если оружие не attached или у персонажа нет controller.
pub fn process_fire_intents(
    mut intents: EventReader<FireIntent>,
    weapons: Query<(&PhysicsWeapon, &WeaponAttachment)>,
    characters: Query<&Character>,
    transforms: WorldTransforms,
    controllers: Query<(), With<Controller>>,
    animated: Query<(), With<AnimationInstance>>,
    mut sounds: EventWriter<PlaySoundAtLocation>,
    mut montages: EventWriter<PlayMontage>,
    mut fired_events: EventWriter<WeaponFired>,
) {
    for intent in intents.read() {
        let Ok((weapon, attachment)) = weapons.get(intent.weapon) else {
            continue;
        };

        let Some(shooter) = attachment.character() else {
            log(&format!("Fire ignored: weapon {:?} is not attached", intent.weapon));
            continue;
        };

        let Ok(character) = characters.get(shooter) else {
            continue;
        };

        // Controller должен существовать (Player или AI)
        let controlled = character
            .controller
            .is_some_and(|controller| controllers.contains(controller));
        if !controlled {
            log(&format!("Fire ignored: character {:?} has no controller", shooter));
            continue;
        }

        // Персонаж может быть child'ом (vehicle, platform) — нужна world позиция
        let transform = transforms.get(shooter).unwrap_or(Transform::IDENTITY);
        let animated_mesh = animated
            .contains(character.mesh_1p)
            .then_some(character.mesh_1p);
        let feedback = fire_feedback(
            intent.weapon,
            shooter,
            weapon.config(),
            &transform,
            animated_mesh,
        );

        if let Some(sound) = feedback.sound {
            sounds.write(sound);
        }
        if let Some(montage) = feedback.montage {
            montages.write(montage);
        }
        fired_events.write(feedback.fired);
    }
}
