//! Damage response system: применение DamageRequest к Health и rigid bodies.

use bevy::prelude::*;
use bevy_rapier3d::prelude::ExternalImpulse;

use crate::combat::{radial_falloff, ActorKilled, DamageKind, DamageTaken, DamageTypes};
use crate::components::{Health, WorldTransforms};
use crate::logger::log;
use crate::weapon::DamageRequest;

/// Цели урона: всё, у чего есть Health или dynamic body (ExternalImpulse)
pub type DamageTargets<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        Option<&'static mut Health>,
        Option<&'static mut ExternalImpulse>,
    ),
    Or<(With<Health>, With<ExternalImpulse>)>,
>;

/// Итог одного попадания по одной цели
struct Application {
    amount: f32,
    impulse: Vec3,
}

/// Применяет урон + impulse к одной цели
///
/// Возвращает (снятое здоровье, умер ли от этого урона); None — у цели нет Health.
fn apply_to_target(
    health: Option<Mut<Health>>,
    body: Option<Mut<ExternalImpulse>>,
    application: Application,
) -> Option<(f32, bool)> {
    if let Some(mut body) = body {
        if application.impulse != Vec3::ZERO {
            body.impulse += application.impulse;
        }
    }

    let mut health = health?;
    let was_alive = health.is_alive();
    let applied = health.take_damage(application.amount);
    Some((applied, was_alive && !health.is_alive()))
}

/// System: DamageRequest → Health / ExternalImpulse
///
/// - Point: урон по target + impulse вдоль direction
/// - Radial: все цели в радиусе кроме ignore, урон и impulse × falloff
/// - Undirected: только урон по target
///
/// Генерирует DamageTaken на каждое применение к Health и ActorKilled при смерти.
pub fn apply_damage_requests(
    mut requests: EventReader<DamageRequest>,
    damage_types: Res<DamageTypes>,
    mut targets: DamageTargets,
    transforms: WorldTransforms,
    mut damage_taken_events: EventWriter<DamageTaken>,
    mut killed_events: EventWriter<ActorKilled>,
) {
    for request in requests.read() {
        let type_impulse = damage_types.impulse_of(request.damage_type());
        let causer = request.causer();

        // (target, instigator, kind, снятое здоровье, умер)
        let mut outcomes: Vec<(Entity, Option<Entity>, DamageKind, f32, bool)> = Vec::new();

        match request {
            DamageRequest::Point {
                target,
                amount,
                direction,
                instigator,
                ..
            } => {
                let Ok((entity, health, body)) = targets.get_mut(*target) else {
                    log(&format!("Point damage: target {:?} has no Health/body, skipped", target));
                    continue;
                };
                let application = Application {
                    amount: *amount,
                    impulse: direction.normalize_or_zero() * type_impulse,
                };
                if let Some((applied, died)) = apply_to_target(health, body, application) {
                    outcomes.push((entity, *instigator, DamageKind::Point, applied, died));
                }
            }
            DamageRequest::Radial {
                origin,
                radius,
                amount,
                ignore,
                instigator,
                ..
            } => {
                for (entity, health, body) in targets.iter_mut() {
                    if ignore.contains(&entity) {
                        continue;
                    }
                    // Distance в world space (цель может быть child'ом)
                    let Some(position) = transforms.translation(entity) else {
                        continue;
                    };

                    let offset = position - *origin;
                    let falloff = radial_falloff(offset.length(), *radius);
                    if falloff <= 0.0 {
                        continue;
                    }

                    let application = Application {
                        amount: amount * falloff,
                        impulse: offset.normalize_or_zero() * type_impulse * falloff,
                    };
                    if let Some((applied, died)) = apply_to_target(health, body, application) {
                        outcomes.push((entity, *instigator, DamageKind::Radial, applied, died));
                    }
                }
            }
            DamageRequest::Undirected {
                target,
                amount,
                instigator,
                ..
            } => {
                let Ok((entity, health, _)) = targets.get_mut(*target) else {
                    log(&format!("Undirected damage: target {:?} has no Health, skipped", target));
                    continue;
                };
                let application = Application {
                    amount: *amount,
                    impulse: Vec3::ZERO,
                };
                if let Some((applied, died)) = apply_to_target(health, None, application) {
                    outcomes.push((entity, *instigator, DamageKind::Undirected, applied, died));
                }
            }
        }

        for (target, instigator, kind, amount, died) in outcomes {
            damage_taken_events.write(DamageTaken {
                target,
                causer,
                instigator,
                amount,
                kind,
            });

            if died {
                log(&format!("💀 Actor {:?} killed by {:?}", target, causer));
                killed_events.write(ActorKilled {
                    entity: target,
                    killer: Some(causer),
                });
            }
        }
    }
}
