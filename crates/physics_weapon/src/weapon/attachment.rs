//! Attachment controller: привязка оружия к персонажу
//!
//! State machine: `Unattached` → `Attached` → `Detached` (terminal).
//!
//! Attach регистрирует weapon mapping context (priority 1) и fire binding на
//! player controller; handle сохраняется в `Attached` state. Detach снимает
//! ровно то, что было зарегистрировано, с того controller'а, где оно лежит —
//! даже если персонаж с тех пор сменил controller или исчез.

use bevy::ecs::system::{RunSystemOnce, SystemParam};
use bevy::prelude::*;
use thiserror::Error;

use super::PhysicsWeapon;
use crate::components::{Character, FirstPersonMesh, HeldWeapon};
use crate::input::{BindingHandle, ContextHandle, InputContexts, InputHandler, TriggerEvent};
use crate::logger::{log, log_error, log_info, log_warning};

/// Что attach зарегистрировал в input subsystem (снимается при detach)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRegistration {
    pub controller: Entity,
    pub mapping_context: ContextHandle,
    pub binding: BindingHandle,
}

/// Состояние оружия относительно персонажа
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub enum WeaponAttachment {
    #[default]
    Unattached,
    Attached {
        character: Entity,
        /// None — у controller'а нет input subsystem (AI / без controller)
        input: Option<InputRegistration>,
    },
    Detached,
}

impl WeaponAttachment {
    pub fn character(&self) -> Option<Entity> {
        match self {
            WeaponAttachment::Attached { character, .. } => Some(*character),
            _ => None,
        }
    }

    pub fn is_attached(&self) -> bool {
        matches!(self, WeaponAttachment::Attached { .. })
    }

    pub fn input_registration(&self) -> Option<&InputRegistration> {
        match self {
            WeaponAttachment::Attached { input, .. } => input.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AttachError {
    #[error("no target character")]
    NoCharacter,

    #[error("entity {0:?} is not a character")]
    NotACharacter(Entity),

    #[error("character {character:?} already holds weapon {held:?}")]
    AlreadyArmed { character: Entity, held: Entity },

    #[error("entity {0:?} is not a weapon")]
    NotAWeapon(Entity),

    #[error("weapon {0:?} was already attached or detached")]
    NotAttachable(Entity),
}

// ============================================================================
// Events
// ============================================================================

/// Привязать оружие к персонажу (`character: None` → отказ NoCharacter)
#[derive(Event, Debug, Clone, Copy)]
pub struct AttachWeaponIntent {
    pub weapon: Entity,
    pub character: Option<Entity>,
}

/// Явный detach (end-of-life без despawn)
#[derive(Event, Debug, Clone, Copy)]
pub struct DetachWeaponIntent {
    pub weapon: Entity,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeaponAttached {
    pub weapon: Entity,
    pub character: Entity,
    /// Fire binding зарегистрирован (player controller)
    pub input_bound: bool,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeaponAttachRejected {
    pub weapon: Entity,
    pub reason: AttachError,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeaponDetached {
    pub weapon: Entity,
    /// Персонаж, у которого оружие было (None если не было attached)
    pub character: Option<Entity>,
}

// ============================================================================
// Attachment controller
// ============================================================================

/// Единственное место, которое мутирует attachment state и HeldWeapon
#[derive(SystemParam)]
pub struct WeaponAttachments<'w, 's> {
    commands: Commands<'w, 's>,
    weapons: Query<'w, 's, (&'static PhysicsWeapon, &'static mut WeaponAttachment, &'static mut Transform)>,
    characters: Query<'w, 's, (&'static Character, &'static mut HeldWeapon)>,
    meshes: Query<'w, 's, &'static FirstPersonMesh>,
    inputs: InputContexts<'w, 's>,
}

impl WeaponAttachments<'_, '_> {
    /// Attach с bool результатом (отказ логируется)
    pub fn attach_weapon(&mut self, weapon: Entity, target: Option<Entity>) -> bool {
        match self.try_attach(weapon, target) {
            Ok(()) => true,
            Err(reason) => {
                log_warning(&format!("⚠️ Attach rejected for weapon {:?}: {}", weapon, reason));
                false
            }
        }
    }

    /// Attach weapon → character
    ///
    /// # Flow
    /// 1. Валидация (character, registry, weapon state) — без мутаций
    /// 2. Parent к first-person mesh, transform = socket (snap)
    /// 3. Input registration (если есть player subsystem)
    /// 4. State → Attached, HeldWeapon → Some(weapon)
    pub fn try_attach(&mut self, weapon: Entity, target: Option<Entity>) -> Result<(), AttachError> {
        let target = target.ok_or(AttachError::NoCharacter)?;

        let (character, held) = self
            .characters
            .get(target)
            .map_err(|_| AttachError::NotACharacter(target))?;
        if let Some(held) = held.weapon() {
            return Err(AttachError::AlreadyArmed { character: target, held });
        }
        let character = character.clone();

        let (physics_weapon, state, _) = self
            .weapons
            .get(weapon)
            .map_err(|_| AttachError::NotAWeapon(weapon))?;
        if *state != WeaponAttachment::Unattached {
            return Err(AttachError::NotAttachable(weapon));
        }
        let socket_name = physics_weapon.config().attach_socket.clone();
        let input_config = physics_weapon.config().input.clone();

        // Snap к socket'у; mesh без socket'а → origin mesh; нет mesh → сам персонаж
        let (parent, socket) = match self.meshes.get(character.mesh_1p) {
            Ok(mesh) => {
                let socket = mesh.socket(&socket_name);
                if socket.is_none() {
                    log_warning(&format!(
                        "Socket '{}' not found on mesh {:?}, snapping to mesh origin",
                        socket_name, character.mesh_1p
                    ));
                }
                (character.mesh_1p, socket.unwrap_or(Transform::IDENTITY))
            }
            Err(_) => {
                log_warning(&format!(
                    "Character {:?} has no first-person mesh, attaching to character root",
                    target
                ));
                (target, Transform::IDENTITY)
            }
        };
        self.commands.entity(parent).add_child(weapon);

        let input = match self.inputs.resolve(&character) {
            Some((controller, mut subsystem)) => {
                let mapping_context =
                    subsystem.add_mapping_context(input_config.mapping_context.clone(), input_config.priority);
                let binding = subsystem.bind_action(
                    input_config.fire_action.clone(),
                    TriggerEvent::Triggered,
                    InputHandler::FireWeapon(weapon),
                );
                Some(InputRegistration {
                    controller,
                    mapping_context,
                    binding,
                })
            }
            None => {
                log(&format!(
                    "Character {:?} has no local-player input, weapon {:?} fires only via FireIntent",
                    target, weapon
                ));
                None
            }
        };

        if let Ok((_, mut state, mut transform)) = self.weapons.get_mut(weapon) {
            *transform = socket;
            *state = WeaponAttachment::Attached {
                character: target,
                input,
            };
        }
        if let Ok((_, mut held)) = self.characters.get_mut(target) {
            held.0 = Some(weapon);
        }

        Ok(())
    }

    /// Detach (идемпотентный): снимает input registration, освобождает registry
    ///
    /// Возвращает событие если был переход в Detached, None если уже Detached
    /// или entity не оружие. Каждый отсутствующий lookup просто пропускает шаг.
    pub fn detach(&mut self, weapon: Entity) -> Option<WeaponDetached> {
        let Ok((_, mut state, _)) = self.weapons.get_mut(weapon) else {
            return None;
        };
        if *state == WeaponAttachment::Detached {
            return None;
        }

        let previous = std::mem::replace(&mut *state, WeaponAttachment::Detached);
        let WeaponAttachment::Attached { character, input } = previous else {
            return Some(WeaponDetached { weapon, character: None });
        };

        if let Some(registration) = input {
            match self.inputs.subsystem_of(registration.controller) {
                Some(mut subsystem) => {
                    subsystem.remove_mapping_context(registration.mapping_context);
                    subsystem.remove_binding(registration.binding);
                }
                None => log(&format!(
                    "Controller {:?} gone, skipping input cleanup for weapon {:?}",
                    registration.controller, weapon
                )),
            }
        }

        if let Ok((_, mut held)) = self.characters.get_mut(character) {
            if held.0 == Some(weapon) {
                held.0 = None;
            }
        }

        Some(WeaponDetached {
            weapon,
            character: Some(character),
        })
    }
}

/// Synchronous attach для кода с `&mut World` (host bridge, тесты)
///
/// События WeaponAttached/Rejected здесь не эмитятся — только bool.
pub fn attach_weapon(world: &mut World, weapon: Entity, character: Option<Entity>) -> bool {
    world
        .run_system_once(move |mut attachments: WeaponAttachments| {
            attachments.attach_weapon(weapon, character)
        })
        .unwrap_or_else(|err| {
            log_error(&format!("attach_weapon: failed to run attachment system: {}", err));
            false
        })
}

/// Synchronous detach для кода с `&mut World`
pub fn detach_weapon(world: &mut World, weapon: Entity) -> Option<WeaponDetached> {
    world
        .run_system_once(move |mut attachments: WeaponAttachments| attachments.detach(weapon))
        .unwrap_or_else(|err| {
            log_error(&format!("detach_weapon: failed to run attachment system: {}", err));
            None
        })
}

// ============================================================================
// Systems
// ============================================================================

/// Process attach intents
pub fn process_attach_intents(
    mut intents: EventReader<AttachWeaponIntent>,
    mut attachments: WeaponAttachments,
    mut attached_events: EventWriter<WeaponAttached>,
    mut rejected_events: EventWriter<WeaponAttachRejected>,
) {
    for intent in intents.read() {
        match attachments.try_attach(intent.weapon, intent.character) {
            Ok(()) => {
                let (character, input_bound) = attachments
                    .weapons
                    .get(intent.weapon)
                    .map(|(_, state, _)| (state.character(), state.input_registration().is_some()))
                    .unwrap_or((None, false));
                let Some(character) = character else {
                    continue;
                };

                attached_events.write(WeaponAttached {
                    weapon: intent.weapon,
                    character,
                    input_bound,
                });
                log_info(&format!(
                    "✅ Weapon {:?} attached to {:?} (input bound: {})",
                    intent.weapon, character, input_bound
                ));
            }
            Err(reason) => {
                log_warning(&format!("⚠️ Attach rejected for weapon {:?}: {}", intent.weapon, reason));
                rejected_events.write(WeaponAttachRejected {
                    weapon: intent.weapon,
                    reason,
                });
            }
        }
    }
}

/// Process explicit detach intents
pub fn process_detach_intents(
    mut intents: EventReader<DetachWeaponIntent>,
    mut attachments: WeaponAttachments,
    mut detached_events: EventWriter<WeaponDetached>,
) {
    for intent in intents.read() {
        if let Some(detached) = attachments.detach(intent.weapon) {
            log_info(&format!("🗑️ Weapon {:?} detached from {:?}", detached.weapon, detached.character));
            detached_events.write(detached);
        }
    }
}

/// Observer: end-of-life оружия (despawn / удаление WeaponAttachment)
///
/// OnRemove срабатывает до удаления компонента — state ещё читается.
pub fn detach_on_weapon_removed(
    trigger: Trigger<OnRemove, WeaponAttachment>,
    mut attachments: WeaponAttachments,
    mut detached_events: EventWriter<WeaponDetached>,
) {
    if let Some(detached) = attachments.detach(trigger.target()) {
        log(&format!("Weapon {:?} removed, input registration released", detached.weapon));
        detached_events.write(detached);
    }
}
