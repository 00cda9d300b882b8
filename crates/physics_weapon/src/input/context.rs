//! Mapping contexts и local-player input subsystem

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{Character, Controller};

/// Физическая клавиша / кнопка / touch zone (opaque для simulation)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputKey(pub String);

impl InputKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

/// Логическое действие ("Fire", "Jump")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputActionId(pub String);

impl InputActionId {
    pub fn new(action: impl Into<String>) -> Self {
        Self(action.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Фаза input события
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TriggerEvent {
    Started,
    #[default]
    Triggered,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMapping {
    pub key: InputKey,
    pub action: InputActionId,
}

/// Набор key → action mappings, добавляется/удаляется целиком
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MappingContext {
    pub name: String,
    #[serde(default)]
    pub mappings: Vec<KeyMapping>,
}

impl MappingContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mappings: Vec::new(),
        }
    }

    pub fn with_mapping(mut self, key: impl Into<String>, action: impl Into<String>) -> Self {
        self.mappings.push(KeyMapping {
            key: InputKey::new(key),
            action: InputActionId::new(action),
        });
        self
    }

    fn action_for(&self, key: &InputKey) -> Option<&InputActionId> {
        self.mappings
            .iter()
            .find(|mapping| &mapping.key == key)
            .map(|mapping| &mapping.action)
    }
}

/// Handle зарегистрированного binding (для симметричного unbind)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingHandle(u32);

/// Handle регистрации mapping context (для симметричного remove)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextHandle(u32);

/// Что вызывается при срабатывании action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputHandler {
    FireWeapon(Entity),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionBinding {
    pub handle: BindingHandle,
    pub action: InputActionId,
    pub trigger: TriggerEvent,
    pub handler: InputHandler,
}

#[derive(Debug, Clone)]
struct ActiveContext {
    context: MappingContext,
    priority: i32,
    /// Порядок добавления: при равном priority побеждает последний
    order: u64,
    /// Живые регистрации; context активен пока список не пуст
    registrations: Vec<ContextHandle>,
}

/// Local-player input subsystem (живёт на player controller entity)
///
/// # Инварианты
/// - context name уникален: повторный add обновляет priority и mappings,
///   но context остаётся активным до снятия последней регистрации
/// - handles (context и binding) уникальны в пределах subsystem
#[derive(Component, Debug, Default)]
pub struct EnhancedInput {
    contexts: Vec<ActiveContext>,
    bindings: Vec<ActionBinding>,
    next_handle: u32,
    next_order: u64,
}

impl EnhancedInput {
    pub fn add_mapping_context(&mut self, context: MappingContext, priority: i32) -> ContextHandle {
        let handle = ContextHandle(self.next_handle);
        self.next_handle += 1;
        let order = self.next_order;
        self.next_order += 1;

        match self.contexts.iter_mut().find(|active| active.context.name == context.name) {
            Some(active) => {
                active.context = context;
                active.priority = priority;
                active.order = order;
                active.registrations.push(handle);
            }
            None => self.contexts.push(ActiveContext {
                context,
                priority,
                order,
                registrations: vec![handle],
            }),
        }
        handle
    }

    /// Снимает одну регистрацию; false если handle уже снят
    ///
    /// Context удаляется только вместе с последней регистрацией.
    pub fn remove_mapping_context(&mut self, handle: ContextHandle) -> bool {
        let Some(index) = self
            .contexts
            .iter()
            .position(|active| active.registrations.contains(&handle))
        else {
            return false;
        };

        let active = &mut self.contexts[index];
        active.registrations.retain(|registered| *registered != handle);
        if active.registrations.is_empty() {
            self.contexts.remove(index);
        }
        true
    }

    pub fn has_mapping_context(&self, name: &str) -> bool {
        self.contexts.iter().any(|active| active.context.name == name)
    }

    pub fn mapping_context_priority(&self, name: &str) -> Option<i32> {
        self.contexts
            .iter()
            .find(|active| active.context.name == name)
            .map(|active| active.priority)
    }

    pub fn mapping_context_count(&self) -> usize {
        self.contexts.len()
    }

    /// Key → action через highest-priority context, который мапит этот key
    pub fn resolve_key(&self, key: &InputKey) -> Option<&InputActionId> {
        self.contexts
            .iter()
            .filter_map(|active| active.context.action_for(key).map(|action| (active, action)))
            .max_by_key(|(active, _)| (active.priority, active.order))
            .map(|(_, action)| action)
    }

    pub fn bind_action(
        &mut self,
        action: InputActionId,
        trigger: TriggerEvent,
        handler: InputHandler,
    ) -> BindingHandle {
        let handle = BindingHandle(self.next_handle);
        self.next_handle += 1;

        self.bindings.push(ActionBinding {
            handle,
            action,
            trigger,
            handler,
        });
        handle
    }

    /// Возвращает false если handle уже снят
    pub fn remove_binding(&mut self, handle: BindingHandle) -> bool {
        let before = self.bindings.len();
        self.bindings.retain(|binding| binding.handle != handle);
        self.bindings.len() != before
    }

    pub fn bindings(&self) -> &[ActionBinding] {
        &self.bindings
    }

    pub fn handlers_for<'a>(
        &'a self,
        action: &'a InputActionId,
        trigger: TriggerEvent,
    ) -> impl Iterator<Item = InputHandler> + 'a {
        self.bindings
            .iter()
            .filter(move |binding| &binding.action == action && binding.trigger == trigger)
            .map(|binding| binding.handler)
    }
}

/// Resolve input context: character → controller → player → subsystem
///
/// Любое звено может отсутствовать (нет controller, AI controller,
/// controller despawned) → `None`, вызывающий обязан обработать.
#[derive(SystemParam)]
pub struct InputContexts<'w, 's> {
    controllers: Query<'w, 's, &'static Controller>,
    subsystems: Query<'w, 's, &'static mut EnhancedInput>,
}

impl InputContexts<'_, '_> {
    pub fn resolve(&mut self, character: &Character) -> Option<(Entity, Mut<'_, EnhancedInput>)> {
        let controller = character.controller?;
        self.subsystem_of(controller)
            .map(|subsystem| (controller, subsystem))
    }

    pub fn subsystem_of(&mut self, controller: Entity) -> Option<Mut<'_, EnhancedInput>> {
        let kind = self.controllers.get(controller).ok()?;
        if !kind.is_player() {
            return None;
        }
        self.subsystems.get_mut(controller).ok()
    }
}
