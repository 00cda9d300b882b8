//! Tests for mapping contexts and the binding table.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;
    use crate::input::{EnhancedInput, InputActionId, InputHandler, InputKey, MappingContext, TriggerEvent};

    fn baseline() -> MappingContext {
        MappingContext::new("Default")
            .with_mapping("SpaceBar", "Jump")
            .with_mapping("Touch1", "Jump")
    }

    fn weapon_context() -> MappingContext {
        MappingContext::new("Weapons")
            .with_mapping("LeftMouseButton", "Fire")
            .with_mapping("Touch1", "Fire")
    }

    #[test]
    fn test_higher_priority_context_wins_overlapping_key() {
        let mut input = EnhancedInput::default();
        input.add_mapping_context(baseline(), 0);
        input.add_mapping_context(weapon_context(), 1);

        // Touch1 мапится в оба контекста → Fire (priority 1)
        assert_eq!(input.resolve_key(&InputKey::new("Touch1")), Some(&InputActionId::new("Fire")));
        // Без пересечения — baseline
        assert_eq!(input.resolve_key(&InputKey::new("SpaceBar")), Some(&InputActionId::new("Jump")));
        assert_eq!(input.resolve_key(&InputKey::new("KeyQ")), None);
    }

    #[test]
    fn test_removing_context_restores_baseline_mapping() {
        let mut input = EnhancedInput::default();
        input.add_mapping_context(baseline(), 0);
        let weapons = input.add_mapping_context(weapon_context(), 1);

        assert!(input.remove_mapping_context(weapons));
        assert!(!input.remove_mapping_context(weapons));
        assert_eq!(input.resolve_key(&InputKey::new("Touch1")), Some(&InputActionId::new("Jump")));
    }

    #[test]
    fn test_shared_context_lives_until_last_registration() {
        let mut input = EnhancedInput::default();
        input.add_mapping_context(baseline(), 0);
        let first = input.add_mapping_context(weapon_context(), 1);
        let second = input.add_mapping_context(weapon_context(), 1);
        assert_ne!(first, second);
        assert_eq!(input.mapping_context_count(), 2);

        // Первая регистрация снята — вторая всё ещё держит context
        assert!(input.remove_mapping_context(first));
        assert!(input.has_mapping_context("Weapons"));
        assert_eq!(input.resolve_key(&InputKey::new("Touch1")), Some(&InputActionId::new("Fire")));

        assert!(input.remove_mapping_context(second));
        assert!(!input.has_mapping_context("Weapons"));
        assert_eq!(input.resolve_key(&InputKey::new("Touch1")), Some(&InputActionId::new("Jump")));
    }

    #[test]
    fn test_re_adding_context_updates_priority() {
        let mut input = EnhancedInput::default();
        input.add_mapping_context(weapon_context(), 1);
        input.add_mapping_context(weapon_context(), 5);

        assert_eq!(input.mapping_context_count(), 1);
        assert_eq!(input.mapping_context_priority("Weapons"), Some(5));
    }

    #[test]
    fn test_equal_priority_latest_context_wins() {
        let mut input = EnhancedInput::default();
        input.add_mapping_context(baseline(), 1);
        input.add_mapping_context(weapon_context(), 1);

        assert_eq!(input.resolve_key(&InputKey::new("Touch1")), Some(&InputActionId::new("Fire")));
    }

    #[test]
    fn test_binding_handles_are_removed_once() {
        let mut input = EnhancedInput::default();
        let weapon = Entity::from_raw(7);
        let fire = InputActionId::new("Fire");

        let handle = input.bind_action(fire.clone(), TriggerEvent::Triggered, InputHandler::FireWeapon(weapon));

        let handlers: Vec<_> = input.handlers_for(&fire, TriggerEvent::Triggered).collect();
        assert_eq!(handlers, vec![InputHandler::FireWeapon(weapon)]);
        // Другая фаза — binding не срабатывает
        assert_eq!(input.handlers_for(&fire, TriggerEvent::Started).count(), 0);

        assert!(input.remove_binding(handle));
        assert!(!input.remove_binding(handle));
        assert!(input.bindings().is_empty());
    }
}
