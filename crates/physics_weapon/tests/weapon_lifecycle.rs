//! Weapon lifecycle integration test
//!
//! Проверяем на полном headless App:
//! - attach-once инвариант
//! - input registration (priority 1 перекрывает baseline) и её снятие
//! - Fire feedback и no-op для unattached / uncontrolled
//! - detach идемпотентен (explicit intent и despawn)

mod common;

use bevy::prelude::*;
use common::*;
use physics_weapon::input::{InputActionId, InputKey};
use physics_weapon::*;

#[test]
fn test_attach_registers_weapon_context() {
    let mut app = create_weapon_app(42);
    let player = spawn_player(&mut app, Vec3::ZERO);
    let weapon = spawn_weapon(&mut app, rifle_config());

    attach(&mut app, weapon, player.character);

    assert_eq!(
        captured::<WeaponAttached>(&app),
        vec![WeaponAttached {
            weapon,
            character: player.character,
            input_bound: true,
        }]
    );
    assert_eq!(app.world().get::<HeldWeapon>(player.character), Some(&HeldWeapon(Some(weapon))));
    assert_eq!(app.world().get::<ChildOf>(weapon).map(|c| c.parent()), Some(player.mesh));

    let input = input_of(&app, player.controller);
    assert_eq!(input.mapping_context_priority("Weapons"), Some(1));
    assert_eq!(input.resolve_key(&InputKey::new("Touch1")), Some(&InputActionId::new("Fire")));
}

#[test]
fn test_second_weapon_is_rejected() {
    let mut app = create_weapon_app(42);
    let player = spawn_player(&mut app, Vec3::ZERO);
    let first = spawn_weapon(&mut app, rifle_config());
    let second = spawn_weapon(&mut app, rifle_config());

    attach(&mut app, first, player.character);
    attach(&mut app, second, player.character);

    assert_eq!(
        captured::<WeaponAttachRejected>(&app),
        vec![WeaponAttachRejected {
            weapon: second,
            reason: AttachError::AlreadyArmed {
                character: player.character,
                held: first,
            },
        }]
    );
    assert_eq!(captured::<WeaponAttached>(&app).len(), 1);
    assert_eq!(app.world().get::<WeaponAttachment>(second), Some(&WeaponAttachment::Unattached));
    assert_eq!(
        app.world().get::<WeaponAttachment>(first).and_then(|state| state.character()),
        Some(player.character)
    );
    assert_eq!(input_of(&app, player.controller).bindings().len(), 1);
}

#[test]
fn test_attach_without_character_is_rejected() {
    let mut app = create_weapon_app(42);
    let weapon = spawn_weapon(&mut app, rifle_config());

    app.world_mut().send_event(AttachWeaponIntent { weapon, character: None });
    app.update();

    let rejected = captured::<WeaponAttachRejected>(&app);
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].reason, AttachError::NoCharacter);
    assert_eq!(app.world().get::<WeaponAttachment>(weapon), Some(&WeaponAttachment::Unattached));
}

#[test]
fn test_fire_input_plays_feedback() {
    let mut app = create_weapon_app(42);
    let player = spawn_player(&mut app, Vec3::new(10.0, 20.0, 0.0));
    let weapon = spawn_weapon(&mut app, rifle_config());

    // До attach Touch1 — это Jump, выстрела нет
    press(&mut app, player.controller, "Touch1");
    assert!(captured::<WeaponFired>(&app).is_empty());

    attach(&mut app, weapon, player.character);
    press(&mut app, player.controller, "Touch1");

    let sounds = captured::<PlaySoundAtLocation>(&app);
    assert_eq!(sounds.len(), 1);
    assert_eq!(sounds[0].sound, AssetRef::new("sounds/rifle_shot"));
    assert_eq!(sounds[0].location, Vec3::new(10.0, 20.0, 0.0));

    let montages = captured::<PlayMontage>(&app);
    assert_eq!(montages.len(), 1);
    assert_eq!(montages[0].mesh, player.mesh);
    assert_eq!(montages[0].play_rate, 1.0);

    let fired = captured::<WeaponFired>(&app);
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].shooter, player.character);
    assert_eq!(fired[0].muzzle_location, Vec3::new(110.0, 20.0, 10.0));
}

#[test]
fn test_fire_on_unattached_weapon_is_noop() {
    let mut app = create_weapon_app(42);
    let weapon = spawn_weapon(&mut app, rifle_config());

    app.world_mut().send_event(FireIntent { weapon });
    app.update();

    assert!(captured::<PlaySoundAtLocation>(&app).is_empty());
    assert!(captured::<PlayMontage>(&app).is_empty());
    assert!(captured::<WeaponFired>(&app).is_empty());
    assert_eq!(app.world().get::<WeaponAttachment>(weapon), Some(&WeaponAttachment::Unattached));
}

#[test]
fn test_fire_without_controller_is_noop() {
    let mut app = create_weapon_app(42);
    let mesh = app.world_mut().spawn(FirstPersonMesh::default()).id();
    let character = app.world_mut().spawn((Transform::default(), Character::new(mesh))).id();
    let weapon = spawn_weapon(&mut app, rifle_config());

    attach(&mut app, weapon, character);
    assert_eq!(
        captured::<WeaponAttached>(&app),
        vec![WeaponAttached {
            weapon,
            character,
            input_bound: false,
        }]
    );

    app.world_mut().send_event(FireIntent { weapon });
    app.update();

    assert!(captured::<PlaySoundAtLocation>(&app).is_empty());
    assert!(captured::<WeaponFired>(&app).is_empty());
}

#[test]
fn test_ai_fires_through_intent() {
    let mut app = create_weapon_app(42);
    let controller = app.world_mut().spawn(Controller::Ai).id();
    // Mesh без AnimationInstance — montage пропускается
    let mesh = app.world_mut().spawn(FirstPersonMesh::default()).id();
    let character = app
        .world_mut()
        .spawn((Transform::default(), Character::new(mesh).with_controller(controller)))
        .id();
    let weapon = spawn_weapon(&mut app, rifle_config());

    attach(&mut app, weapon, character);
    app.world_mut().send_event(FireIntent { weapon });
    app.update();

    assert_eq!(captured::<PlaySoundAtLocation>(&app).len(), 1);
    assert!(captured::<PlayMontage>(&app).is_empty());
    assert_eq!(captured::<WeaponFired>(&app).len(), 1);
}

#[test]
fn test_explicit_detach_is_idempotent() {
    let mut app = create_weapon_app(42);
    let player = spawn_player(&mut app, Vec3::ZERO);
    let weapon = spawn_weapon(&mut app, rifle_config());
    attach(&mut app, weapon, player.character);

    app.world_mut().send_event(DetachWeaponIntent { weapon });
    app.update();
    let contexts_after_first = input_of(&app, player.controller).mapping_context_count();

    app.world_mut().send_event(DetachWeaponIntent { weapon });
    app.update();

    assert_eq!(
        captured::<WeaponDetached>(&app),
        vec![WeaponDetached {
            weapon,
            character: Some(player.character),
        }]
    );
    let input = input_of(&app, player.controller);
    assert_eq!(input.mapping_context_count(), contexts_after_first);
    assert!(!input.has_mapping_context("Weapons"));
    assert!(input.bindings().is_empty());
    assert_eq!(input.resolve_key(&InputKey::new("Touch1")), Some(&InputActionId::new("Jump")));
    assert_eq!(app.world().get::<HeldWeapon>(player.character), Some(&HeldWeapon(None)));

    // Touch1 снова Jump — выстрела нет
    press(&mut app, player.controller, "Touch1");
    assert!(captured::<WeaponFired>(&app).is_empty());
}

#[test]
fn test_despawn_releases_input_registration() {
    let mut app = create_weapon_app(42);
    let player = spawn_player(&mut app, Vec3::ZERO);
    let weapon = spawn_weapon(&mut app, rifle_config());
    attach(&mut app, weapon, player.character);
    assert!(input_of(&app, player.controller).has_mapping_context("Weapons"));

    app.world_mut().despawn(weapon);
    app.update();

    assert_eq!(
        captured::<WeaponDetached>(&app),
        vec![WeaponDetached {
            weapon,
            character: Some(player.character),
        }]
    );
    let input = input_of(&app, player.controller);
    assert!(!input.has_mapping_context("Weapons"));
    assert!(input.bindings().is_empty());
    assert_eq!(app.world().get::<HeldWeapon>(player.character), Some(&HeldWeapon(None)));

    // Слот освободился — новое оружие можно взять
    let replacement = spawn_weapon(&mut app, rifle_config());
    attach(&mut app, replacement, player.character);
    assert_eq!(captured::<WeaponAttached>(&app).len(), 2);
}

#[test]
fn test_despawn_after_controller_lost() {
    let mut app = create_weapon_app(42);
    let player = spawn_player(&mut app, Vec3::ZERO);
    let weapon = spawn_weapon(&mut app, rifle_config());
    attach(&mut app, weapon, player.character);

    app.world_mut().despawn(player.controller);
    app.world_mut().despawn(weapon);
    app.update();

    assert_eq!(captured::<WeaponDetached>(&app).len(), 1);
}

#[test]
fn test_detach_keeps_context_of_other_weapon_on_shared_controller() {
    let mut app = create_weapon_app(42);
    let player = spawn_player(&mut app, Vec3::ZERO);
    // Второй персонаж под тем же controller'ом (vehicle seat / possession)
    let second_mesh = app
        .world_mut()
        .spawn((Transform::default(), FirstPersonMesh::default(), AnimationInstance))
        .id();
    let second = app
        .world_mut()
        .spawn((Transform::default(), Character::new(second_mesh).with_controller(player.controller)))
        .id();
    let weapon_a = spawn_weapon(&mut app, rifle_config());
    let weapon_b = spawn_weapon(&mut app, rifle_config());

    attach(&mut app, weapon_a, player.character);
    attach(&mut app, weapon_b, second);
    assert_eq!(captured::<WeaponAttached>(&app).len(), 2);

    app.world_mut().despawn(weapon_a);
    app.update();

    let input = input_of(&app, player.controller);
    assert!(input.has_mapping_context("Weapons"));
    assert_eq!(input.bindings().len(), 1);
    assert_eq!(input.resolve_key(&InputKey::new("Touch1")), Some(&InputActionId::new("Fire")));

    press(&mut app, player.controller, "Touch1");
    let fired = captured::<WeaponFired>(&app);
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].weapon, weapon_b);

    // Последняя регистрация снята — baseline возвращается
    app.world_mut().send_event(DetachWeaponIntent { weapon: weapon_b });
    app.update();
    let input = input_of(&app, player.controller);
    assert!(!input.has_mapping_context("Weapons"));
    assert_eq!(input.resolve_key(&InputKey::new("Touch1")), Some(&InputActionId::new("Jump")));
}

#[test]
fn test_fire_feedback_uses_world_position_of_parented_character() {
    let mut app = create_weapon_app(42);
    let player = spawn_player(&mut app, Vec3::new(10.0, 20.0, 0.0));
    // Персонаж едет на платформе в (100, 0, 0)
    let platform = app.world_mut().spawn(Transform::from_xyz(100.0, 0.0, 0.0)).id();
    app.world_mut().entity_mut(player.character).insert(ChildOf(platform));
    let weapon = spawn_weapon(&mut app, rifle_config());

    attach(&mut app, weapon, player.character);
    press(&mut app, player.controller, "Touch1");

    let sounds = captured::<PlaySoundAtLocation>(&app);
    assert_eq!(sounds.len(), 1);
    assert_eq!(sounds[0].location, Vec3::new(110.0, 20.0, 0.0));

    let fired = captured::<WeaponFired>(&app);
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].muzzle_location, Vec3::new(210.0, 20.0, 10.0));
}
