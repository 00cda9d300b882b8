//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: здоровье (Health)
//! - character: носитель оружия (Character, HeldWeapon)
//! - controller: кто управляет персонажем (Controller)
//! - attachment: first-person mesh, sockets, animation instance
//! - spatial: world transform через иерархию (WorldTransforms)

pub mod actor;
pub mod attachment;
pub mod character;
pub mod controller;
pub mod spatial;

// Re-exports для удобного импорта
pub use actor::*;
pub use attachment::*;
pub use character::*;
pub use controller::*;
pub use spatial::*;
