//! Attachment компоненты: first-person mesh и его sockets

use bevy::prelude::*;
use std::collections::HashMap;

/// Socket на first-person mesh, куда садится оружие
pub const GRIP_POINT: &str = "GripPoint";

/// First-person mesh (viewmodel) персонажа
///
/// Sockets — именованные attachment points с local transform относительно mesh.
/// Оружие становится child этого entity, transform = transform socket'а.
#[derive(Component, Debug, Clone, Default)]
pub struct FirstPersonMesh {
    pub sockets: HashMap<String, Transform>,
}

impl FirstPersonMesh {
    pub fn with_socket(mut self, name: impl Into<String>, transform: Transform) -> Self {
        self.sockets.insert(name.into(), transform);
        self
    }

    pub fn socket(&self, name: &str) -> Option<Transform> {
        self.sockets.get(name).copied()
    }
}

/// Маркер: mesh умеет проигрывать montages (animation instance resolvable)
///
/// Без него Fire пропускает animation feedback.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct AnimationInstance;
