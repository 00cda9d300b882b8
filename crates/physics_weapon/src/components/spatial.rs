//! World-space позиция через иерархию ChildOf
//!
//! Headless App (MinimalPlugins) не пропагирует GlobalTransform, поэтому
//! world transform собираем сами: local, умноженный на цепочку родителей.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

/// Защита от циклов в битой иерархии
const MAX_HIERARCHY_DEPTH: usize = 64;

/// Read-only доступ к world transforms
#[derive(SystemParam)]
pub struct WorldTransforms<'w, 's> {
    nodes: Query<'w, 's, (&'static Transform, Option<&'static ChildOf>)>,
}

impl WorldTransforms<'_, '_> {
    /// World transform entity; None если у entity нет Transform
    ///
    /// Родитель без Transform обрывает цепочку (считается origin).
    pub fn get(&self, entity: Entity) -> Option<Transform> {
        let (local, child_of) = self.nodes.get(entity).ok()?;
        let mut world = *local;
        let mut parent = child_of.map(ChildOf::parent);

        for _ in 0..MAX_HIERARCHY_DEPTH {
            let Some(current) = parent else {
                break;
            };
            let Ok((transform, child_of)) = self.nodes.get(current) else {
                break;
            };
            world = transform.mul_transform(world);
            parent = child_of.map(ChildOf::parent);
        }

        Some(world)
    }

    pub fn translation(&self, entity: Entity) -> Option<Vec3> {
        self.get(entity).map(|transform| transform.translation)
    }
}
