//! Тело персонажа: позиция, скорость, поворот
//!
//! Core пишет в тело только через CharacterBody. В ECS это Transform +
//! PhysicsBody (velocity интегрируем сами, Rapier только для коллизий).

use bevy::prelude::*;

/// Custom velocity персонажа (Rapier forces не используем)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct PhysicsBody {
    pub velocity: Vec3,
    pub mass: f32,
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            mass: 70.0,
        }
    }
}

pub trait CharacterBody {
    fn position(&self) -> Vec3;
    /// Collision-aware перемещение (kinematic move через физический движок)
    fn move_position(&mut self, target: Vec3);
    /// Телепорт без учёта коллизий
    fn set_position(&mut self, position: Vec3);
    fn velocity(&self) -> Vec3;
    fn set_velocity(&mut self, velocity: Vec3);
    fn rotation(&self) -> Quat;
    fn set_rotation(&mut self, rotation: Quat);
}

/// ECS-адаптер: Transform + PhysicsBody одного entity
///
/// Для KinematicPositionBased тела Rapier сам выводит velocity из сдвига
/// Transform, поэтому move_position и set_position пишут translation.
pub struct TransformBody<'a> {
    pub transform: &'a mut Transform,
    pub body: &'a mut PhysicsBody,
}

impl CharacterBody for TransformBody<'_> {
    fn position(&self) -> Vec3 {
        self.transform.translation
    }

    fn move_position(&mut self, target: Vec3) {
        self.transform.translation = target;
    }

    fn set_position(&mut self, position: Vec3) {
        self.transform.translation = position;
    }

    fn velocity(&self) -> Vec3 {
        self.body.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.body.velocity = velocity;
    }

    fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.transform.rotation = rotation;
    }
}

/// Поворот "смотреть вдоль горизонтальной проекции dir" (forward = -Z)
///
/// None если горизонтальная компонента вырождена.
pub fn facing_rotation(direction: Vec3) -> Option<Quat> {
    let flat = Vec3::new(direction.x, 0.0, direction.z);
    if flat.length_squared() < 1e-8 {
        return None;
    }
    Some(Transform::IDENTITY.looking_to(flat.normalize(), Vec3::Y).rotation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_rotation_ignores_vertical() {
        let rotation = facing_rotation(Vec3::new(1.0, 5.0, 0.0)).unwrap();
        let forward = rotation * Vec3::NEG_Z;
        assert!((forward - Vec3::X).length() < 1e-5, "forward = {:?}", forward);

        assert!(facing_rotation(Vec3::Y).is_none());
    }

    #[test]
    fn test_transform_body_writes_through() {
        let mut transform = Transform::default();
        let mut physics = PhysicsBody::default();

        {
            let mut body = TransformBody { transform: &mut transform, body: &mut physics };
            body.move_position(Vec3::new(1.0, 0.0, 2.0));
            body.set_velocity(Vec3::Y * 3.0);
        }

        assert_eq!(transform.translation, Vec3::new(1.0, 0.0, 2.0));
        assert_eq!(physics.velocity.y, 3.0);
    }
}
