//! Grounded/airborne состояние, прыжок, приземление

use bevy::math::Vec3;

use crate::physics::body::CharacterBody;

use super::mover::Probe;

/// Что произошло с опорой за тик
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroundingChange {
    None,
    Jumped { impulse: f32 },
    Landed,
    LostSupport,
}

/// Импульс прыжка: sqrt(2 × |g| × jump_height × force_scale)
pub fn jump_impulse(gravity_magnitude: f32, jump_height: f32, force_scale: f32) -> f32 {
    (2.0 * gravity_magnitude * jump_height * force_scale).max(0.0).sqrt()
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GroundingController {
    grounded: bool,
    /// 0 = прыжок не запрошен
    pending_jump: f32,
}

impl GroundingController {
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn pending_jump(&self) -> f32 {
        self.pending_jump
    }

    /// Ставит прыжок в очередь на следующий тик
    pub fn queue_jump(&mut self, force_scale: f32) {
        self.pending_jump = force_scale;
    }

    pub fn force_grounded(&mut self, grounded: bool) {
        self.grounded = grounded;
    }

    pub fn tick(
        &mut self,
        body: &mut dyn CharacterBody,
        probe: &Probe<'_>,
        gravity_magnitude: f32,
        jump_height: f32,
    ) -> GroundingChange {
        if self.pending_jump != 0.0 {
            let impulse = jump_impulse(gravity_magnitude, jump_height, self.pending_jump);
            let mut velocity = body.velocity();
            velocity.y += impulse;
            body.set_velocity(velocity);

            self.pending_jump = 0.0;
            self.grounded = false;
            return GroundingChange::Jumped { impulse };
        }

        let mut velocity = body.velocity();

        if !self.grounded {
            // Ещё летим вверх — землю не ищем
            if velocity.y > 0.0 || !probe.has_support(body.position()) {
                return GroundingChange::None;
            }
            self.grounded = true;
            velocity.y = 0.0;
            body.set_velocity(velocity);
            // Прижимаем к верху опоры: за тик падения мог уйти под поверхность
            if let Some(offset) = probe.support_offset(body.position()) {
                body.set_position(body.position() + Vec3::Y * offset);
            }
            return GroundingChange::Landed;
        }

        if !probe.has_support(body.position()) {
            self.grounded = false;
            return GroundingChange::LostSupport;
        }

        // Стоим: гравитация не накапливается
        if velocity.y != 0.0 {
            velocity.y = 0.0;
            body.set_velocity(velocity);
        }
        GroundingChange::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_impulse_value() {
        let impulse = jump_impulse(9.8, 2.0, 1.0);
        assert!((impulse - 6.26).abs() < 0.01, "impulse = {}", impulse);

        let half = jump_impulse(9.8, 2.0, 0.5);
        assert!((half - (9.8f32 * 2.0).sqrt()).abs() < 1e-4);
    }

    #[test]
    fn test_queue_does_not_change_grounded() {
        let mut grounding = GroundingController::default();
        grounding.force_grounded(true);
        grounding.queue_jump(1.0);

        assert!(grounding.is_grounded());
        assert_eq!(grounding.pending_jump(), 1.0);
    }
}
