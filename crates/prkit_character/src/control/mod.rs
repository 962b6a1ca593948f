//! Direct control: оси ввода + forward камеры → MoveTo/StopMoving
//!
//! Ось = аналоговое значение (пишет input layer) и/или пара клавиш.
//! Ненулевой ввод каждый кадр ставит цель на один "шаг скорости" вперёд
//! по направлению ввода, нулевой — останавливает персонажа.

use bevy::prelude::*;

use crate::movement::CharacterController;

/// Что учитывается при расчёте значения оси
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisOverride {
    #[default]
    AxisOnly,
    KeysOnly,
    AxisAndKeys,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisBinding {
    /// Аналоговое значение оси (-1..1), обновляется снаружи
    pub axis: f32,
    pub mode: AxisOverride,
    pub positive: Option<KeyCode>,
    pub negative: Option<KeyCode>,
}

impl AxisBinding {
    pub fn keys(positive: KeyCode, negative: KeyCode) -> Self {
        Self {
            axis: 0.0,
            mode: AxisOverride::KeysOnly,
            positive: Some(positive),
            negative: Some(negative),
        }
    }

    /// Итоговое значение оси, clamp в [-1, 1]
    ///
    /// Если зажаты обе клавиши — побеждает positive.
    pub fn value(&self, keys: Option<&ButtonInput<KeyCode>>) -> f32 {
        let mut output = 0.0;

        if self.mode != AxisOverride::KeysOnly {
            output = self.axis;
        }

        if self.mode != AxisOverride::AxisOnly {
            let pressed = |key: Option<KeyCode>| match (key, keys) {
                (Some(key), Some(keys)) => keys.pressed(key),
                _ => false,
            };
            output += if pressed(self.positive) {
                1.0
            } else if pressed(self.negative) {
                -1.0
            } else {
                0.0
            };
        }

        output.clamp(-1.0, 1.0)
    }
}

/// Персонаж управляется напрямую игроком
#[derive(Component, Debug, Clone, Copy)]
pub struct DirectControl {
    pub horizontal: AxisBinding,
    pub vertical: AxisBinding,
}

impl Default for DirectControl {
    fn default() -> Self {
        Self {
            horizontal: AxisBinding {
                mode: AxisOverride::AxisAndKeys,
                positive: Some(KeyCode::KeyD),
                negative: Some(KeyCode::KeyA),
                ..default()
            },
            vertical: AxisBinding {
                mode: AxisOverride::AxisAndKeys,
                positive: Some(KeyCode::KeyW),
                negative: Some(KeyCode::KeyS),
                ..default()
            },
        }
    }
}

/// Forward камеры, относительно которой читается ввод
///
/// Пишет camera layer (вне core).
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct ControlCamera {
    pub forward: Vec3,
}

impl Default for ControlCamera {
    fn default() -> Self {
        Self { forward: Vec3::NEG_Z }
    }
}

/// Нормализованное направление движения из осей; None = ввода нет
///
/// right = forward, повёрнутый на -90° вокруг up (forward = -Z, right = +X).
pub fn input_direction(forward: Vec3, horizontal: f32, vertical: f32) -> Option<Vec3> {
    if horizontal == 0.0 && vertical == 0.0 {
        return None;
    }
    let right = Quat::from_axis_angle(Vec3::Y, -std::f32::consts::FRAC_PI_2) * forward;
    let movement = (forward * vertical + right * horizontal).normalize_or_zero();
    (movement != Vec3::ZERO).then_some(movement)
}

/// Система: ввод → MoveTo / StopMoving
pub fn apply_direct_control(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut controlled: Query<(&DirectControl, &ControlCamera, &Transform, &mut CharacterController)>,
) {
    let keys = keys.as_deref();

    for (control, camera, transform, mut controller) in controlled.iter_mut() {
        let horizontal = control.horizontal.value(keys);
        let vertical = control.vertical.value(keys);

        match input_direction(camera.forward, horizontal, vertical) {
            Some(direction) => {
                let target = transform.translation + direction * controller.current_speed();
                controller.move_to(target);
            }
            None => controller.stop_moving(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_value_modes() {
        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::KeyW);

        let axis_only = AxisBinding { axis: 0.4, ..default() };
        assert_eq!(axis_only.value(Some(&keys)), 0.4);

        let keys_only = AxisBinding { axis: 0.4, ..AxisBinding::keys(KeyCode::KeyW, KeyCode::KeyS) };
        assert_eq!(keys_only.value(Some(&keys)), 1.0);
        assert_eq!(keys_only.value(None), 0.0);

        let both = AxisBinding {
            axis: 0.5,
            mode: AxisOverride::AxisAndKeys,
            positive: Some(KeyCode::KeyW),
            negative: Some(KeyCode::KeyS),
        };
        // 0.5 + 1 → clamp
        assert_eq!(both.value(Some(&keys)), 1.0);

        keys.release(KeyCode::KeyW);
        keys.press(KeyCode::KeyS);
        assert_eq!(both.value(Some(&keys)), -0.5);
    }

    #[test]
    fn test_input_direction() {
        assert_eq!(input_direction(Vec3::NEG_Z, 0.0, 0.0), None);

        let forward = input_direction(Vec3::NEG_Z, 0.0, 1.0).unwrap();
        assert!((forward - Vec3::NEG_Z).length() < 1e-5);

        // right от forward -Z — это +X
        let right = input_direction(Vec3::NEG_Z, 1.0, 0.0).unwrap();
        assert!((right - Vec3::X).length() < 1e-5, "right = {:?}", right);

        let diagonal = input_direction(Vec3::NEG_Z, 1.0, 1.0).unwrap();
        assert!((diagonal.length() - 1.0).abs() < 1e-5);
    }
}
