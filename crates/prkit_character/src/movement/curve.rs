//! Acceleration ramp: время непрерывного движения → множитель скорости

use serde::{Deserialize, Serialize};

/// Кривая разгона
///
/// Вход — movement_time (секунды с начала непрерывного движения),
/// выход — множитель ~[0, 1]. За пределами ключей значение clamp'ится.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AccelerationCurve {
    Constant(f32),
    /// Линейный разгон start → end за duration секунд
    Linear { start: f32, end: f32, duration: f32 },
    /// Ключи (time, value), отсортированные по time
    Keyframes(Vec<(f32, f32)>),
}

impl Default for AccelerationCurve {
    fn default() -> Self {
        Self::Constant(1.0)
    }
}

impl AccelerationCurve {
    pub fn evaluate(&self, time: f32) -> f32 {
        match self {
            Self::Constant(value) => *value,
            Self::Linear { start, end, duration } => {
                if *duration <= 0.0 {
                    return *end;
                }
                let t = (time / duration).clamp(0.0, 1.0);
                start + (end - start) * t
            }
            Self::Keyframes(keys) => evaluate_keyframes(keys, time),
        }
    }
}

fn evaluate_keyframes(keys: &[(f32, f32)], time: f32) -> f32 {
    let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
        return 1.0;
    };

    if time <= first.0 {
        return first.1;
    }
    if time >= last.0 {
        return last.1;
    }

    for pair in keys.windows(2) {
        let (t0, v0) = pair[0];
        let (t1, v1) = pair[1];
        if time >= t0 && time <= t1 {
            let span = t1 - t0;
            if span <= f32::EPSILON {
                return v1;
            }
            return v0 + (v1 - v0) * ((time - t0) / span);
        }
    }

    last.1
}
