use super::config::TICKS_PER_STEP;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncoderMotion {
    pub direction: Option<RotationDirection>,
    pub steps: u32,
    /// Raw tick delta seen by this update, remainder included.
    pub delta: i32,
}

impl EncoderMotion {
    pub const NONE: Self = Self {
        direction: None,
        steps: 0,
        delta: 0,
    };
}

/// Turns raw quadrature positions into whole detent steps.
///
/// The baseline only moves by consumed steps, so ticks short of a full step
/// stay pending until later updates complete them.
#[derive(Clone, Copy, Debug)]
pub struct EncoderTracker {
    previous_position: i32,
    ticks_per_step: i32,
}

impl EncoderTracker {
    pub const fn new(initial_position: i32) -> Self {
        Self::with_ticks_per_step(initial_position, TICKS_PER_STEP)
    }

    pub const fn with_ticks_per_step(initial_position: i32, ticks_per_step: i32) -> Self {
        Self {
            previous_position: initial_position,
            ticks_per_step: if ticks_per_step > 0 { ticks_per_step } else { 1 },
        }
    }

    pub fn baseline(&self) -> i32 {
        self.previous_position
    }

    pub fn update(&mut self, position: i32) -> EncoderMotion {
        let delta = position.wrapping_sub(self.previous_position);
        if delta == 0 {
            return EncoderMotion::NONE;
        }

        let ticks = self.ticks_per_step.unsigned_abs();
        let steps = delta.unsigned_abs() / ticks;
        let consumed = (steps * ticks) as i32;
        let direction = if delta > 0 {
            self.previous_position = self.previous_position.wrapping_add(consumed);
            RotationDirection::Clockwise
        } else {
            self.previous_position = self.previous_position.wrapping_sub(consumed);
            RotationDirection::CounterClockwise
        };

        EncoderMotion {
            direction: if steps > 0 { Some(direction) } else { None },
            steps,
            delta,
        }
    }
}

/// Extends a free-running 16-bit pulse counter into a continuous position.
#[derive(Clone, Copy, Debug, Default)]
pub struct EncoderCounter {
    last_raw: Option<i16>,
    position: i32,
}

impl EncoderCounter {
    pub const fn new() -> Self {
        Self {
            last_raw: None,
            position: 0,
        }
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn observe(&mut self, raw: i16) -> i32 {
        if let Some(last) = self.last_raw {
            let delta = raw.wrapping_sub(last);
            self.position = self.position.wrapping_add(i32::from(delta));
        }
        self.last_raw = Some(raw);
        self.position
    }
}
