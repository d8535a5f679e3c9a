#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TouchZone {
    #[default]
    None,
    /// Left half, sends Escape.
    Escape,
    /// Right half, toggles the Shift latch.
    Shift,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TouchPhase {
    #[default]
    None,
    Begin,
    Hold,
    End,
}

impl TouchPhase {
    pub fn is_active(self) -> bool {
        matches!(self, Self::Begin | Self::Hold)
    }
}

/// Raw controller contact as read from the panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchReading {
    pub active: bool,
    pub x: i32,
    pub y: i32,
}

impl TouchReading {
    pub const RELEASED: Self = Self {
        active: false,
        x: 0,
        y: 0,
    };

    pub const fn contact(x: i32, y: i32) -> Self {
        Self { active: true, x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchSample {
    pub phase: TouchPhase,
    pub x: i32,
    pub y: i32,
}

impl TouchSample {
    pub const IDLE: Self = Self {
        phase: TouchPhase::None,
        x: 0,
        y: 0,
    };
}

pub fn classify_zone(sample: TouchSample, display_width: i32) -> TouchZone {
    if !sample.phase.is_active() {
        return TouchZone::None;
    }
    if sample.x < 0 || sample.x >= display_width {
        return TouchZone::None;
    }
    if sample.x < display_width / 2 {
        TouchZone::Escape
    } else {
        TouchZone::Shift
    }
}

/// Derives begin/hold/end edges from consecutive contact readings.
#[derive(Clone, Copy, Debug, Default)]
pub struct TouchEdgeTracker {
    was_active: bool,
    last_x: i32,
    last_y: i32,
}

impl TouchEdgeTracker {
    pub const fn new() -> Self {
        Self {
            was_active: false,
            last_x: 0,
            last_y: 0,
        }
    }

    pub fn observe(&mut self, reading: TouchReading) -> TouchSample {
        let phase = match (self.was_active, reading.active) {
            (false, false) => TouchPhase::None,
            (false, true) => TouchPhase::Begin,
            (true, true) => TouchPhase::Hold,
            (true, false) => TouchPhase::End,
        };
        self.was_active = reading.active;

        if reading.active {
            self.last_x = reading.x;
            self.last_y = reading.y;
        }

        match phase {
            TouchPhase::None => TouchSample::IDLE,
            // Release frames carry no coordinates; report where the finger left.
            TouchPhase::End => TouchSample {
                phase,
                x: self.last_x,
                y: self.last_y,
            },
            _ => TouchSample {
                phase,
                x: reading.x,
                y: reading.y,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(x: i32) -> TouchSample {
        TouchSample {
            phase: TouchPhase::Hold,
            x,
            y: 120,
        }
    }

    #[test]
    fn midpoint_splits_escape_and_shift() {
        assert_eq!(classify_zone(held(0), 240), TouchZone::Escape);
        assert_eq!(classify_zone(held(119), 240), TouchZone::Escape);
        assert_eq!(classify_zone(held(120), 240), TouchZone::Shift);
        assert_eq!(classify_zone(held(239), 240), TouchZone::Shift);
    }

    #[test]
    fn inactive_sample_has_no_zone_regardless_of_x() {
        for phase in [TouchPhase::None, TouchPhase::End] {
            for x in [0, 119, 120, 239] {
                let sample = TouchSample { phase, x, y: 10 };
                assert_eq!(classify_zone(sample, 240), TouchZone::None);
            }
        }
    }

    #[test]
    fn out_of_range_x_has_no_zone() {
        assert_eq!(classify_zone(held(-1), 240), TouchZone::None);
        assert_eq!(classify_zone(held(240), 240), TouchZone::None);
        assert_eq!(classify_zone(held(4_000), 240), TouchZone::None);
    }

    #[test]
    fn begin_counts_as_active() {
        let sample = TouchSample {
            phase: TouchPhase::Begin,
            x: 30,
            y: 30,
        };
        assert_eq!(classify_zone(sample, 240), TouchZone::Escape);
    }

    #[test]
    fn edge_tracker_reports_begin_hold_end() {
        let mut tracker = TouchEdgeTracker::new();

        assert_eq!(tracker.observe(TouchReading::RELEASED).phase, TouchPhase::None);

        let begin = tracker.observe(TouchReading::contact(50, 60));
        assert_eq!(begin.phase, TouchPhase::Begin);
        assert_eq!((begin.x, begin.y), (50, 60));

        let hold = tracker.observe(TouchReading::contact(52, 61));
        assert_eq!(hold.phase, TouchPhase::Hold);
        assert_eq!((hold.x, hold.y), (52, 61));

        let end = tracker.observe(TouchReading::RELEASED);
        assert_eq!(end.phase, TouchPhase::End);
        assert_eq!((end.x, end.y), (52, 61));

        assert_eq!(tracker.observe(TouchReading::RELEASED), TouchSample::IDLE);
    }
}
