pub const TICKS_PER_STEP: i32 = 4;
pub const LONG_PRESS_MS: u64 = 3_000;
pub const DELETE_REPEAT_MS: u64 = 500;
pub const BUTTON_DEBOUNCE_MS: u64 = 10;
pub const DISPLAY_WIDTH: i32 = 240;

/// What a detent of rotation types when the Shift latch is not armed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyMapMode {
    /// Right Arrow clockwise, Down Arrow counter-clockwise.
    Arrows,
    /// `d` clockwise, `a` counter-clockwise.
    Letters,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DialConfig {
    pub display_width: i32,
    pub key_map: KeyMapMode,
    pub ticks_per_step: i32,
    pub long_press_ms: u64,
    pub delete_repeat_ms: u64,
}

impl DialConfig {
    pub const DEFAULT: Self = Self {
        display_width: DISPLAY_WIDTH,
        key_map: KeyMapMode::Arrows,
        ticks_per_step: TICKS_PER_STEP,
        long_press_ms: LONG_PRESS_MS,
        delete_repeat_ms: DELETE_REPEAT_MS,
    };

    pub const fn with_key_map(self, key_map: KeyMapMode) -> Self {
        Self { key_map, ..self }
    }
}

impl Default for DialConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
