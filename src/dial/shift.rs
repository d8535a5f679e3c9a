/// One-shot Shift modifier armed from the touch surface.
///
/// Only printable emissions take the latch; control keys leave it alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShiftLatch {
    armed: bool,
}

impl ShiftLatch {
    pub const fn new() -> Self {
        Self { armed: false }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Flips the latch and returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.armed = !self.armed;
        self.armed
    }

    /// Returns whether the latch was armed and clears it.
    pub fn take(&mut self) -> bool {
        core::mem::replace(&mut self.armed, false)
    }
}
