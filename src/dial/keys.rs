/// Keys the dial can emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HidKey {
    Escape,
    Delete,
    RightArrow,
    DownArrow,
    LeftShift,
    /// Printable ASCII, `b'\n'` maps to Enter.
    Char(u8),
}

impl HidKey {
    pub const ENTER: Self = Self::Char(b'\n');
}

const USAGE_A: u8 = 0x04;
const USAGE_1: u8 = 0x1E;
const USAGE_0: u8 = 0x27;
const USAGE_ENTER: u8 = 0x28;
const USAGE_ESCAPE: u8 = 0x29;
const USAGE_BACKSPACE: u8 = 0x2A;
const USAGE_TAB: u8 = 0x2B;
const USAGE_SPACE: u8 = 0x2C;
const USAGE_DELETE_FORWARD: u8 = 0x4C;
const USAGE_RIGHT_ARROW: u8 = 0x4F;
const USAGE_DOWN_ARROW: u8 = 0x51;

pub const MODIFIER_LEFT_SHIFT: u8 = 0x02;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyUsage {
    /// Bit in the report modifier byte.
    Modifier(u8),
    /// Keyboard page usage id, with an implied Shift for upper-case ASCII.
    Key { usage: u8, shifted: bool },
}

pub fn key_usage(key: HidKey) -> Option<KeyUsage> {
    let plain = |usage| Some(KeyUsage::Key {
        usage,
        shifted: false,
    });
    match key {
        HidKey::Escape => plain(USAGE_ESCAPE),
        HidKey::Delete => plain(USAGE_DELETE_FORWARD),
        HidKey::RightArrow => plain(USAGE_RIGHT_ARROW),
        HidKey::DownArrow => plain(USAGE_DOWN_ARROW),
        HidKey::LeftShift => Some(KeyUsage::Modifier(MODIFIER_LEFT_SHIFT)),
        HidKey::Char(ch) => ascii_usage(ch),
    }
}

fn ascii_usage(ch: u8) -> Option<KeyUsage> {
    let (usage, shifted) = match ch {
        b'a'..=b'z' => (USAGE_A + (ch - b'a'), false),
        b'A'..=b'Z' => (USAGE_A + (ch - b'A'), true),
        b'1'..=b'9' => (USAGE_1 + (ch - b'1'), false),
        b'0' => (USAGE_0, false),
        b'\n' | b'\r' => (USAGE_ENTER, false),
        b'\x08' => (USAGE_BACKSPACE, false),
        b'\t' => (USAGE_TAB, false),
        b' ' => (USAGE_SPACE, false),
        _ => return None,
    };
    Some(KeyUsage::Key { usage, shifted })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportError {
    UnmappedKey(HidKey),
    RolloverFull,
}

/// Boot-protocol keyboard report kept in sync with press/release calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyReport {
    pub modifier: u8,
    pub keycodes: [u8; 6],
    /// Modifier bits implied by held upper-case keys.
    implied_shift: u8,
}

impl KeyReport {
    pub const fn new() -> Self {
        Self {
            modifier: 0,
            keycodes: [0; 6],
            implied_shift: 0,
        }
    }

    pub fn press(&mut self, key: HidKey) -> Result<(), ReportError> {
        match key_usage(key).ok_or(ReportError::UnmappedKey(key))? {
            KeyUsage::Modifier(bit) => {
                self.modifier |= bit;
                Ok(())
            }
            KeyUsage::Key { usage, shifted } => {
                if self.keycodes.contains(&usage) {
                    return Ok(());
                }
                let slot = self
                    .keycodes
                    .iter_mut()
                    .find(|slot| **slot == 0)
                    .ok_or(ReportError::RolloverFull)?;
                *slot = usage;
                if shifted {
                    self.implied_shift |= MODIFIER_LEFT_SHIFT;
                }
                Ok(())
            }
        }
    }

    pub fn release(&mut self, key: HidKey) -> Result<(), ReportError> {
        match key_usage(key).ok_or(ReportError::UnmappedKey(key))? {
            KeyUsage::Modifier(bit) => self.modifier &= !bit,
            KeyUsage::Key { usage, shifted } => {
                for slot in &mut self.keycodes {
                    if *slot == usage {
                        *slot = 0;
                    }
                }
                if shifted {
                    self.implied_shift &= !MODIFIER_LEFT_SHIFT;
                }
            }
        }
        Ok(())
    }

    /// Modifier byte as sent on the wire.
    pub fn wire_modifier(&self) -> u8 {
        self.modifier | self.implied_shift
    }

    pub fn is_empty(&self) -> bool {
        self.wire_modifier() == 0 && self.keycodes.iter().all(|code| *code == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_and_enter_map_to_keyboard_page() {
        assert_eq!(
            key_usage(HidKey::Char(b'a')),
            Some(KeyUsage::Key {
                usage: 0x04,
                shifted: false
            })
        );
        assert_eq!(
            key_usage(HidKey::Char(b'd')),
            Some(KeyUsage::Key {
                usage: 0x07,
                shifted: false
            })
        );
        assert_eq!(
            key_usage(HidKey::ENTER),
            Some(KeyUsage::Key {
                usage: 0x28,
                shifted: false
            })
        );
        assert_eq!(
            key_usage(HidKey::Char(b'0')),
            Some(KeyUsage::Key {
                usage: 0x27,
                shifted: false
            })
        );
        assert_eq!(key_usage(HidKey::Char(b'~')), None);
    }

    #[test]
    fn shift_is_a_modifier_bit() {
        let mut report = KeyReport::new();
        report.press(HidKey::LeftShift).unwrap();
        report.press(HidKey::Char(b'd')).unwrap();
        assert_eq!(report.wire_modifier(), MODIFIER_LEFT_SHIFT);
        assert_eq!(report.keycodes, [0x07, 0, 0, 0, 0, 0]);

        report.release(HidKey::Char(b'd')).unwrap();
        report.release(HidKey::LeftShift).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn upper_case_implies_shift_only_while_held() {
        let mut report = KeyReport::new();
        report.press(HidKey::Char(b'A')).unwrap();
        assert_eq!(report.wire_modifier(), MODIFIER_LEFT_SHIFT);
        assert_eq!(report.modifier, 0);
        report.release(HidKey::Char(b'A')).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn repeated_press_does_not_duplicate_slot() {
        let mut report = KeyReport::new();
        report.press(HidKey::Delete).unwrap();
        report.press(HidKey::Delete).unwrap();
        assert_eq!(report.keycodes, [0x4C, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn rollover_is_bounded() {
        let mut report = KeyReport::new();
        for ch in b"abcdef" {
            report.press(HidKey::Char(*ch)).unwrap();
        }
        assert_eq!(
            report.press(HidKey::Char(b'g')),
            Err(ReportError::RolloverFull)
        );
    }

    #[test]
    fn unmapped_key_is_rejected() {
        let mut report = KeyReport::new();
        assert_eq!(
            report.press(HidKey::Char(0x7F)),
            Err(ReportError::UnmappedKey(HidKey::Char(0x7F)))
        );
    }
}
