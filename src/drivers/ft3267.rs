use embedded_hal::i2c::I2c;

use crate::dial::TouchReading;

pub const FT3267_ADDR: u8 = 0x38;

const REG_TD_STATUS: u8 = 0x02;
const REG_G_MODE: u8 = 0xA4;
const REG_VENDOR_ID: u8 = 0xA8;
const G_MODE_POLLING: u8 = 0x00;
const EVENT_LIFT_UP: u8 = 0b01;
const EVENT_NONE: u8 = 0b11;
const MAX_TOUCH_POINTS: u8 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchInitStatus {
    Ready { vendor_id: u8 },
    VendorMismatch { vendor_id: u8 },
}

#[derive(Debug)]
pub enum TouchError<E> {
    I2c(E),
}

impl<E> From<E> for TouchError<E> {
    fn from(value: E) -> Self {
        Self::I2c(value)
    }
}

pub struct Ft3267<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Ft3267<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    pub fn init(&mut self) -> Result<TouchInitStatus, TouchError<I2C::Error>> {
        let vendor_id = self.read_reg(REG_VENDOR_ID)?;
        if vendor_id == 0x00 || vendor_id == 0xFF {
            return Ok(TouchInitStatus::VendorMismatch { vendor_id });
        }
        self.i2c.write(FT3267_ADDR, &[REG_G_MODE, G_MODE_POLLING])?;
        Ok(TouchInitStatus::Ready { vendor_id })
    }

    pub fn read(&mut self) -> Result<TouchReading, TouchError<I2C::Error>> {
        let mut frame = [0u8; 5];
        self.i2c
            .write_read(FT3267_ADDR, &[REG_TD_STATUS], &mut frame)?;
        Ok(decode_frame(&frame))
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, I2C::Error> {
        let mut value = [0u8; 1];
        self.i2c.write_read(FT3267_ADDR, &[reg], &mut value)?;
        Ok(value[0])
    }
}

/// Decodes `TD_STATUS` plus the first point's four coordinate registers.
pub(crate) fn decode_frame(frame: &[u8; 5]) -> TouchReading {
    let touches = frame[0] & 0x0F;
    if touches == 0 || touches > MAX_TOUCH_POINTS {
        return TouchReading::RELEASED;
    }

    let event = frame[1] >> 6;
    if event == EVENT_LIFT_UP || event == EVENT_NONE {
        return TouchReading::RELEASED;
    }

    let x = (i32::from(frame[1] & 0x0F) << 8) | i32::from(frame[2]);
    let y = (i32::from(frame[3] & 0x0F) << 8) | i32::from(frame[4]);
    TouchReading::contact(x, y)
}

#[cfg(test)]
mod tests {
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    use super::*;

    struct ScriptedBus {
        registers: [u8; 256],
        writes: std::vec::Vec<std::vec::Vec<u8>>,
    }

    impl ScriptedBus {
        fn new() -> Self {
            Self {
                registers: [0; 256],
                writes: std::vec::Vec::new(),
            }
        }
    }

    impl ErrorType for ScriptedBus {
        type Error = ErrorKind;
    }

    impl I2c for ScriptedBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if address != FT3267_ADDR {
                return Err(ErrorKind::Other);
            }
            let mut cursor = 0usize;
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        cursor = usize::from(bytes[0]);
                        self.writes.push(bytes.to_vec());
                    }
                    Operation::Read(buffer) => {
                        for byte in buffer.iter_mut() {
                            *byte = self.registers[cursor % 256];
                            cursor += 1;
                        }
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn decodes_contact_coordinates() {
        let frame = [0x01, 0x80, 0x77, 0x00, 0xC8];
        assert_eq!(decode_frame(&frame), TouchReading::contact(0x77, 200));

        let frame = [0x01, 0x00, 0xF0, 0x01, 0x02];
        assert_eq!(decode_frame(&frame), TouchReading::contact(240, 258));
    }

    #[test]
    fn lift_up_and_empty_frames_are_released() {
        assert_eq!(decode_frame(&[0, 0, 0, 0, 0]), TouchReading::RELEASED);
        assert_eq!(
            decode_frame(&[0x01, 0x40, 0x10, 0x00, 0x10]),
            TouchReading::RELEASED
        );
        assert_eq!(
            decode_frame(&[0x0F, 0x80, 0x10, 0x00, 0x10]),
            TouchReading::RELEASED
        );
    }

    #[test]
    fn init_switches_to_polling_mode() {
        let mut bus = ScriptedBus::new();
        bus.registers[usize::from(REG_VENDOR_ID)] = 0x11;
        let mut touch = Ft3267::new(bus);

        assert_eq!(
            touch.init().unwrap(),
            TouchInitStatus::Ready { vendor_id: 0x11 }
        );
        let bus = touch.release();
        assert!(bus.writes.contains(&std::vec![REG_G_MODE, G_MODE_POLLING]));
    }

    #[test]
    fn absent_controller_reports_mismatch() {
        let mut touch = Ft3267::new(ScriptedBus::new());
        assert_eq!(
            touch.init().unwrap(),
            TouchInitStatus::VendorMismatch { vendor_id: 0 }
        );
    }

    #[test]
    fn read_pulls_status_and_first_point() {
        let mut bus = ScriptedBus::new();
        bus.registers[2..7].copy_from_slice(&[0x01, 0x80, 0x30, 0x00, 0x40]);
        let mut touch = Ft3267::new(bus);
        assert_eq!(touch.read().unwrap(), TouchReading::contact(0x30, 0x40));
    }
}
