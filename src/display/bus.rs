/*
 *  display/bus.rs
 *
 *  MicScope - hear it, see it
 *  (c) 2020-26 Stuart Hunter
 *
 *  I2C transport for SSD1306-family controllers
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use display_interface::{DataFormat, DisplayError as InterfaceError, WriteOnlyDataCommand};
use embedded_hal::i2c::I2c;
use log::debug;

/// Default 7-bit address of CH1116/SSD1306 modules (0x3D with SA0 high)
pub const DEFAULT_I2C_ADDRESS: u8 = 0x3C;

/// Control byte announcing a single command
const CONTROL_COMMAND: u8 = 0x00;
/// Control byte announcing a run of display RAM bytes
const CONTROL_DATA: u8 = 0x40;

/// Command/data interface over a plain I2C bus.
///
/// Every command byte travels in its own transaction (`0x00, cmd`), every
/// data burst in exactly one transaction (`0x40, data...`).
pub struct I2cDisplayBus<I2C> {
    i2c: I2C,
    address: u8,
    scratch: Vec<u8>,
}

impl<I2C: I2c> I2cDisplayBus<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address, scratch: Vec::with_capacity(133) }
    }

    fn command(&mut self, cmd: u8) -> Result<(), InterfaceError> {
        let address = self.address;
        self.i2c.write(address, &[CONTROL_COMMAND, cmd]).map_err(|e| {
            debug!("I2C command 0x{:02X} to 0x{:02X} failed: {:?}", cmd, address, e);
            InterfaceError::BusWriteError
        })
    }

    fn burst(&mut self) -> Result<(), InterfaceError> {
        let address = self.address;
        self.i2c.write(address, &self.scratch).map_err(|e| {
            debug!("I2C data burst of {} bytes to 0x{:02X} failed: {:?}",
                self.scratch.len() - 1, address, e);
            InterfaceError::BusWriteError
        })
    }
}

impl<I2C: I2c> WriteOnlyDataCommand for I2cDisplayBus<I2C> {
    fn send_commands(&mut self, cmd: DataFormat<'_>) -> Result<(), InterfaceError> {
        match cmd {
            DataFormat::U8(bytes) => {
                for &b in bytes {
                    self.command(b)?;
                }
                Ok(())
            }
            DataFormat::U8Iter(iter) => {
                for b in iter {
                    self.command(b)?;
                }
                Ok(())
            }
            _ => Err(InterfaceError::DataFormatNotImplemented),
        }
    }

    fn send_data(&mut self, buf: DataFormat<'_>) -> Result<(), InterfaceError> {
        self.scratch.clear();
        self.scratch.push(CONTROL_DATA);
        match buf {
            DataFormat::U8(bytes) => self.scratch.extend_from_slice(bytes),
            DataFormat::U8Iter(iter) => self.scratch.extend(iter),
            _ => return Err(InterfaceError::DataFormatNotImplemented),
        }
        self.burst()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    #[derive(Default)]
    struct RecordingI2c {
        writes: Vec<(u8, Vec<u8>)>,
        fail: bool,
    }

    impl ErrorType for RecordingI2c {
        type Error = ErrorKind;
    }

    impl I2c for RecordingI2c {
        fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
            if self.fail {
                return Err(ErrorKind::Other);
            }
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.writes.push((address, bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_commands_are_individual_transactions() {
        let mut bus = I2cDisplayBus::new(RecordingI2c::default(), 0x3C);
        bus.send_commands(DataFormat::U8(&[0xAE, 0x81, 0xCF])).unwrap();

        assert_eq!(
            bus.i2c.writes,
            vec![(0x3C, vec![0x00, 0xAE]), (0x3C, vec![0x00, 0x81]), (0x3C, vec![0x00, 0xCF])]
        );
    }

    #[test]
    fn test_data_is_one_burst() {
        let mut bus = I2cDisplayBus::new(RecordingI2c::default(), 0x3D);
        let page = [0xAAu8; 128];
        bus.send_data(DataFormat::U8(&page)).unwrap();

        assert_eq!(bus.i2c.writes.len(), 1);
        let (addr, bytes) = &bus.i2c.writes[0];
        assert_eq!(*addr, 0x3D);
        assert_eq!(bytes.len(), 129);
        assert_eq!(bytes[0], 0x40);
        assert!(bytes[1..].iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn test_bus_failure_maps_to_write_error() {
        let mut bus = I2cDisplayBus::new(RecordingI2c { fail: true, ..Default::default() }, 0x3C);
        assert!(matches!(
            bus.send_commands(DataFormat::U8(&[0xAF])),
            Err(InterfaceError::BusWriteError)
        ));
        assert!(matches!(
            bus.send_data(DataFormat::U8(&[0x00])),
            Err(InterfaceError::BusWriteError)
        ));
    }

    #[test]
    fn test_wide_formats_rejected() {
        let mut bus = I2cDisplayBus::new(RecordingI2c::default(), 0x3C);
        assert!(matches!(
            bus.send_data(DataFormat::U16(&[0x1234])),
            Err(InterfaceError::DataFormatNotImplemented)
        ));
        assert!(bus.i2c.writes.is_empty());
    }
}
