/*
 *  display/drivers/ch1116.rs
 *
 *  MicScope - hear it, see it
 *  (c) 2020-26 Stuart Hunter
 *
 *  CH1116 128x64 OLED display driver implementation
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

use display_interface::{DataFormat, WriteOnlyDataCommand};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::DisplayConfig;
use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::display::commands::{
    self, Command, DISPLAY_OFF, INIT_SEQUENCE, INVERSE_DISPLAY, NORMAL_DISPLAY, SET_CONTRAST,
};
use crate::display::error::DisplayError;
use crate::display::framebuffer::PageFrameBuffer;
use crate::display::traits::{DisplayCapabilities, DisplayDriver};
use crate::func_timer::FunctionTimer;

use log::{debug, info};

/// Panel needs this long after power before it listens
const POWER_UP_MS: u32 = 100;
/// Reset pulse width, and the settle time after releasing it
const RESET_PULSE_MS: u32 = 10;
/// Charge pump settle time after DISPLAY_ON
const SETTLE_MS: u32 = 100;

/// CH1116 display driver
///
/// Owns the page framebuffer and streams it to the controller through any
/// `WriteOnlyDataCommand` interface, normally an
/// [`I2cDisplayBus`](crate::display::bus::I2cDisplayBus). The reset line
/// is optional; boards that tie it high pass `None`.
pub struct Ch1116Driver<DI, RST, DL> {
    interface: DI,
    reset: Option<RST>,
    delay: DL,

    /// Framebuffer for drawing operations
    framebuffer: PageFrameBuffer,

    /// Display capabilities
    capabilities: DisplayCapabilities,

    /// Applied after the power-on sequence
    contrast: Option<u8>,
    invert: Option<bool>,
}

impl<DI, RST, DL> Ch1116Driver<DI, RST, DL>
where
    DI: WriteOnlyDataCommand,
    RST: OutputPin,
    DL: DelayNs,
{
    /// Create a new CH1116 driver; no bus traffic happens until `init()`
    ///
    /// Only the 128x64 panel is supported.
    pub fn new(
        interface: DI,
        reset: Option<RST>,
        delay: DL,
        config: &DisplayConfig,
    ) -> Result<Self, DisplayError> {
        let width = config.width.unwrap_or(DISPLAY_WIDTH);
        let height = config.height.unwrap_or(DISPLAY_HEIGHT);
        if (width, height) != (DISPLAY_WIDTH, DISPLAY_HEIGHT) {
            return Err(DisplayError::InvalidConfiguration(format!(
                "Unsupported CH1116 size: {}x{}", width, height
            )));
        }

        let capabilities = DisplayCapabilities {
            width,
            height,
        };

        Ok(Self {
            interface,
            reset,
            delay,
            framebuffer: PageFrameBuffer::new(width, height)?,
            capabilities,
            contrast: config.contrast,
            invert: config.invert,
        })
    }

    pub fn framebuffer(&self) -> &PageFrameBuffer {
        &self.framebuffer
    }

    /// Send each command of `sequence` in order, stopping at the first failure
    pub fn send_sequence(&mut self, sequence: &[Command]) -> Result<(), DisplayError> {
        for command in sequence {
            self.interface
                .send_commands(DataFormat::U8(&[command.opcode]))
                .map_err(|e| DisplayError::InitializationFailed(format!(
                    "command 0x{:02X} not acknowledged: {:?}", command.opcode, e
                )))?;
            if !command.params.is_empty() {
                self.interface
                    .send_commands(DataFormat::U8(command.params))
                    .map_err(|e| DisplayError::InitializationFailed(format!(
                        "parameters of 0x{:02X} not acknowledged: {:?}", command.opcode, e
                    )))?;
            }
        }
        Ok(())
    }

    fn hardware_reset(&mut self) -> Result<(), DisplayError> {
        let Some(rst) = self.reset.as_mut() else {
            debug!("CH1116 has no reset line, skipping hardware reset");
            return Ok(());
        };
        rst.set_low()
            .map_err(|e| DisplayError::GpioError(format!("reset low: {:?}", e)))?;
        self.delay.delay_ms(RESET_PULSE_MS);
        rst.set_high()
            .map_err(|e| DisplayError::GpioError(format!("reset high: {:?}", e)))?;
        self.delay.delay_ms(RESET_PULSE_MS);
        Ok(())
    }
}

impl<DI, RST, DL> DisplayDriver for Ch1116Driver<DI, RST, DL>
where
    DI: WriteOnlyDataCommand + Send,
    RST: OutputPin + Send,
    DL: DelayNs + Send,
{
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        self.delay.delay_ms(POWER_UP_MS);
        self.hardware_reset()?;
        self.send_sequence(INIT_SEQUENCE)?;

        if let Some(contrast) = self.contrast {
            self.set_brightness(contrast)?;
        }
        if let Some(invert) = self.invert {
            self.set_invert(invert)?;
        }

        self.delay.delay_ms(SETTLE_MS);
        self.clear();
        self.flush()?;

        info!("CH1116 initialized successfully ({}x{})",
            self.capabilities.width, self.capabilities.height);
        Ok(())
    }

    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError> {
        self.interface.send_commands(DataFormat::U8(&[SET_CONTRAST, value]))?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        let _timer = FunctionTimer::new("ch1116::flush");
        for page in 0..self.framebuffer.pages() {
            let Some(bytes) = self.framebuffer.page(page) else {
                break;
            };
            self.interface.send_commands(DataFormat::U8(&commands::page_start(page as u8)))?;
            self.interface.send_data(DataFormat::U8(bytes))?;
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.framebuffer.clear();
    }

    fn draw_pixel(&mut self, x: i32, y: i32, color: BinaryColor) {
        self.framebuffer.set_pixel(x, y, color.is_on());
    }

    fn set_invert(&mut self, inverted: bool) -> Result<(), DisplayError> {
        let cmd = if inverted { INVERSE_DISPLAY } else { NORMAL_DISPLAY };
        self.interface.send_commands(DataFormat::U8(&[cmd]))?;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), DisplayError> {
        self.clear();
        self.flush()?;
        self.interface.send_commands(DataFormat::U8(&[DISPLAY_OFF]))?;
        info!("CH1116 display off");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use display_interface::DisplayError as InterfaceError;
    use embedded_hal::digital::ErrorType;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Cmd(u8),
        Data(Vec<u8>),
        ResetLow,
        ResetHigh,
        Delay(u32),
    }

    type Log = Arc<Mutex<Vec<Event>>>;

    /// Records bus traffic, pins and delays into one ordered log
    struct RecordingInterface {
        log: Log,
        fail_after: Option<usize>,
        sent: usize,
    }

    impl RecordingInterface {
        fn check(&mut self) -> Result<(), InterfaceError> {
            self.sent += 1;
            match self.fail_after {
                Some(n) if self.sent > n => Err(InterfaceError::BusWriteError),
                _ => Ok(()),
            }
        }
    }

    impl WriteOnlyDataCommand for RecordingInterface {
        fn send_commands(&mut self, cmd: DataFormat<'_>) -> Result<(), InterfaceError> {
            self.check()?;
            if let DataFormat::U8(bytes) = cmd {
                let mut log = self.log.lock().unwrap();
                log.extend(bytes.iter().map(|&b| Event::Cmd(b)));
            }
            Ok(())
        }

        fn send_data(&mut self, buf: DataFormat<'_>) -> Result<(), InterfaceError> {
            self.check()?;
            if let DataFormat::U8(bytes) = buf {
                self.log.lock().unwrap().push(Event::Data(bytes.to_vec()));
            }
            Ok(())
        }
    }

    struct RecordingPin(Log);

    impl ErrorType for RecordingPin {
        type Error = Infallible;
    }

    impl OutputPin for RecordingPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0.lock().unwrap().push(Event::ResetLow);
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.0.lock().unwrap().push(Event::ResetHigh);
            Ok(())
        }
    }

    struct RecordingDelay(Log);

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, _ns: u32) {}
        fn delay_ms(&mut self, ms: u32) {
            self.0.lock().unwrap().push(Event::Delay(ms));
        }
    }

    type TestDriver = Ch1116Driver<RecordingInterface, RecordingPin, RecordingDelay>;

    fn driver_with(config: &DisplayConfig, with_reset: bool, fail_after: Option<usize>) -> (TestDriver, Log) {
        let log: Log = Arc::default();
        let interface = RecordingInterface { log: log.clone(), fail_after, sent: 0 };
        let reset = with_reset.then(|| RecordingPin(log.clone()));
        let driver = Ch1116Driver::new(interface, reset, RecordingDelay(log.clone()), config).unwrap();
        (driver, log)
    }

    fn commands_of(log: &[Event]) -> Vec<u8> {
        log.iter()
            .filter_map(|e| if let Event::Cmd(b) = e { Some(*b) } else { None })
            .collect()
    }

    const INIT_BYTES: [u8; 24] = [
        0xAE, 0x02, 0x10, 0x40, 0x81, 0xCF, 0xA1, 0xA6, 0xA8, 0x3F, 0xC8, 0xD3,
        0x00, 0xD5, 0x80, 0xD9, 0xF1, 0xDA, 0x12, 0xDB, 0x40, 0x8D, 0x14, 0xAF,
    ];

    #[test]
    fn test_rejects_other_sizes() {
        let log: Log = Arc::default();
        let config = DisplayConfig { width: Some(128), height: Some(32), ..Default::default() };
        let result = Ch1116Driver::new(
            RecordingInterface { log: log.clone(), fail_after: None, sent: 0 },
            None::<RecordingPin>,
            RecordingDelay(log),
            &config,
        );
        assert!(matches!(result, Err(DisplayError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_init_reset_and_sequence_order() {
        let (mut driver, log) = driver_with(&DisplayConfig::default(), true, None);
        driver.init().unwrap();

        let log = log.lock().unwrap();
        assert_eq!(
            &log[..5],
            &[Event::Delay(100), Event::ResetLow, Event::Delay(10), Event::ResetHigh, Event::Delay(10)]
        );

        let cmds = commands_of(&log);
        assert_eq!(&cmds[..INIT_BYTES.len()], &INIT_BYTES);

        // settle delay sits between DISPLAY_ON and the first page write
        let on = log.iter().position(|e| *e == Event::Cmd(0xAF)).unwrap();
        assert_eq!(log[on + 1], Event::Delay(100));
    }

    #[test]
    fn test_init_without_reset_line() {
        let (mut driver, log) = driver_with(&DisplayConfig::default(), false, None);
        driver.init().unwrap();

        let log = log.lock().unwrap();
        assert!(!log.contains(&Event::ResetLow));
        assert_eq!(log[0], Event::Delay(100));
        assert_eq!(log[1], Event::Cmd(0xAE));
    }

    #[test]
    fn test_init_ends_with_blank_flush() {
        let (mut driver, log) = driver_with(&DisplayConfig::default(), false, None);
        driver.draw_pixel(3, 3, BinaryColor::On);
        driver.init().unwrap();

        let log = log.lock().unwrap();
        let pages: Vec<&Vec<u8>> = log.iter()
            .filter_map(|e| if let Event::Data(d) = e { Some(d) } else { None })
            .collect();
        assert_eq!(pages.len(), 8);
        assert!(pages.iter().all(|p| p.len() == 128 && p.iter().all(|&b| b == 0)));
    }

    #[test]
    fn test_configured_contrast_and_invert_follow_sequence() {
        let config = DisplayConfig { contrast: Some(0x20), invert: Some(true), ..Default::default() };
        let (mut driver, log) = driver_with(&config, false, None);
        driver.init().unwrap();

        let cmds = commands_of(&log.lock().unwrap());
        assert_eq!(&cmds[INIT_BYTES.len()..INIT_BYTES.len() + 3], &[0x81, 0x20, 0xA7]);
    }

    #[test]
    fn test_flush_pages() {
        let (mut driver, log) = driver_with(&DisplayConfig::default(), false, None);
        driver.draw_pixel(0, 0, BinaryColor::On);
        driver.draw_pixel(127, 63, BinaryColor::On);
        driver.flush().unwrap();

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 8 * 4);
        for (page, chunk) in log.chunks(4).enumerate() {
            assert_eq!(chunk[0], Event::Cmd(0xB0 + page as u8));
            assert_eq!(chunk[1], Event::Cmd(0x02));
            assert_eq!(chunk[2], Event::Cmd(0x10));
            let Event::Data(bytes) = &chunk[3] else { panic!("expected data burst") };
            assert_eq!(bytes.len(), 128);
            match page {
                0 => assert_eq!(bytes[0], 0x01),
                7 => assert_eq!(bytes[127], 0x80),
                _ => assert!(bytes.iter().all(|&b| b == 0)),
            }
        }
    }

    #[test]
    fn test_init_failure_is_reported() {
        let (mut driver, _log) = driver_with(&DisplayConfig::default(), false, Some(3));
        match driver.init() {
            Err(DisplayError::InitializationFailed(msg)) => assert!(msg.contains("0x40"), "{}", msg),
            other => panic!("unexpected {:?}", other.err()),
        }
    }

    #[test]
    fn test_flush_failure_is_returned() {
        let (mut driver, _log) = driver_with(&DisplayConfig::default(), false, Some(1));
        assert!(matches!(
            driver.flush(),
            Err(DisplayError::InterfaceError(InterfaceError::BusWriteError))
        ));
    }

    #[test]
    fn test_shutdown_turns_panel_off() {
        let (mut driver, log) = driver_with(&DisplayConfig::default(), false, None);
        driver.draw_pixel(9, 9, BinaryColor::On);
        driver.shutdown().unwrap();

        assert_eq!(driver.framebuffer().count_on(), 0);
        assert_eq!(log.lock().unwrap().last(), Some(&Event::Cmd(0xAE)));
    }

    #[test]
    fn test_brightness_and_invert_commands() {
        let (mut driver, log) = driver_with(&DisplayConfig::default(), false, None);
        driver.set_brightness(0x7F).unwrap();
        driver.set_invert(false).unwrap();
        assert_eq!(commands_of(&log.lock().unwrap()), vec![0x81, 0x7F, 0xA6]);
    }
}
