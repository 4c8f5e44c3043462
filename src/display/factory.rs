/*
 *  display/factory.rs
 *
 *  MicScope - hear it, see it
 *  (c) 2020-26 Stuart Hunter
 *
 *  Builds the configured display driver on Linux hardware
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

use embedded_hal::digital::PinState;
use linux_embedded_hal::{Delay, I2cdev, SysfsPin};

use crate::config::DisplayConfig;
use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use crate::display::bus::I2cDisplayBus;
use crate::display::drivers::ch1116::Ch1116Driver;
use crate::display::error::DisplayError;
use crate::display::traits::DisplayDriver;
use log::{debug, info};

/// Type alias for boxed display driver trait objects
pub type BoxedDriver = Box<dyn DisplayDriver>;

/// CH1116 wired the usual way on a Linux SBC
pub type LinuxCh1116 = Ch1116Driver<I2cDisplayBus<I2cdev>, SysfsPin, Delay>;

/// Factory for creating display drivers from configuration
pub struct DisplayDriverFactory;

impl DisplayDriverFactory {
    /// Create a display driver from configuration
    ///
    /// Opens the I2C bus, claims the reset GPIO when one is configured and
    /// returns the driver un-initialized; the caller runs `init()` so a
    /// failure there can be reported as fatal.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let config = DisplayConfig {
    ///     bus: Some("/dev/i2c-1".to_string()),
    ///     address: Some(0x3C),
    ///     ..Default::default()
    /// };
    ///
    /// let mut driver = DisplayDriverFactory::create_from_config(&config)?;
    /// driver.init()?;
    /// ```
    pub fn create_from_config(config: &DisplayConfig) -> Result<BoxedDriver, DisplayError> {
        Self::validate_config(config)?;

        let bus = config.bus();
        let address = config.address();
        info!("Initializing CH1116 on {} at address 0x{:02X}", bus, address);

        let i2c = I2cdev::new(bus)
            .map_err(|e| DisplayError::I2cError(format!("Failed to open {}: {}", bus, e)))?;

        let reset = match config.rst_pin {
            Some(pin) => Some(Self::reset_pin(pin)?),
            None => {
                debug!("No reset GPIO configured");
                None
            }
        };

        let driver: LinuxCh1116 = Ch1116Driver::new(
            I2cDisplayBus::new(i2c, address),
            reset,
            Delay,
            config,
        )?;
        Ok(Box::new(driver))
    }

    /// Validate configuration without touching hardware
    pub fn validate_config(config: &DisplayConfig) -> Result<(), DisplayError> {
        let width = config.width.unwrap_or(DISPLAY_WIDTH);
        let height = config.height.unwrap_or(DISPLAY_HEIGHT);
        if (width, height) != (DISPLAY_WIDTH, DISPLAY_HEIGHT) {
            return Err(DisplayError::InvalidConfiguration(format!(
                "only {}x{} panels are supported, got {}x{}",
                DISPLAY_WIDTH, DISPLAY_HEIGHT, width, height
            )));
        }

        if config.address() > 0x7F {
            return Err(DisplayError::InvalidConfiguration(format!(
                "I2C address 0x{:02X} is not a 7-bit address", config.address()
            )));
        }

        if config.bus().is_empty() {
            return Err(DisplayError::InvalidConfiguration("empty I2C bus path".to_string()));
        }

        Ok(())
    }

    fn reset_pin(pin: u32) -> Result<SysfsPin, DisplayError> {
        debug!("Claiming GPIO {} for display reset", pin);
        let gpio = SysfsPin::new(pin as u64);
        gpio.export()
            .map_err(|e| DisplayError::GpioError(format!("export GPIO {}: {}", pin, e)))?;
        gpio.into_output_pin(PinState::High)
            .map_err(|e| DisplayError::GpioError(format!("GPIO {} as output: {}", pin, e)))
    }
}
