/*
 *  display/drivers/mock.rs
 *
 *  MicScope - hear it, see it
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock display driver for testing without hardware
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

use embedded_graphics::pixelcolor::BinaryColor;

use crate::config::DisplayConfig;
use crate::display::error::DisplayError;
use crate::display::framebuffer::PageFrameBuffer;
use crate::display::traits::{DisplayCapabilities, DisplayDriver};

use std::sync::{Arc, Mutex};

/// Mock display driver for testing
///
/// Simulates a panel without hardware. Every operation is recorded in a
/// shared [`MockDriverState`] and the framebuffer stays inspectable, so
/// render and monitor tests can check exactly what would have reached
/// the glass.
#[derive(Debug, Clone)]
pub struct MockDriver {
    /// Framebuffer for drawing operations
    framebuffer: PageFrameBuffer,

    /// Display capabilities
    capabilities: DisplayCapabilities,

    /// Shared state for testing
    state: Arc<Mutex<MockDriverState>>,
}

/// Internal state for the mock driver (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockDriverState {
    /// Number of times init() was called
    pub init_count: usize,

    /// Number of times flush() succeeded
    pub flush_count: usize,

    /// Number of times clear() was called
    pub clear_count: usize,

    /// Number of times shutdown() was called
    pub shutdown_count: usize,

    /// Last brightness value set
    pub last_brightness: Option<u8>,

    /// Last invert state set
    pub last_invert: Option<bool>,

    /// Whether the driver is initialized
    pub is_initialized: bool,

    /// Framebuffer image captured by the most recent flush
    pub last_flushed: Option<Vec<u8>>,

    /// Simulate failures (for error testing)
    pub simulate_flush_failure: bool,
    pub simulate_init_failure: bool,
}

impl MockDriver {
    /// Create a new mock driver from display configuration
    pub fn new(config: &DisplayConfig) -> Result<Self, DisplayError> {
        let width = config.width.unwrap_or(128);
        let height = config.height.unwrap_or(64);

        let capabilities = DisplayCapabilities {
            width,
            height,
        };

        let framebuffer = PageFrameBuffer::new(width, height)?;

        Ok(Self {
            framebuffer,
            capabilities,
            state: Arc::new(Mutex::new(MockDriverState::default())),
        })
    }

    /// Create a mock driver with specific dimensions
    pub fn new_with_size(width: u32, height: u32) -> Result<Self, DisplayError> {
        let config = DisplayConfig {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        };
        Self::new(&config)
    }

    pub fn framebuffer(&self) -> &PageFrameBuffer {
        &self.framebuffer
    }

    /// Get pixel at position for testing
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<bool> {
        self.framebuffer.get_pixel(x, y)
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockDriverState>> {
        Arc::clone(&self.state)
    }

    /// Reset state counters (useful between tests)
    pub fn reset_state(&mut self) {
        let mut state = self.state.lock().unwrap();
        *state = MockDriverState::default();
    }

    /// Count number of pixels set to On
    pub fn count_on_pixels(&self) -> usize {
        self.framebuffer.count_on()
    }

    /// Render the framebuffer as text rows, '#' for lit pixels (handy in assert messages)
    pub fn ascii_art(&self) -> String {
        let mut out = String::new();
        for y in 0..self.capabilities.height as i32 {
            for x in 0..self.capabilities.width as i32 {
                out.push(if self.get_pixel(x, y) == Some(true) { '#' } else { '.' });
            }
            out.push('\n');
        }
        out
    }
}

impl DisplayDriver for MockDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();

        if state.simulate_init_failure {
            return Err(DisplayError::InitializationFailed("Simulated init failure".to_string()));
        }

        state.init_count += 1;
        state.is_initialized = true;
        Ok(())
    }

    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();
        state.last_brightness = Some(value);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();

        if state.simulate_flush_failure {
            return Err(DisplayError::I2cError("Simulated flush failure".to_string()));
        }

        state.flush_count += 1;
        state.last_flushed = Some(self.framebuffer.as_bytes().to_vec());
        Ok(())
    }

    fn clear(&mut self) {
        self.state.lock().unwrap().clear_count += 1;
        self.framebuffer.clear();
    }

    fn draw_pixel(&mut self, x: i32, y: i32, color: BinaryColor) {
        self.framebuffer.set_pixel(x, y, color.is_on());
    }

    fn set_invert(&mut self, inverted: bool) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();
        state.last_invert = Some(inverted);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), DisplayError> {
        self.state.lock().unwrap().shutdown_count += 1;
        self.clear();
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_driver_creation() {
        let driver = MockDriver::new_with_size(128, 64).unwrap();
        assert_eq!(driver.capabilities().width, 128);
        assert_eq!(driver.capabilities().height, 64);
        assert_eq!(driver.count_on_pixels(), 0);
    }

    #[test]
    fn test_mock_driver_init() {
        let mut driver = MockDriver::new_with_size(128, 64).unwrap();

        let state = driver.state();
        assert_eq!(state.lock().unwrap().init_count, 0);
        assert!(!state.lock().unwrap().is_initialized);

        driver.init().unwrap();

        assert_eq!(state.lock().unwrap().init_count, 1);
        assert!(state.lock().unwrap().is_initialized);
    }

    #[test]
    fn test_mock_driver_clear() {
        let mut driver = MockDriver::new_with_size(128, 64).unwrap();
        driver.draw_pixel(0, 0, BinaryColor::On);
        driver.draw_pixel(10, 10, BinaryColor::On);
        assert_eq!(driver.count_on_pixels(), 2);

        driver.clear();

        assert_eq!(driver.count_on_pixels(), 0);
        assert_eq!(driver.state().lock().unwrap().clear_count, 1);
        // clearing is framebuffer only
        assert_eq!(driver.state().lock().unwrap().flush_count, 0);
    }

    #[test]
    fn test_mock_driver_flush_snapshot() {
        let mut driver = MockDriver::new_with_size(128, 64).unwrap();
        driver.draw_pixel(1, 0, BinaryColor::On);
        driver.flush().unwrap();

        let state = driver.state();
        let state = state.lock().unwrap();
        assert_eq!(state.flush_count, 1);
        assert_eq!(state.last_flushed.as_ref().map(|b| b[1]), Some(1));
    }

    #[test]
    fn test_mock_driver_simulated_failures() {
        let mut driver = MockDriver::new_with_size(128, 64).unwrap();
        driver.state().lock().unwrap().simulate_init_failure = true;
        driver.state().lock().unwrap().simulate_flush_failure = true;

        assert!(matches!(driver.init(), Err(DisplayError::InitializationFailed(_))));
        assert!(driver.flush().is_err());

        driver.reset_state();
        assert!(driver.init().is_ok());
        assert!(driver.flush().is_ok());
    }

    #[test]
    fn test_mock_driver_brightness_and_invert() {
        let mut driver = MockDriver::new_with_size(128, 64).unwrap();

        driver.set_brightness(200).unwrap();
        driver.set_invert(true).unwrap();

        let state = driver.state();
        assert_eq!(state.lock().unwrap().last_brightness, Some(200));
        assert_eq!(state.lock().unwrap().last_invert, Some(true));
    }

    #[test]
    fn test_ascii_art_dimensions() {
        let mut driver = MockDriver::new_with_size(128, 64).unwrap();
        driver.draw_pixel(0, 0, BinaryColor::On);
        let art = driver.ascii_art();
        assert_eq!(art.lines().count(), 64);
        assert!(art.starts_with('#'));
    }
}
