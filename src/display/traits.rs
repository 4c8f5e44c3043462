/*
 *  display/traits.rs
 *
 *  MicScope - hear it, see it
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definitions for display driver abstraction
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
use crate::display::error::DisplayError;

/// Display capabilities and metadata
#[derive(Debug, Clone)]
pub struct DisplayCapabilities {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,
}

/// Minimal hardware abstraction - all display drivers must implement this trait
///
/// Drawing goes through a single primitive, [`DisplayDriver::draw_pixel`].
/// Lines, text and everything else are built on top of it once, by wrapping
/// the driver in a [`Canvas`](crate::display::canvas::Canvas).
pub trait DisplayDriver: Send {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32) {
        let caps = self.capabilities();
        (caps.width, caps.height)
    }

    /// Reset the controller and run its power-on command sequence
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Set display brightness (0-255)
    fn set_brightness(&mut self, value: u8) -> Result<(), DisplayError>;

    /// Transfer the whole framebuffer to the display controller
    fn flush(&mut self) -> Result<(), DisplayError>;

    /// Clear the framebuffer (no bus traffic until the next flush)
    fn clear(&mut self);

    /// Set or clear a single pixel; out-of-bounds coordinates are ignored
    fn draw_pixel(&mut self, x: i32, y: i32, color: BinaryColor);

    /// Set display inversion (if supported)
    ///
    /// When inverted, light pixels become dark and vice versa.
    fn set_invert(&mut self, _inverted: bool) -> Result<(), DisplayError> {
        Err(DisplayError::InvalidConfiguration(
            "inversion not supported by this display".to_string()
        ))
    }

    /// Blank the panel and put the controller to sleep
    fn shutdown(&mut self) -> Result<(), DisplayError> {
        self.clear();
        self.flush()
    }
}
