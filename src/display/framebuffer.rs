/*
 *  display/framebuffer.rs
 *
 *  MicScope - hear it, see it
 *  (c) 2020-26 Stuart Hunter
 *
 *  Page addressed 1bpp framebuffer for monochrome OLED controllers
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

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

use crate::display::error::DisplayError;

/// Rows per controller page.
pub const PAGE_HEIGHT: u32 = 8;

/// A 1-bit-per-pixel canvas laid out the way SSD1306-family controllers
/// (CH1116, SH1106, ...) address their display RAM.
///
/// The buffer holds `height / 8` pages of `width` bytes. Byte
/// `page * width + x` carries the eight vertical pixels of column `x`
/// inside that page, least significant bit on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFrameBuffer {
    buf: Vec<u8>,
    width: u32,
    height: u32,
}

impl PageFrameBuffer {
    /// Create a blank framebuffer
    ///
    /// `height` must be a whole number of pages.
    pub fn new(width: u32, height: u32) -> Result<Self, DisplayError> {
        if width == 0 || height == 0 || height % PAGE_HEIGHT != 0 {
            return Err(DisplayError::InvalidConfiguration(format!(
                "framebuffer must be non-empty with a height divisible by {}, got {}x{}",
                PAGE_HEIGHT, width, height
            )));
        }
        let len = width.checked_mul(height / PAGE_HEIGHT).ok_or_else(|| {
            DisplayError::InvalidConfiguration(format!(
                "framebuffer of {}x{} is too large", width, height
            ))
        })?;
        Ok(Self { buf: vec![0; len as usize], width, height })
    }

    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }

    /// Number of pages (horizontal bands of 8 rows)
    pub fn pages(&self) -> u32 { self.height / PAGE_HEIGHT }

    /// Zero every byte
    pub fn clear(&mut self) {
        self.buf.fill(0);
    }

    /// Map (x,y) to (byte index, bit mask); None if out of bounds
    #[inline]
    fn locate(&self, x: i32, y: i32) -> Option<(usize, u8)> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.width || y >= self.height {
            return None;
        }
        let page = y / PAGE_HEIGHT;
        let bit = y % PAGE_HEIGHT;
        Some(((page * self.width + x) as usize, 1u8 << bit))
    }

    /// Turn a pixel on or off. Coordinates outside the panel are ignored,
    /// clipping primitives routinely produce them.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        if let Some((index, mask)) = self.locate(x, y) {
            if on {
                self.buf[index] |= mask;
            } else {
                self.buf[index] &= !mask;
            }
        }
    }

    /// Pixel state, None when out of bounds
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<bool> {
        self.locate(x, y).map(|(index, mask)| self.buf[index] & mask != 0)
    }

    /// Raw display RAM image, page after page
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// The `width` bytes of one page
    pub fn page(&self, page: u32) -> Option<&[u8]> {
        if page >= self.pages() {
            return None;
        }
        let start = (page * self.width) as usize;
        self.buf.get(start..start + self.width as usize)
    }

    /// Count of lit pixels
    pub fn count_on(&self) -> usize {
        self.buf.iter().map(|b| b.count_ones() as usize).sum()
    }
}

impl OriginDimensions for PageFrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for PageFrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            self.set_pixel(p.x, p.y, c.is_on());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.buf.fill(if color.is_on() { 0xFF } else { 0x00 });
        Ok(())
    }
}
