/*
 *  display/canvas.rs
 *
 *  MicScope - hear it, see it
 *  (c) 2020-26 Stuart Hunter
 *
 *  embedded-graphics adapter over the single pixel driver capability
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

use crate::display::traits::DisplayDriver;

/// Borrowing wrapper that lets any [`DisplayDriver`] act as an
/// embedded-graphics `DrawTarget`.
///
/// Every primitive, font and style ends up as `draw_pixel` calls, so a new
/// controller only has to know how to set a pixel and push its RAM.
pub struct Canvas<'a, D: DisplayDriver + ?Sized> {
    driver: &'a mut D,
}

impl<'a, D: DisplayDriver + ?Sized> Canvas<'a, D> {
    pub fn new(driver: &'a mut D) -> Self {
        Self { driver }
    }
}

impl<D: DisplayDriver + ?Sized> OriginDimensions for Canvas<'_, D> {
    fn size(&self) -> Size {
        let (w, h) = self.driver.dimensions();
        Size::new(w, h)
    }
}

impl<D: DisplayDriver + ?Sized> DrawTarget for Canvas<'_, D> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            self.driver.draw_pixel(p.x, p.y, color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        if color.is_off() {
            self.driver.clear();
            return Ok(());
        }
        let (w, h) = self.driver.dimensions();
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                self.driver.draw_pixel(x, y, color);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::drivers::mock::MockDriver;
    use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};

    #[test]
    fn test_canvas_reports_driver_size() {
        let mut driver = MockDriver::new_with_size(128, 64).unwrap();
        let canvas = Canvas::new(&mut driver);
        assert_eq!(canvas.size(), Size::new(128, 64));
    }

    #[test]
    fn test_line_through_canvas() {
        let mut driver = MockDriver::new_with_size(128, 64).unwrap();
        Line::new(Point::new(0, 0), Point::new(10, 10))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut Canvas::new(&mut driver))
            .unwrap();

        assert_eq!(driver.count_on_pixels(), 11);
        assert_eq!(driver.get_pixel(5, 5), Some(true));
    }

    #[test]
    fn test_works_through_trait_object() {
        let mut driver = MockDriver::new_with_size(128, 64).unwrap();
        {
            let dyn_driver: &mut dyn DisplayDriver = &mut driver;
            Rectangle::new(Point::new(-4, -4), Size::new(8, 8))
                .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
                .draw(&mut Canvas::new(dyn_driver))
                .unwrap();
        }
        // only the visible 4x4 quadrant lands
        assert_eq!(driver.count_on_pixels(), 16);
        assert_eq!(driver.get_pixel(3, 3), Some(true));
    }

    #[test]
    fn test_clear_on_fills_panel() {
        let mut driver = MockDriver::new_with_size(128, 64).unwrap();
        Canvas::new(&mut driver).clear(BinaryColor::On).unwrap();
        assert_eq!(driver.count_on_pixels(), 128 * 64);

        Canvas::new(&mut driver).clear(BinaryColor::Off).unwrap();
        assert_eq!(driver.count_on_pixels(), 0);
    }
}
