/*
 *  display/mod.rs
 *
 *  MicScope - hear it, see it
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem: framebuffer, controller protocol and drivers
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

// Core trait definitions
pub mod traits;
pub mod error;
pub mod framebuffer;
pub mod factory;

// CH1116 protocol
pub mod bus;
pub mod commands;

// Display drivers
pub mod drivers;

// embedded-graphics adapter over DisplayDriver
pub mod canvas;

// Re-exports for convenience
pub use traits::{DisplayDriver, DisplayCapabilities};
pub use error::DisplayError;
pub use framebuffer::PageFrameBuffer;
pub use factory::{DisplayDriverFactory, BoxedDriver};
pub use bus::{I2cDisplayBus, DEFAULT_I2C_ADDRESS};
pub use canvas::Canvas;
pub use drivers::ch1116::Ch1116Driver;
