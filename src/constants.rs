//! This module contains global constants used across the display, audio and monitor modules.

/// The total width of the OLED display in pixels.
pub const DISPLAY_WIDTH: u32 = 128;
/// The total height of the OLED display in pixels.
pub const DISPLAY_HEIGHT: u32 = 64;

/// Default I2C bus device for the OLED.
pub const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";

/// Capture source that generates a test tone instead of reading a stream.
pub const SYNTHETIC_SOURCE: &str = "synthetic";
pub const DEFAULT_CAPTURE_SOURCE: &str = SYNTHETIC_SOURCE;

/// Bytes per raw microphone sample (signed 32-bit little endian slot).
pub const RAW_SAMPLE_BYTES: usize = 4;
/// Raw capture buffer, 256 samples.
pub const DEFAULT_CAPTURE_BUFFER_BYTES: usize = 1024;
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 44_100;
pub const DEFAULT_CAPTURE_TIMEOUT_MS: u64 = 100;
/// INMP441 delivers 24 significant bits left justified in 32, low 8 are padding.
pub const DEFAULT_PADDING_BITS: u32 = 8;

pub const DEFAULT_PLAYBACK_VOLUME: f32 = 0.5;

pub const DEFAULT_CYCLE_DELAY_MS: u64 = 100;
pub const DEFAULT_SPLASH_MS: u64 = 1000;

// Monitor screen layout (FONT_6X10, top baseline)
/// Row of the "Avg Amp" line.
pub const AVG_TEXT_Y: i32 = 0;
/// Row of the "Max Amp" line.
pub const MAX_TEXT_Y: i32 = 10;
/// Row of the "Sample" line.
pub const SAMPLE_TEXT_Y: i32 = 20;
/// Centre row of the waveform band.
pub const WAVEFORM_CENTER_Y: i32 = 40;

/// Rows used by the splash screen lines.
pub const SPLASH_TITLE_Y: i32 = 0;
pub const SPLASH_STATUS_Y: i32 = 10;
/// Row of the single line error screens.
pub const ERROR_TEXT_Y: i32 = 0;
