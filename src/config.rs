/*
 *  config.rs
 *
 *  MicScope - hear it, see it
 *  (c) 2020-26 Stuart Hunter
 *
 *  YAML configuration layered with command line overrides
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

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use crate::constants::*;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub log_level: Option<String>,      // e.g., "info" | "debug"
    pub cycle_delay_ms: Option<u64>,    // pause between capture cycles
    pub splash_ms: Option<u64>,         // 0 skips the splash
    pub display: Option<DisplayConfig>,
    pub capture: Option<CaptureConfig>,
    pub playback: Option<PlaybackConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bus: Option<String>,        // e.g. "/dev/i2c-1"
    pub address: Option<u8>,        // 7-bit, 0x3C or 0x3D
    pub rst_pin: Option<u32>,       // sysfs GPIO number, absent when not wired
    pub contrast: Option<u8>,       // 0-255
    pub invert: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CaptureConfig {
    pub source: Option<String>,     // FIFO/device path or "synthetic"
    pub sample_rate_hz: Option<u32>,
    pub buffer_bytes: Option<usize>,
    pub timeout_ms: Option<u64>,
    pub padding_bits: Option<u32>,  // low bits dropped from each raw sample
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PlaybackConfig {
    pub path: Option<String>,
    pub volume: Option<f32>,        // 0.0-1.0
}

impl Config {
    pub fn cycle_delay(&self) -> Duration {
        Duration::from_millis(self.cycle_delay_ms.unwrap_or(DEFAULT_CYCLE_DELAY_MS))
    }

    pub fn splash(&self) -> Duration {
        Duration::from_millis(self.splash_ms.unwrap_or(DEFAULT_SPLASH_MS))
    }

    pub fn display_or_default(&self) -> DisplayConfig {
        self.display.clone().unwrap_or_default()
    }

    pub fn capture_or_default(&self) -> CaptureConfig {
        self.capture.clone().unwrap_or_default()
    }
}

impl DisplayConfig {
    pub fn bus(&self) -> &str {
        self.bus.as_deref().unwrap_or(DEFAULT_I2C_BUS)
    }

    pub fn address(&self) -> u8 {
        self.address.unwrap_or(crate::display::bus::DEFAULT_I2C_ADDRESS)
    }
}

impl CaptureConfig {
    pub fn source(&self) -> &str {
        self.source.as_deref().unwrap_or(DEFAULT_CAPTURE_SOURCE)
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz.unwrap_or(DEFAULT_SAMPLE_RATE_HZ)
    }

    pub fn buffer_bytes(&self) -> usize {
        self.buffer_bytes.unwrap_or(DEFAULT_CAPTURE_BUFFER_BYTES)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_CAPTURE_TIMEOUT_MS))
    }

    pub fn padding_bits(&self) -> u32 {
        self.padding_bits.unwrap_or(DEFAULT_PADDING_BITS)
    }
}

impl PlaybackConfig {
    pub fn volume(&self) -> f32 {
        self.volume.unwrap_or(DEFAULT_PLAYBACK_VOLUME)
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "micscope", version, about = "MicScope - microphone level and waveform monitor")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(short = 'c', long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Enable debug log level
    #[arg(short = 'v', long = "debug", alias = "verbose", action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub log_level: Option<String>,
    /// I2C bus device path for the OLED (e.g. /dev/i2c-1)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub i2c_bus: Option<String>,
    /// OLED I2C address, decimal or 0x-prefixed hex
    #[arg(long, value_parser = parse_address)]
    pub address: Option<u8>,
    /// GPIO wired to the OLED reset line
    #[arg(long)]
    pub rst_pin: Option<u32>,
    /// Raw S32_LE PCM stream to read, or "synthetic"
    #[arg(long)]
    pub source: Option<String>,
    #[arg(long)]
    pub timeout_ms: Option<u64>,
    #[arg(long)]
    pub cycle_delay_ms: Option<u64>,
    /// Raw S16_LE PCM stream to echo captured audio into
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub playback: Option<String>,
    #[arg(long)]
    pub volume: Option<f32>,
    /// Skip splash screen (shown by default)
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_splash: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

fn parse_address(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    parsed.map_err(|e| format!("invalid I2C address '{}': {}", s, e))
}

/// Public entry point: read YAML, merge CLI overrides, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Effective config as YAML, for --dump-config
pub fn dump(cfg: &Config) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(cfg)?)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    if let Some(home) = home_dir() {
        let p = home.join(".config/micscope/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/micscope.yaml");
        if p.exists() { return Some(p) }
    }
    for candidate in &["micscope.yaml", "config/micscope.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some()      { dst.log_level = src.log_level; }
    if src.cycle_delay_ms.is_some() { dst.cycle_delay_ms = src.cycle_delay_ms; }
    if src.splash_ms.is_some()      { dst.splash_ms = src.splash_ms; }
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
    match (&mut dst.capture, src.capture) {
        (None, Some(c)) => dst.capture = Some(c),
        (Some(d), Some(s)) => merge_capture(d, s),
        _ => {}
    }
    match (&mut dst.playback, src.playback) {
        (None, Some(c)) => dst.playback = Some(c),
        (Some(d), Some(s)) => {
            if s.path.is_some()   { d.path = s.path; }
            if s.volume.is_some() { d.volume = s.volume; }
        }
        _ => {}
    }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.width.is_some()    { dst.width = src.width; }
    if src.height.is_some()   { dst.height = src.height; }
    if src.bus.is_some()      { dst.bus = src.bus; }
    if src.address.is_some()  { dst.address = src.address; }
    if src.rst_pin.is_some()  { dst.rst_pin = src.rst_pin; }
    if src.contrast.is_some() { dst.contrast = src.contrast; }
    if src.invert.is_some()   { dst.invert = src.invert; }
}

fn merge_capture(dst: &mut CaptureConfig, src: CaptureConfig) {
    if src.source.is_some()         { dst.source = src.source; }
    if src.sample_rate_hz.is_some() { dst.sample_rate_hz = src.sample_rate_hz; }
    if src.buffer_bytes.is_some()   { dst.buffer_bytes = src.buffer_bytes; }
    if src.timeout_ms.is_some()     { dst.timeout_ms = src.timeout_ms; }
    if src.padding_bits.is_some()   { dst.padding_bits = src.padding_bits; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some()      { cfg.log_level = cli.log_level.clone(); }
    if cli.debug                    { cfg.log_level = Some("debug".to_string()); }
    if cli.cycle_delay_ms.is_some() { cfg.cycle_delay_ms = cli.cycle_delay_ms; }
    if cli.no_splash                { cfg.splash_ms = Some(0); }

    if cli.i2c_bus.is_some() || cli.address.is_some() || cli.rst_pin.is_some() {
        let display = cfg.display.get_or_insert_with(DisplayConfig::default);
        if cli.i2c_bus.is_some() { display.bus = cli.i2c_bus.clone(); }
        if cli.address.is_some() { display.address = cli.address; }
        if cli.rst_pin.is_some() { display.rst_pin = cli.rst_pin; }
    }

    if cli.source.is_some() || cli.timeout_ms.is_some() {
        let capture = cfg.capture.get_or_insert_with(CaptureConfig::default);
        if cli.source.is_some()     { capture.source = cli.source.clone(); }
        if cli.timeout_ms.is_some() { capture.timeout_ms = cli.timeout_ms; }
    }

    if cli.playback.is_some() || cli.volume.is_some() {
        let playback = cfg.playback.get_or_insert_with(PlaybackConfig::default);
        if cli.playback.is_some() { playback.path = cli.playback.clone(); }
        if cli.volume.is_some()   { playback.volume = cli.volume; }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(display) = cfg.display.as_ref() {
        let w = display.width.unwrap_or(DISPLAY_WIDTH);
        let h = display.height.unwrap_or(DISPLAY_HEIGHT);
        if w != DISPLAY_WIDTH || h != DISPLAY_HEIGHT {
            return Err(ConfigError::Validation(format!(
                "display must be {}x{}, got {}x{}", DISPLAY_WIDTH, DISPLAY_HEIGHT, w, h
            )));
        }
        if let Some(addr) = display.address {
            if addr > 0x7F {
                return Err(ConfigError::Validation("display address must be 7-bit".into()));
            }
        }
    }
    if let Some(capture) = cfg.capture.as_ref() {
        let bytes = capture.buffer_bytes();
        if bytes == 0 || bytes % RAW_SAMPLE_BYTES != 0 {
            return Err(ConfigError::Validation(format!(
                "capture buffer_bytes must be a non-zero multiple of {}", RAW_SAMPLE_BYTES
            )));
        }
        if capture.padding_bits() > 16 {
            return Err(ConfigError::Validation("capture padding_bits must be 0..=16".into()));
        }
        if capture.timeout_ms == Some(0) {
            return Err(ConfigError::Validation("capture timeout_ms must be > 0".into()));
        }
        if capture.sample_rate_hz == Some(0) {
            return Err(ConfigError::Validation("capture sample_rate_hz must be > 0".into()));
        }
    }
    if let Some(playback) = cfg.playback.as_ref() {
        if playback.path.is_none() {
            return Err(ConfigError::Validation("playback requires a path".into()));
        }
        let v = playback.volume();
        if !(0.0..=1.0).contains(&v) {
            return Err(ConfigError::Validation("playback volume must be 0.0..=1.0".into()));
        }
    }
    Ok(())
}
