/*
 *  monitor.rs
 *
 *  MicScope - hear it, see it
 *  (c) 2020-26 Stuart Hunter
 *
 *  The capture, process, render, flush cycle
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

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, trace, warn};

use crate::audio::capture::{CaptureError, CaptureSource};
use crate::audio::playback::PlaybackSink;
use crate::audio::processor::{summarize, AudioStatistics, SampleProcessor};
use crate::audio::waveform::{normalize, WaveformHistory};
use crate::config::Config;
use crate::constants::*;
use crate::display::error::DisplayError;
use crate::display::factory::BoxedDriver;
use crate::display::traits::DisplayDriver;
use crate::pacer::Pacer;
use crate::render::{self, ErrorScreen};

/// How a single cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Audio processed, statistics and waveform drawn
    Rendered(AudioStatistics),
    /// No audio inside the capture timeout
    Timeout,
    /// Transport fault, `code` is the OS error number or -1
    ReadFailed { code: i32 },
    /// Read succeeded but delivered no whole sample
    NoSamples,
}

/// Loop tuning, usually taken from [`Config`]
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSettings {
    pub buffer_bytes: usize,
    pub capture_timeout: Duration,
    pub padding_bits: u32,
    pub volume: f32,
    pub cycle_delay: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            buffer_bytes: DEFAULT_CAPTURE_BUFFER_BYTES,
            capture_timeout: Duration::from_millis(DEFAULT_CAPTURE_TIMEOUT_MS),
            padding_bits: DEFAULT_PADDING_BITS,
            volume: DEFAULT_PLAYBACK_VOLUME,
            cycle_delay: Duration::from_millis(DEFAULT_CYCLE_DELAY_MS),
        }
    }
}

impl From<&Config> for MonitorSettings {
    fn from(cfg: &Config) -> Self {
        let capture = cfg.capture_or_default();
        Self {
            buffer_bytes: capture.buffer_bytes(),
            capture_timeout: capture.timeout(),
            padding_bits: capture.padding_bits(),
            volume: cfg.playback.as_ref().map(|p| p.volume()).unwrap_or(DEFAULT_PLAYBACK_VOLUME),
            cycle_delay: cfg.cycle_delay(),
        }
    }
}

/// Owns the display, the capture source and the optional playback sink,
/// plus the only state carried between cycles: the waveform history and
/// the last good statistics.
pub struct Monitor {
    display: BoxedDriver,
    capture: Box<dyn CaptureSource>,
    playback: Option<Box<dyn PlaybackSink>>,
    processor: SampleProcessor,
    history: WaveformHistory,
    stats: AudioStatistics,
    raw: Vec<u8>,
    settings: MonitorSettings,
}

impl Monitor {
    pub fn new(display: BoxedDriver, capture: Box<dyn CaptureSource>, settings: MonitorSettings) -> Self {
        let (width, _) = display.dimensions();
        Self {
            display,
            capture,
            playback: None,
            processor: SampleProcessor::new(settings.padding_bits),
            history: WaveformHistory::new(width as usize),
            stats: AudioStatistics::default(),
            raw: vec![0; settings.buffer_bytes],
            settings,
        }
    }

    pub fn with_playback(mut self, sink: Box<dyn PlaybackSink>) -> Self {
        self.playback = Some(sink);
        self
    }

    pub fn history(&self) -> &WaveformHistory { &self.history }

    /// Statistics of the last successful cycle
    pub fn stats(&self) -> &AudioStatistics { &self.stats }

    pub fn display(&self) -> &dyn DisplayDriver { self.display.as_ref() }

    /// Show the splash screen and hold it
    pub fn splash(&mut self, hold: Duration) -> Result<(), DisplayError> {
        render::render_splash(self.display.as_mut())?;
        if !hold.is_zero() {
            std::thread::sleep(hold);
        }
        Ok(())
    }

    /// One capture, process, render, flush pass
    pub fn run_cycle(&mut self) -> CycleOutcome {
        let bytes = match self.capture.read(&mut self.raw, self.settings.capture_timeout) {
            Ok(bytes) => bytes,
            Err(CaptureError::Timeout) => {
                warn!("capture timed out after {:?}", self.settings.capture_timeout);
                self.show_error(ErrorScreen::Timeout);
                return CycleOutcome::Timeout;
            }
            Err(e) => {
                let code = e.code();
                error!("capture read failed (code {}): {}", code, e);
                self.show_error(ErrorScreen::ReadFailed);
                return CycleOutcome::ReadFailed { code };
            }
        };

        let processed = self.processor.process(&self.raw[..bytes.min(self.raw.len())]);
        if processed.is_empty() {
            warn!("capture returned {} bytes, no whole sample", bytes);
            self.show_error(ErrorScreen::ReadFailed);
            return CycleOutcome::NoSamples;
        }

        let stats = summarize(processed);
        debug!(
            "Samples: {} | Avg Amp: {} | Max Amp: {} | Data: {:?}",
            stats.sample_count,
            stats.average_abs,
            stats.peak_abs,
            &processed[..processed.len().min(5)]
        );

        if let Some(sink) = self.playback.as_mut() {
            sink.write(processed, self.settings.volume);
        }

        let (_, height) = self.display.dimensions();
        self.history.push(normalize(stats.average_abs, height));
        self.stats = stats;

        if let Err(e) = render::render_monitor(self.display.as_mut(), &self.stats, &self.history) {
            warn!("display update failed: {}", e);
        }
        CycleOutcome::Rendered(stats)
    }

    fn show_error(&mut self, screen: ErrorScreen) {
        if let Err(e) = render::render_error(self.display.as_mut(), screen) {
            warn!("display update failed: {}", e);
        }
    }

    /// Cycle until `stop` is raised, then blank the panel and turn it off.
    ///
    /// Returns the number of cycles run.
    pub fn run(&mut self, stop: Arc<AtomicBool>) -> Result<u64, DisplayError> {
        let mut pacer = Pacer::new(self.settings.cycle_delay);
        info!(
            "Monitoring {} every {:?}",
            self.capture.describe(),
            pacer.delay()
        );

        while !stop.load(Ordering::Relaxed) {
            pacer.start();
            let outcome = self.run_cycle();
            let took = pacer.finish();
            trace!("cycle {} {:?} in {:?}", pacer.cycles(), outcome, took);
            if stop.load(Ordering::Relaxed) {
                break;
            }
            pacer.pause();
        }

        info!(
            "Stopping after {} cycles (slowest {:?})",
            pacer.cycles(),
            pacer.slowest()
        );
        self.display.shutdown()?;
        Ok(pacer.cycles())
    }
}
