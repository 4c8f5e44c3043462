/*
 *  audio/capture.rs
 *
 *  MicScope - hear it, see it
 *  (c) 2020-26 Stuart Hunter
 *
 *  Microphone capture sources: raw PCM stream and a synthetic test tone
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

use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::constants::RAW_SAMPLE_BYTES;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no audio within the capture timeout")]
    Timeout,
    #[error("capture stream closed")]
    Closed,
    #[error("capture I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CaptureError {
    /// Transport status code for diagnostics: the OS errno when there is one, -1 otherwise
    pub fn code(&self) -> i32 {
        match self {
            CaptureError::Io(e) => e.raw_os_error().unwrap_or(-1),
            _ => -1,
        }
    }
}

/// Blocking-with-timeout source of raw S32_LE microphone words.
pub trait CaptureSource: Send {
    /// Fill `buf` with whole raw samples, waiting at most `timeout` for data.
    ///
    /// Returns the number of bytes written, always a multiple of four.
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, CaptureError>;

    /// Short human readable name for logs
    fn describe(&self) -> String;
}

/// Reads a raw PCM byte stream from a FIFO or character device,
/// e.g. one fed by `arecord -f S32_LE -c 1 -t raw`.
///
/// The descriptor is non-blocking; `poll(2)` provides the timeout. Bytes of
/// a sample split across reads are carried over to the next call.
pub struct PcmStreamSource {
    file: File,
    path: PathBuf,
    pending: Vec<u8>,
}

impl PcmStreamSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CaptureError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&path)?;
        info!("Capturing raw PCM from {}", path.display());
        Ok(Self { file, path, pending: Vec::with_capacity(RAW_SAMPLE_BYTES) })
    }

    /// Wait until the descriptor is readable; false on timeout
    fn wait_readable(&self, timeout: Duration) -> Result<bool, CaptureError> {
        let mut pfd = libc::pollfd {
            fd: self.file.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        let ms = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;
        // Safety: one valid pollfd, count matches.
        let rc = unsafe { libc::poll(&mut pfd, 1, ms) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(false);
            }
            return Err(err.into());
        }
        Ok(rc > 0)
    }
}

impl CaptureSource for PcmStreamSource {
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, CaptureError> {
        let carried = self.pending.len();
        if buf.len() < carried + RAW_SAMPLE_BYTES {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("capture buffer of {} bytes cannot hold a sample", buf.len()),
            ).into());
        }

        if !self.wait_readable(timeout)? {
            return Err(CaptureError::Timeout);
        }

        buf[..carried].copy_from_slice(&self.pending);
        let n = match self.file.read(&mut buf[carried..]) {
            Ok(0) => return Err(CaptureError::Closed),
            Ok(n) => n,
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted) => {
                return Err(CaptureError::Timeout);
            }
            Err(e) => return Err(e.into()),
        };

        let total = carried + n;
        let whole = total - total % RAW_SAMPLE_BYTES;
        self.pending.clear();
        self.pending.extend_from_slice(&buf[whole..total]);
        if !self.pending.is_empty() {
            debug!("carrying {} bytes of a split sample", self.pending.len());
        }
        Ok(whole)
    }

    fn describe(&self) -> String {
        format!("pcm:{}", self.path.display())
    }
}

/// Test tone generator standing in for a microphone on the bench.
///
/// A sine whose level swells and fades over a few seconds, plus seeded
/// noise, delivered as 24-bit samples left justified in 32 bits exactly
/// like an I2S MEMS microphone. Reads are paced to the sample rate unless
/// pacing is turned off.
pub struct SyntheticSource {
    rng: StdRng,
    sample_rate: u32,
    frequency: f32,
    level: f32,
    noise: f32,
    phase: f32,
    swell_phase: f32,
    realtime: bool,
}

/// Seconds per swell cycle of the synthetic tone level
const SWELL_PERIOD_S: f32 = 4.0;
const FULL_SCALE_24: f32 = 8_388_607.0;

impl SyntheticSource {
    pub fn new(sample_rate: u32, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            sample_rate: sample_rate.max(1),
            frequency: 440.0,
            level: 0.5,
            noise: 0.02,
            phase: 0.0,
            swell_phase: 0.0,
            realtime: true,
        }
    }

    /// Tone frequency in Hz and peak level in 0.0..=1.0
    pub fn with_tone(mut self, frequency: f32, level: f32) -> Self {
        self.frequency = frequency;
        self.level = level.clamp(0.0, 1.0);
        self
    }

    /// Return immediately instead of sleeping for the block duration
    pub fn without_pacing(mut self) -> Self {
        self.realtime = false;
        self
    }

    fn next_sample(&mut self) -> i32 {
        let tau = std::f32::consts::TAU;
        let rate = self.sample_rate as f32;

        let swell = 0.5 - 0.5 * self.swell_phase.cos();
        let tone = self.level * swell * self.phase.sin();
        let noise = if self.noise > 0.0 {
            self.noise * self.rng.random_range(-1.0f32..1.0)
        } else {
            0.0
        };

        self.phase = (self.phase + tau * self.frequency / rate) % tau;
        self.swell_phase = (self.swell_phase + tau / (SWELL_PERIOD_S * rate)) % tau;

        let value = ((tone + noise).clamp(-1.0, 1.0) * FULL_SCALE_24) as i32;
        value << 8
    }
}

impl CaptureSource for SyntheticSource {
    fn read(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize, CaptureError> {
        let samples = buf.len() / RAW_SAMPLE_BYTES;
        for chunk in buf.chunks_exact_mut(RAW_SAMPLE_BYTES) {
            let raw = self.next_sample();
            chunk.copy_from_slice(&raw.to_le_bytes());
        }
        if self.realtime && samples > 0 {
            let block = Duration::from_secs_f64(samples as f64 / self.sample_rate as f64);
            std::thread::sleep(block);
        }
        Ok(samples * RAW_SAMPLE_BYTES)
    }

    fn describe(&self) -> String {
        format!("synthetic:{}Hz@{}", self.frequency, self.sample_rate)
    }
}
