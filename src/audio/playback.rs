/*
 *  audio/playback.rs
 *
 *  MicScope - hear it, see it
 *  (c) 2020-26 Stuart Hunter
 *
 *  Optional echo of the processed samples to a speaker amplifier stream
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
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use log::{debug, info};

/// Fire-and-forget consumer of processed samples.
pub trait PlaybackSink: Send {
    fn write(&mut self, samples: &[i16], volume: f32);
}

/// Scale one sample by `volume`, saturating at the i16 range
#[inline]
pub fn scale(sample: i16, volume: f32) -> i16 {
    let v = (sample as f32 * volume.clamp(0.0, 1.0)).round();
    v.clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Writes S16_LE mono to any `Write`, e.g. a FIFO read by `aplay -f S16_LE`.
pub struct PcmWriterSink<W: Write + Send> {
    writer: W,
    scratch: Vec<u8>,
    dropped_blocks: u64,
}

impl<W: Write + Send> PcmWriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, scratch: Vec::new(), dropped_blocks: 0 }
    }

    /// Blocks that failed to write and were discarded
    pub fn dropped_blocks(&self) -> u64 { self.dropped_blocks }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl PcmWriterSink<File> {
    /// Open `path` for writing without blocking.
    ///
    /// A FIFO must already have a reader, otherwise this fails with ENXIO.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)?;
        info!("Playback to {}", path.display());
        Ok(Self::new(file))
    }
}

impl<W: Write + Send> PlaybackSink for PcmWriterSink<W> {
    fn write(&mut self, samples: &[i16], volume: f32) {
        self.scratch.clear();
        for &s in samples {
            self.scratch.extend_from_slice(&scale(s, volume).to_le_bytes());
        }
        if let Err(e) = self.writer.write_all(&self.scratch) {
            self.dropped_blocks += 1;
            debug!("playback write of {} samples dropped: {}", samples.len(), e);
        }
    }
}
