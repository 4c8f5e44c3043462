/*
 *  audio/mod.rs
 *
 *  MicScope - hear it, see it
 *  (c) 2020-26 Stuart Hunter
 *
 *  Microphone capture, sample conversion, waveform history and playback
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

pub mod capture;
pub mod processor;
pub mod waveform;
pub mod playback;

pub use capture::{CaptureError, CaptureSource, PcmStreamSource, SyntheticSource};
pub use processor::{AudioStatistics, SampleProcessor};
pub use waveform::WaveformHistory;
pub use playback::{PcmWriterSink, PlaybackSink};
