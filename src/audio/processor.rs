/*
 *  audio/processor.rs
 *
 *  MicScope - hear it, see it
 *  (c) 2020-26 Stuart Hunter
 *
 *  Raw 32-bit microphone words to 16-bit PCM, amplitude statistics
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

use crate::constants::RAW_SAMPLE_BYTES;

/// Per-cycle amplitude summary
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AudioStatistics {
    pub sample_count: usize,
    /// Mean of |sample|
    pub average_abs: u16,
    /// Largest |sample|, 32768 for i16::MIN
    pub peak_abs: u16,
    /// First sample of the block
    pub latest: i16,
}

/// Little-endian 32-bit words of `bytes`; a trailing partial word is ignored.
pub fn raw_words(bytes: &[u8]) -> impl Iterator<Item = i32> + '_ {
    bytes
        .chunks_exact(RAW_SAMPLE_BYTES)
        .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
}

pub fn decode_raw(bytes: &[u8]) -> Vec<i32> {
    raw_words(bytes).collect()
}

/// Drop `padding_bits` with an arithmetic shift, keep the low 16 bits.
///
/// This is plain truncation, no rounding and no saturation: a raw word whose
/// significant bits exceed 16 after the shift wraps.
#[inline]
pub fn convert_sample(raw: i32, padding_bits: u32) -> i16 {
    (raw >> padding_bits.min(31)) as i16
}

/// Element-wise [`convert_sample`] over any run of raw words
pub fn converted<I>(raw: I, padding_bits: u32) -> impl Iterator<Item = i16>
where
    I: IntoIterator<Item = i32>,
{
    raw.into_iter().map(move |r| convert_sample(r, padding_bits))
}

pub fn convert(raw: &[i32], padding_bits: u32) -> Vec<i16> {
    converted(raw.iter().copied(), padding_bits).collect()
}

/// Aggregate statistics over one block; an empty block gives all zeros.
pub fn summarize(processed: &[i16]) -> AudioStatistics {
    let Some(&latest) = processed.first() else {
        return AudioStatistics::default();
    };

    let mut sum: u64 = 0;
    let mut peak: u16 = 0;
    for s in processed {
        let a = s.unsigned_abs();
        sum += a as u64;
        peak = peak.max(a);
    }

    AudioStatistics {
        sample_count: processed.len(),
        // mean of values <= 32768 always fits
        average_abs: (sum / processed.len() as u64) as u16,
        peak_abs: peak,
        latest,
    }
}

/// Reusable conversion stage; keeps its buffers between cycles so the
/// steady-state loop does not allocate.
#[derive(Debug)]
pub struct SampleProcessor {
    padding_bits: u32,
    processed: Vec<i16>,
}

impl SampleProcessor {
    pub fn new(padding_bits: u32) -> Self {
        Self { padding_bits, processed: Vec::new() }
    }

    /// Convert the whole raw words in `bytes`, returning the processed block
    pub fn process(&mut self, bytes: &[u8]) -> &[i16] {
        self.processed.clear();
        self.processed.extend(converted(raw_words(bytes), self.padding_bits));
        &self.processed
    }

    pub fn processed(&self) -> &[i16] {
        &self.processed
    }
}
