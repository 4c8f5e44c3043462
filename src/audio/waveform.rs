/*
 *  audio/waveform.rs
 *
 *  MicScope - hear it, see it
 *  (c) 2020-26 Stuart Hunter
 *
 *  Fixed size circular history of normalized amplitudes, one slot per column
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

/// Full scale of a processed sample, used to map amplitudes onto rows
pub const FULL_SCALE: u32 = 32767;

/// Circular buffer feeding the scrolling waveform.
///
/// Slots are preallocated and zeroed, `push` overwrites the slot under the
/// cursor and advances it modulo the capacity. The renderer reads the slots
/// in storage order, so the trace visibly wraps at the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveformHistory {
    slots: Vec<i16>,
    cursor: usize,
    filled: usize,
}

impl WaveformHistory {
    /// History with one slot per display column; a zero capacity is bumped to one.
    pub fn new(capacity: usize) -> Self {
        Self { slots: vec![0; capacity.max(1)], cursor: 0, filled: 0 }
    }

    #[inline]
    pub fn push(&mut self, value: i16) {
        self.slots[self.cursor] = value;
        self.cursor = (self.cursor + 1) % self.slots.len();
        self.filled = (self.filled + 1).min(self.slots.len());
    }

    pub fn capacity(&self) -> usize { self.slots.len() }

    /// Index of the slot the next push will overwrite
    pub fn cursor(&self) -> usize { self.cursor }

    /// Number of slots written so far, saturating at capacity
    pub fn len(&self) -> usize { self.filled }

    pub fn is_empty(&self) -> bool { self.filled == 0 }

    /// Slots in storage order
    pub fn snapshot(&self) -> &[i16] {
        &self.slots
    }

    /// Slots oldest first, starting at the cursor
    pub fn chronological(&self) -> impl Iterator<Item = i16> + '_ {
        let (newer, older) = self.slots.split_at(self.cursor);
        older.iter().chain(newer.iter()).copied()
    }

    pub fn clear(&mut self) {
        self.slots.fill(0);
        self.cursor = 0;
        self.filled = 0;
    }
}

/// Map an amplitude in `0..=32767` onto `0..=display_height/2` rows,
/// integer arithmetic with truncation.
///
/// A block average never exceeds 32768, which maps to `half` on its own;
/// the cap only matters for wider `u16` inputs.
pub fn normalize(amplitude: u16, display_height: u32) -> i16 {
    let half = display_height / 2;
    let rows = (amplitude as u32 * half / FULL_SCALE).min(half);
    rows as i16
}
