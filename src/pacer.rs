/*
 *  pacer.rs
 *
 *  MicScope - hear it, see it
 *  (c) 2020-26 Stuart Hunter
 *
 *  Fixed inter-cycle delay for the capture/render loop
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
use std::time::{Duration, Instant};

/// Paces the monitor loop: each cycle is followed by the same fixed pause,
/// whatever the capture/render work cost.
///
/// Capture already blocks for up to its timeout, so the loop period is
/// roughly `work + delay`; the pacer also tracks the slowest cycle seen so a
/// stuck bus shows up in the logs.
pub struct Pacer {
    delay: Duration,
    cycle_start: Instant,
    cycles: u64,
    slowest: Duration,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, cycle_start: Instant::now(), cycles: 0, slowest: Duration::ZERO }
    }

    #[inline]
    pub fn delay(&self) -> Duration { self.delay }

    /// Mark the start of a cycle
    #[inline]
    pub fn start(&mut self) {
        self.cycle_start = Instant::now();
    }

    /// Mark the end of the cycle's work, returns how long it took.
    pub fn finish(&mut self) -> Duration {
        let took = self.cycle_start.elapsed();
        self.cycles += 1;
        if took > self.slowest {
            self.slowest = took;
        }
        took
    }

    /// Sleep out the fixed inter-cycle delay
    pub fn pause(&self) {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }

    pub fn cycles(&self) -> u64 { self.cycles }

    pub fn slowest(&self) -> Duration { self.slowest }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_cycles_and_slowest() {
        let mut pacer = Pacer::new(Duration::ZERO);
        pacer.start();
        std::thread::sleep(Duration::from_millis(3));
        let first = pacer.finish();
        pacer.start();
        let second = pacer.finish();

        assert_eq!(pacer.cycles(), 2);
        assert!(first >= Duration::from_millis(3));
        assert!(pacer.slowest() >= first.max(second));
    }

    #[test]
    fn test_pause_sleeps_fixed_delay() {
        let pacer = Pacer::new(Duration::from_millis(5));
        let t = Instant::now();
        pacer.pause();
        assert!(t.elapsed() >= Duration::from_millis(5));
    }
}
