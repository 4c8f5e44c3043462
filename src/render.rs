/*
 *  render.rs
 *
 *  MicScope - hear it, see it
 *  (c) 2020-26 Stuart Hunter
 *
 *  Monitor screens: statistics and waveform, error states, splash
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

use arrayvec::ArrayString;
use core::fmt::Write;
use embedded_graphics::mono_font::{ascii::FONT_6X10, MonoFont};

use crate::audio::processor::AudioStatistics;
use crate::audio::waveform::WaveformHistory;
use crate::constants::*;
use crate::display::canvas::Canvas;
use crate::display::error::DisplayError;
use crate::display::traits::DisplayDriver;
use crate::draw::{draw_text, draw_vertical_span};
use crate::func_timer::FunctionTimer;

const FONT: &MonoFont<'static> = &FONT_6X10;

pub const TIMEOUT_TEXT: &str = "Error: Timeout!";
pub const READ_FAILED_TEXT: &str = "Error: Read Failed!";
pub const SPLASH_TITLE: &str = "MicScope";
pub const SPLASH_STATUS: &str = "System Ready!";

/// Which error screen to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScreen {
    Timeout,
    ReadFailed,
}

impl ErrorScreen {
    pub fn text(&self) -> &'static str {
        match self {
            ErrorScreen::Timeout => TIMEOUT_TEXT,
            ErrorScreen::ReadFailed => READ_FAILED_TEXT,
        }
    }
}

/// Stat lines as shown on screen, stack allocated
pub fn stat_lines(stats: &AudioStatistics) -> [ArrayString<24>; 3] {
    let mut avg = ArrayString::new();
    let mut max = ArrayString::new();
    let mut latest = ArrayString::new();
    let _ = write!(&mut avg, "Avg Amp: {}", stats.average_abs);
    let _ = write!(&mut max, "Max Amp: {}", stats.peak_abs);
    let _ = write!(&mut latest, "Sample: {}", stats.latest);
    [avg, max, latest]
}

/// Compose the live monitor screen and flush it, exactly one flush per call.
pub fn render_monitor<D>(
    driver: &mut D,
    stats: &AudioStatistics,
    history: &WaveformHistory,
) -> Result<(), DisplayError>
where
    D: DisplayDriver + ?Sized,
{
    let _timer = FunctionTimer::new("render::monitor");
    driver.clear();
    {
        let mut canvas = Canvas::new(driver);
        let [avg, max, latest] = stat_lines(stats);
        draw_text(&mut canvas, &avg, 0, AVG_TEXT_Y, FONT)?;
        draw_text(&mut canvas, &max, 0, MAX_TEXT_Y, FONT)?;
        draw_text(&mut canvas, &latest, 0, SAMPLE_TEXT_Y, FONT)?;

        // storage order, one slot per column
        for (x, &amp) in history.snapshot().iter().enumerate() {
            draw_vertical_span(&mut canvas, x as i32, WAVEFORM_CENTER_Y, amp as i32)?;
        }
    }
    driver.flush()
}

/// Single line error screen; statistics and waveform are left alone.
pub fn render_error<D>(driver: &mut D, screen: ErrorScreen) -> Result<(), DisplayError>
where
    D: DisplayDriver + ?Sized,
{
    driver.clear();
    draw_text(&mut Canvas::new(driver), screen.text(), 0, ERROR_TEXT_Y, FONT)?;
    driver.flush()
}

pub fn render_splash<D>(driver: &mut D) -> Result<(), DisplayError>
where
    D: DisplayDriver + ?Sized,
{
    driver.clear();
    {
        let mut canvas = Canvas::new(driver);
        draw_text(&mut canvas, SPLASH_TITLE, 0, SPLASH_TITLE_Y, FONT)?;
        draw_text(&mut canvas, SPLASH_STATUS, 0, SPLASH_STATUS_Y, FONT)?;
    }
    driver.flush()
}
