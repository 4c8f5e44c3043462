/*
 *  display/commands.rs
 *
 *  MicScope - hear it, see it
 *  (c) 2020-26 Stuart Hunter
 *
 *  CH1116 command set and power-on sequence
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

pub const DISPLAY_OFF: u8 = 0xAE;
pub const DISPLAY_ON: u8 = 0xAF;
pub const SET_CONTRAST: u8 = 0x81;
pub const NORMAL_DISPLAY: u8 = 0xA6;
pub const INVERSE_DISPLAY: u8 = 0xA7;

/// Page address, OR in the page number (0..7)
pub const SET_PAGE_ADDRESS: u8 = 0xB0;
/// Column address low nibble, OR in the nibble
pub const SET_COLUMN_LOW: u8 = 0x00;
/// Column address high nibble, OR in the nibble
pub const SET_COLUMN_HIGH: u8 = 0x10;

/// The CH1116 RAM is 132 columns wide, the 128 visible ones start at 2.
pub const COLUMN_OFFSET: u8 = 0x02;

/// Factory contrast used by the power-on sequence
pub const DEFAULT_CONTRAST: u8 = 0xCF;

/// One controller command: an opcode followed by its parameter bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub opcode: u8,
    pub params: &'static [u8],
}

impl Command {
    pub const fn new(opcode: u8, params: &'static [u8]) -> Self {
        Self { opcode, params }
    }

    /// Opcode followed by parameters, in wire order
    pub fn bytes(&self) -> impl Iterator<Item = u8> + '_ {
        core::iter::once(self.opcode).chain(self.params.iter().copied())
    }
}

/// Power-on sequence for a 128x64 CH1116 panel running from 3.3V.
///
/// Order matters to the controller; keep this byte-for-byte.
pub const INIT_SEQUENCE: &[Command] = &[
    Command::new(DISPLAY_OFF, &[]),
    Command::new(SET_COLUMN_LOW | COLUMN_OFFSET, &[]),
    Command::new(SET_COLUMN_HIGH, &[]),
    Command::new(0x40, &[]),                       // start line 0
    Command::new(SET_CONTRAST, &[DEFAULT_CONTRAST]),
    Command::new(0xA1, &[]),                       // segment remap, mirror x
    Command::new(NORMAL_DISPLAY, &[]),
    Command::new(0xA8, &[0x3F]),                   // multiplex ratio, 64 rows
    Command::new(0xC8, &[]),                       // COM scan, mirror y
    Command::new(0xD3, &[0x00]),                   // display offset
    Command::new(0xD5, &[0x80]),                   // clock divide ratio
    Command::new(0xD9, &[0xF1]),                   // pre-charge period
    Command::new(0xDA, &[0x12]),                   // COM pins, alternative
    Command::new(0xDB, &[0x40]),                   // VCOMH deselect level
    Command::new(0x8D, &[0x14]),                   // charge pump on
    Command::new(DISPLAY_ON, &[]),
];

/// Commands that park the column/page cursor at the start of `page`
pub fn page_start(page: u8) -> [u8; 3] {
    [
        SET_PAGE_ADDRESS | (page & 0x07),
        SET_COLUMN_LOW | (COLUMN_OFFSET & 0x0F),
        SET_COLUMN_HIGH | (COLUMN_OFFSET >> 4),
    ]
}
