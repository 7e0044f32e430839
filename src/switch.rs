//! Rate switch decoding.
//!
//! The raw input is a 4-bit pattern, asserted = 1:
//!
//! ```text
//!   bit  3 2 1 0
//!        | | | `-- slow guide line (ST4)
//!        | | `---- fast guide line (ST4)
//!        `-`------ rotary switch position
//! ```
//!
//! The mapping is data: boards with different wiring supply their own
//! [`SwitchMap`].

use crate::rate::Rate;

/// Decoded switch state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwitchReading {
    /// Tracking rate chosen by the rotary switch.
    pub position: Rate,
    /// Guide override (fast/slow), if exactly one guide line is asserted.
    pub guide: Option<Rate>,
}

/// Raw pattern → rate mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwitchMap {
    /// Rate for each value of the 2-bit rotary field.
    pub positions: [Rate; 4],
    /// Bit offset of the rotary field.
    pub position_shift: u8,
    /// Bit requesting the slow guide rate.
    pub slow_mask: u8,
    /// Bit requesting the fast guide rate.
    pub fast_mask: u8,
}

impl SwitchMap {
    /// Decode a raw pattern.
    ///
    /// Both guide lines at once is not a valid ST4 command and is ignored.
    pub fn decode(&self, raw: u8) -> SwitchReading {
        let field = (raw >> self.position_shift) & 0b11;
        let position = self.positions.get(field as usize).copied().unwrap_or(Rate::Off);

        let slow = raw & self.slow_mask != 0;
        let fast = raw & self.fast_mask != 0;
        let guide = match (slow, fast) {
            (true, false) => Some(Rate::Slow),
            (false, true) => Some(Rate::Fast),
            _ => None,
        };

        SwitchReading { position, guide }
    }

    /// Raw pattern selecting `position` with no guide line asserted.
    ///
    /// Returns `None` if no rotary field value maps to `position`.
    pub fn encode_position(&self, position: Rate) -> Option<u8> {
        self.positions
            .iter()
            .position(|&rate| rate == position)
            .map(|field| (field as u8) << self.position_shift)
    }
}

impl Default for SwitchMap {
    fn default() -> Self {
        DEFAULT_SWITCH_MAP
    }
}

/// Four-position knob plus ST4 guide port.
///
/// Field values 1, 3, 2 are the knob's detents in order, so adjacent
/// detents differ in one contact.
pub const DEFAULT_SWITCH_MAP: SwitchMap = SwitchMap {
    positions: [Rate::Off, Rate::Sidereal, Rate::Lunar, Rate::Solar],
    position_shift: 2,
    slow_mask: 0b0001,
    fast_mask: 0b0010,
};
