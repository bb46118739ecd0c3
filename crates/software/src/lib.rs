//! This crate contains architecture-agnostic logic for the MIDI Deck, a configurable MIDI controller which reads
//! physical inputs (potentiometers, force-sensitive resistors, analog buttons), maps them to
//! [MIDI](https://midi.org/midi-1-0) messages according to a persisted configuration, and drives LEDs to reflect
//! the state of the controller and of the connected equipment.
//!
//! The crate is split along the data flow of the device:
//! - [`analog`] turns raw ADC samples into MIDI messages;
//! - [`dispatch`] routes incoming and locally generated MIDI to the rest of the system;
//! - [`leds`] keeps the per-LED state machine and the shared blink clock.
//!
//! Hardware is reached only through the traits in [`hwa`], and configuration only through the
//! [`Database`](configuration::Database) trait, so everything here runs (and is tested) on the host.

#![deny(missing_docs)]
#![no_std]

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

pub mod analog;
pub mod configuration;
pub mod dispatch;
pub mod hwa;
pub mod leds;

#[cfg(test)]
mod test_support;

/// Largest value carried by a 7-bit MIDI data byte.
pub const MIDI_7_BIT_VALUE_MAX: u16 = 127;

/// Largest value carried by a pair of 7-bit MIDI data bytes.
pub const MIDI_14_BIT_VALUE_MAX: u16 = 16383;

/// Maps `value` from `[in_min, in_max]` onto `[out_min, out_max]` with truncating integer math.
///
/// Values outside the input range are clamped first, and a zero-width input range maps everything to `out_min`.
pub(crate) fn map_range(value: u32, in_min: u32, in_max: u32, out_min: u32, out_max: u32) -> u32 {
    if in_max <= in_min {
        return out_min;
    }

    let value = value.clamp(in_min, in_max);

    if out_max >= out_min {
        (value - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
    } else {
        out_min - (value - in_min) * (out_min - out_max) / (in_max - in_min)
    }
}
