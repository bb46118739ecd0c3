//! This module contains both the user-configurable settings (implemented as enums) and the [`Database`] trait
//! through which the rest of the crate reads and writes them.
//!
//! The persisted store itself is owned by the board; [`RamDatabase`] is a fixed-size, RAM-backed implementation
//! which applies the same parameter widths and factory defaults and is what the firmware and the tests use.

mod analog_type;
pub use analog_type::*;

mod control_type;
pub use control_type::*;

mod encoder_type;
pub use encoder_type::*;

mod error;
pub use error::*;

mod ram_database;
pub use ram_database::*;

use num_derive::{FromPrimitive, ToPrimitive};

/// Parameters stored per analog input.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ToPrimitive, FromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnalogSection {
    /// Whether the input is scanned at all.
    Enable,
    /// Whether the output range is flipped.
    Invert,
    /// The [`AnalogType`] of the input.
    Type,
    /// Controller, note or NRPN parameter number.
    MidiId,
    /// Output value produced at the bottom of the travel.
    LowerLimit,
    /// Output value produced at the top of the travel.
    UpperLimit,
    /// MIDI channel index (0-15).
    MidiChannel,
}

impl AnalogSection {
    /// Number of sections.
    pub const COUNT: usize = 7;
}

/// Parameters stored per LED, plus the global LED settings.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ToPrimitive, FromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedSection {
    /// Global LED settings, indexed by [`LedSetting`].
    Global,
    /// Note, controller or program which activates the LED.
    ActivationId,
    /// Whether the RGB LED with the given RGB index is used as one (colored) LED.
    RgbEnable,
    /// The [`ControlType`] of the LED.
    ControlType,
    /// MIDI channel index (0-15) the LED listens on.
    MidiChannel,
}

impl LedSection {
    /// Number of per-LED sections (excluding [`LedSection::Global`]).
    pub const COUNT: usize = 4;
}

/// Parameters stored per encoder. Only the ones needed for remote synchronization are consumed by this crate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ToPrimitive, FromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncoderSection {
    /// Whether the encoder is scanned at all.
    Enable,
    /// Whether the direction is flipped.
    Invert,
    /// The [`EncoderType`] of the encoder.
    Mode,
    /// Controller or parameter number.
    MidiId,
    /// MIDI channel index (0-15).
    MidiChannel,
    /// Encoder pulses making up a single step.
    PulsesPerStep,
    /// Acceleration curve index.
    Acceleration,
    /// Whether incoming Control Change messages update the encoder's value.
    RemoteSync,
}

impl EncoderSection {
    /// Number of sections.
    pub const COUNT: usize = 8;
}

/// Addresses one section of the configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Section {
    /// Analog input configuration.
    Analog(AnalogSection),
    /// LED configuration.
    Leds(LedSection),
    /// Encoder configuration.
    Encoder(EncoderSection),
}

/// Storage width of a section, which bounds the values it accepts.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParameterType {
    /// 0 or 1.
    Bit,
    /// 0-15.
    HalfByte,
    /// 0-255.
    Byte,
    /// 0-16383, i.e., a 14-bit MIDI value.
    Word,
}

impl ParameterType {
    /// Largest value a parameter of this type can hold.
    pub fn max(&self) -> i32 {
        match self {
            Self::Bit => 1,
            Self::HalfByte => 15,
            Self::Byte => 255,
            Self::Word => crate::MIDI_14_BIT_VALUE_MAX as i32,
        }
    }
}

impl Section {
    /// Returns the storage width of the section.
    pub fn parameter_type(&self) -> ParameterType {
        match self {
            Self::Analog(section) => match section {
                AnalogSection::Enable | AnalogSection::Invert => ParameterType::Bit,
                AnalogSection::Type | AnalogSection::MidiChannel => ParameterType::HalfByte,
                AnalogSection::MidiId | AnalogSection::LowerLimit | AnalogSection::UpperLimit => {
                    ParameterType::Word
                }
            },
            Self::Leds(section) => match section {
                LedSection::Global | LedSection::ActivationId => ParameterType::Byte,
                LedSection::RgbEnable => ParameterType::Bit,
                LedSection::ControlType | LedSection::MidiChannel => ParameterType::HalfByte,
            },
            Self::Encoder(section) => match section {
                EncoderSection::Enable | EncoderSection::Invert | EncoderSection::RemoteSync => {
                    ParameterType::Bit
                }
                EncoderSection::Mode
                | EncoderSection::MidiChannel
                | EncoderSection::PulsesPerStep
                | EncoderSection::Acceleration => ParameterType::HalfByte,
                EncoderSection::MidiId => ParameterType::Word,
            },
        }
    }

    /// Returns the factory default of the parameter at `index`.
    pub fn default_value(&self, index: usize) -> i32 {
        match self {
            Self::Analog(AnalogSection::MidiId)
            | Self::Leds(LedSection::ActivationId)
            | Self::Encoder(EncoderSection::MidiId) => {
                // auto-incremented, wrapped so each default fits the 7-bit range used by most message types
                (index % 128) as i32
            }
            Self::Analog(AnalogSection::UpperLimit) => crate::MIDI_14_BIT_VALUE_MAX as i32,
            Self::Encoder(EncoderSection::PulsesPerStep) => 4,
            _ => 0,
        }
    }
}

/// Access to the persisted configuration.
///
/// Reads never fail: an index outside of the configured component count reads as the section's default.
/// Writes are validated here, at the boundary, so that the engines never observe out-of-range values.
pub trait Database {
    /// Returns the value of the parameter at `index` of `section` in the active preset.
    fn read(&self, section: Section, index: usize) -> i32;

    /// Writes the parameter at `index` of `section` in the active preset.
    fn update(&mut self, section: Section, index: usize, value: i32) -> Result<(), ConfigError>;

    /// Returns the active preset.
    fn preset(&self) -> u8;

    /// Selects the active preset.
    fn set_preset(&mut self, preset: u8) -> Result<(), ConfigError>;

    /// Convenience wrapper reading a bit-width parameter as a `bool`.
    fn read_bool(&self, section: Section, index: usize) -> bool {
        self.read(section, index) != 0
    }
}

/// Global LED settings, stored in [`LedSection::Global`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, ToPrimitive, FromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedSetting {
    /// Blink LEDs with incoming MIDI clock rather than the internal timer.
    BlinkWithMidiClock,
    /// Transition (fade) speed passed to the LED driver.
    FadeSpeed,
    /// Run the startup animation when the device boots.
    UseStartupAnimation,
}

impl LedSetting {
    /// Number of settings.
    pub const COUNT: usize = 3;

    /// Largest accepted value of the setting.
    pub fn max(&self) -> i32 {
        match self {
            Self::BlinkWithMidiClock | Self::UseStartupAnimation => 1,
            Self::FadeSpeed => crate::leds::FADE_SPEED_MAX as i32,
        }
    }
}
