use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

/// Determines how an analog input is interpreted and which MIDI messages it produces.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, ToPrimitive, FromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnalogType {
    /// Potentiometer sending Control Change messages.
    #[default]
    PotentiometerControlChange,
    /// Potentiometer sending Note On messages, the value being the velocity.
    PotentiometerNote,
    /// Force-sensitive resistor sending Note On/Off with velocity, and aftertouch while pressed.
    Fsr,
    /// Input used as a digital button.
    Button,
    /// Potentiometer sending a 7-bit NRPN value.
    Nrpn7Bit,
    /// Potentiometer sending a 14-bit NRPN value.
    Nrpn14Bit,
    /// Potentiometer sending Pitch Bend.
    PitchBend,
    /// Potentiometer sending a 14-bit Control Change pair (MSB and LSB controllers).
    ControlChange14Bit,
}

impl AnalogType {
    /// Decodes a configuration value, falling back to the default for unknown values.
    pub fn from_config(value: i32) -> Self {
        Self::from_i32(value).unwrap_or_default()
    }

    /// Returns `true` for the types which produce 14-bit values.
    pub fn is_14_bit(&self) -> bool {
        matches!(
            self,
            Self::Nrpn14Bit | Self::PitchBend | Self::ControlChange14Bit
        )
    }
}
