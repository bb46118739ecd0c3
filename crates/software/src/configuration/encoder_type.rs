use num_derive::{FromPrimitive, ToPrimitive};

/// Encoding mode of a rotary encoder. Encoders themselves are scanned elsewhere; the mode matters here only
/// because remote synchronization applies to [`EncoderType::ControlChange`] encoders.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, ToPrimitive, FromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncoderType {
    /// Relative: 0x7F for one direction, 0x01 for the other.
    #[default]
    Relative7Fh01h,
    /// Relative: 0x3F for one direction, 0x41 for the other.
    Relative3Fh41h,
    /// Program Change up/down.
    ProgramChange,
    /// Absolute Control Change value.
    ControlChange,
    /// Preset up/down.
    PresetChange,
    /// Absolute Pitch Bend value.
    PitchBend,
    /// Absolute 7-bit NRPN value.
    Nrpn7Bit,
    /// Absolute 14-bit NRPN value.
    Nrpn14Bit,
    /// Absolute 14-bit Control Change value.
    ControlChange14Bit,
}
