use super::{
    AnalogSection, AnalogType, ConfigError, ControlType, Database, EncoderSection, EncoderType,
    LedSection, LedSetting, Section,
};
use num_traits::FromPrimitive;

/// One complete set of parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Preset<const A: usize, const L: usize, const E: usize> {
    analog: [[i32; A]; AnalogSection::COUNT],
    led_settings: [i32; LedSetting::COUNT],
    /// Per-LED sections, i.e., every [`LedSection`] but [`LedSection::Global`].
    leds: [[i32; L]; LedSection::COUNT],
    encoders: [[i32; E]; EncoderSection::COUNT],
}

impl<const A: usize, const L: usize, const E: usize> Preset<A, L, E> {
    fn factory() -> Self {
        let mut preset = Self {
            analog: [[0; A]; AnalogSection::COUNT],
            led_settings: [0; LedSetting::COUNT],
            leds: [[0; L]; LedSection::COUNT],
            encoders: [[0; E]; EncoderSection::COUNT],
        };

        for (section_index, values) in preset.analog.iter_mut().enumerate() {
            if let Some(section) = AnalogSection::from_usize(section_index) {
                fill_defaults(values, Section::Analog(section));
            }
        }
        for (section_index, values) in preset.leds.iter_mut().enumerate() {
            if let Some(section) = LedSection::from_usize(section_index + 1) {
                fill_defaults(values, Section::Leds(section));
            }
        }
        for (section_index, values) in preset.encoders.iter_mut().enumerate() {
            if let Some(section) = EncoderSection::from_usize(section_index) {
                fill_defaults(values, Section::Encoder(section));
            }
        }

        preset
    }

    fn slot(&self, section: Section, index: usize) -> Option<&i32> {
        match section {
            Section::Analog(section) => self.analog[section as usize].get(index),
            Section::Leds(LedSection::Global) => self.led_settings.get(index),
            Section::Leds(section) => self.leds[section as usize - 1].get(index),
            Section::Encoder(section) => self.encoders[section as usize].get(index),
        }
    }

    fn slot_mut(&mut self, section: Section, index: usize) -> Option<&mut i32> {
        match section {
            Section::Analog(section) => self.analog[section as usize].get_mut(index),
            Section::Leds(LedSection::Global) => self.led_settings.get_mut(index),
            Section::Leds(section) => self.leds[section as usize - 1].get_mut(index),
            Section::Encoder(section) => self.encoders[section as usize].get_mut(index),
        }
    }
}

fn fill_defaults(values: &mut [i32], section: Section) {
    for (index, value) in values.iter_mut().enumerate() {
        *value = section.default_value(index);
    }
}

/// A [`Database`] kept entirely in RAM.
///
/// Sized at compile time for `A` analog inputs, `L` LEDs, `E` encoders and `P` presets. On hardware, the board
/// layer is responsible for mirroring it to non-volatile storage.
#[derive(Clone, Debug, PartialEq)]
pub struct RamDatabase<const A: usize, const L: usize, const E: usize, const P: usize = 1> {
    presets: [Preset<A, L, E>; P],
    active: u8,
}

impl<const A: usize, const L: usize, const E: usize, const P: usize> Default
    for RamDatabase<A, L, E, P>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<const A: usize, const L: usize, const E: usize, const P: usize> RamDatabase<A, L, E, P> {
    /// Constructs a [`RamDatabase`] holding factory defaults in every preset.
    pub fn new() -> Self {
        Self {
            presets: [Preset::factory(); P],
            active: 0,
        }
    }

    /// Restores factory defaults in every preset and selects the first one.
    pub fn factory_reset(&mut self) {
        info!("Restoring factory defaults");
        *self = Self::new();
    }

    fn validate(section: Section, index: usize, value: i32) -> Result<(), ConfigError> {
        if value < 0 || value > section.parameter_type().max() {
            return Err(ConfigError::ValueOutOfRange);
        }

        let valid = match section {
            Section::Analog(AnalogSection::Type) => AnalogType::from_i32(value).is_some(),
            Section::Leds(LedSection::ControlType) => ControlType::from_i32(value).is_some(),
            Section::Leds(LedSection::Global) => match LedSetting::from_usize(index) {
                Some(setting) => value <= setting.max(),
                None => return Err(ConfigError::InvalidIndex),
            },
            Section::Encoder(EncoderSection::Mode) => EncoderType::from_i32(value).is_some(),
            _ => true,
        };

        if valid {
            Ok(())
        } else {
            Err(ConfigError::ValueOutOfRange)
        }
    }
}

impl<const A: usize, const L: usize, const E: usize, const P: usize> Database
    for RamDatabase<A, L, E, P>
{
    fn read(&self, section: Section, index: usize) -> i32 {
        self.presets
            .get(usize::from(self.active))
            .and_then(|preset| preset.slot(section, index))
            .copied()
            .unwrap_or_else(|| section.default_value(index))
    }

    fn update(&mut self, section: Section, index: usize, value: i32) -> Result<(), ConfigError> {
        if let Err(err) = Self::validate(section, index, value) {
            warn!(
                "Rejected configuration write: {}[{}] = {}: {}",
                section, index, value, err
            );
            return Err(err);
        }

        let preset = self
            .presets
            .get_mut(usize::from(self.active))
            .ok_or(ConfigError::InvalidPreset)?;
        let slot = preset
            .slot_mut(section, index)
            .ok_or(ConfigError::InvalidIndex)?;
        *slot = value;

        Ok(())
    }

    fn preset(&self) -> u8 {
        self.active
    }

    fn set_preset(&mut self, preset: u8) -> Result<(), ConfigError> {
        if usize::from(preset) >= P {
            return Err(ConfigError::InvalidPreset);
        }

        self.active = preset;
        Ok(())
    }
}
