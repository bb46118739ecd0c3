/// Resolution of the ADC feeding the analog inputs.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcType {
    /// 10-bit samples (0-1023).
    Adc10Bit,
    /// 12-bit samples (0-4095).
    #[default]
    Adc12Bit,
}

/// Thresholds and step sizes tuned to one ADC resolution.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcConfig {
    /// Largest raw sample.
    pub adc_max_value: u16,
    /// Smallest change of a 7-bit value considered a movement.
    pub midi_step_min_diff_7bit: u16,
    /// Smallest change of a 14-bit value considered a movement.
    pub midi_step_min_diff_14bit: u16,
    /// Multiplier applied to the 7-bit step when the direction of travel reverses.
    pub midi_step_mul_dir_change_7bit: u16,
    /// Multiplier applied to the 14-bit step when the direction of travel reverses.
    pub midi_step_mul_dir_change_14bit: u16,
    /// Raw sample below which a force-sensitive resistor reads as not pressed.
    pub fsr_min_value: u16,
    /// Raw sample producing full velocity.
    pub fsr_max_value: u16,
    /// Raw sample producing full aftertouch.
    pub aftertouch_max_value: u16,
    /// Raw sample above which an analog button reads as pressed.
    pub digital_value_threshold_on: u16,
    /// Raw sample below which an analog button reads as released.
    pub digital_value_threshold_off: u16,
}

impl AdcConfig {
    /// Configuration for 10-bit converters.
    pub const ADC_10_BIT: Self = Self {
        adc_max_value: 1023,
        midi_step_min_diff_7bit: 1,
        midi_step_min_diff_14bit: 32,
        midi_step_mul_dir_change_7bit: 1,
        midi_step_mul_dir_change_14bit: 2,
        fsr_min_value: 40,
        fsr_max_value: 340,
        aftertouch_max_value: 600,
        digital_value_threshold_on: 1000,
        digital_value_threshold_off: 600,
    };

    /// Configuration for 12-bit converters.
    pub const ADC_12_BIT: Self = Self {
        adc_max_value: 4095,
        midi_step_min_diff_7bit: 1,
        midi_step_min_diff_14bit: 8,
        midi_step_mul_dir_change_7bit: 1,
        midi_step_mul_dir_change_14bit: 4,
        fsr_min_value: 160,
        fsr_max_value: 1360,
        aftertouch_max_value: 2400,
        digital_value_threshold_on: 4000,
        digital_value_threshold_off: 2400,
    };

    /// Width of the raw range covered by one 7-bit MIDI value.
    pub fn adc_7bit_step(&self) -> u16 {
        (self.adc_max_value + 1) / 128
    }
}

impl From<AdcType> for AdcConfig {
    fn from(adc_type: AdcType) -> Self {
        match adc_type {
            AdcType::Adc10Bit => Self::ADC_10_BIT,
            AdcType::Adc12Bit => Self::ADC_12_BIT,
        }
    }
}
