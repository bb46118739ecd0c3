use super::AdcConfig;

/// Exponential moving average with a factor of one half.
///
/// Samples within one 7-bit step of either rail snap to the rail so that the extremes stay reachable.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Ema {
    value: u16,
}

impl Ema {
    pub fn apply(&mut self, raw: u16, config: &AdcConfig) -> u16 {
        let step = config.adc_7bit_step();

        self.value = if raw <= step {
            0
        } else if raw >= config.adc_max_value.saturating_sub(step) {
            config.adc_max_value
        } else {
            (raw >> 1) + (self.value >> 1)
        };

        self.value
    }

    pub fn reset(&mut self) {
        self.value = 0;
    }
}
