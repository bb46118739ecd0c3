use super::{filter::Ema, fsr::Fsr, AdcConfig};
use crate::{map_range, MIDI_14_BIT_VALUE_MAX, MIDI_7_BIT_VALUE_MAX};

/// Direction of travel of a potentiometer.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Direction {
    /// Nothing emitted since the last reset.
    #[default]
    Initial,
    Decreasing,
    Increasing,
}

/// Output range of a continuous controller, as read from the configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Range {
    pub lower: u16,
    pub upper: u16,
    pub invert: bool,
    pub fourteen_bit: bool,
}

impl Range {
    fn resolution_max(&self) -> u16 {
        if self.fourteen_bit {
            MIDI_14_BIT_VALUE_MAX
        } else {
            MIDI_7_BIT_VALUE_MAX
        }
    }

    /// Scales `value`, given in the controller's resolution, into the configured limits.
    ///
    /// `lower > upper` flips the range, as does `invert`; setting both cancels out.
    fn scale(&self, value: u16) -> u16 {
        let max = self.resolution_max();
        let lower = self.lower.min(max);
        let upper = self.upper.min(max);

        let (from, to) = if self.invert { (upper, lower) } else { (lower, upper) };
        map_range(
            u32::from(value),
            0,
            u32::from(max),
            u32::from(from),
            u32::from(to),
        ) as u16
    }
}

/// Runtime state of one analog input.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Channel {
    pub filter: Ema,
    pub fsr: Fsr,
    pub button: bool,
    direction: Direction,
    last_value: u16,
    last_emitted: u16,
}

impl Channel {
    /// Returns the channel to its power-on state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Feeds one raw sample of a continuous controller and returns the scaled value to emit, if any.
    pub fn potentiometer(&mut self, raw: u16, range: Range, config: &AdcConfig) -> Option<u16> {
        let max = range.resolution_max();
        let value = map_range(
            u32::from(raw),
            0,
            u32::from(config.adc_max_value),
            0,
            u32::from(max),
        ) as u16;

        let (step, multiplier) = if range.fourteen_bit {
            (
                config.midi_step_min_diff_14bit,
                config.midi_step_mul_dir_change_14bit,
            )
        } else {
            (
                config.midi_step_min_diff_7bit,
                config.midi_step_mul_dir_change_7bit,
            )
        };

        let initial = self.direction == Direction::Initial;
        let direction = if value > self.last_value {
            Direction::Increasing
        } else if value < self.last_value {
            Direction::Decreasing
        } else if initial {
            // the very first sample may well equal the reset value
            Direction::Initial
        } else {
            return None;
        };

        let rail = value == 0 || value == max;
        if !initial && !rail {
            let min_diff = if direction == self.direction {
                step
            } else {
                step.saturating_mul(multiplier)
            };
            if self.last_value.abs_diff(value) < min_diff {
                return None;
            }
        }

        let scaled = range.scale(value);
        if !initial && scaled == self.last_emitted {
            return None;
        }

        self.last_value = value;
        self.last_emitted = scaled;
        self.direction = match direction {
            // an unchanged first sample leaves no direction to remember
            Direction::Initial => Direction::Increasing,
            direction => direction,
        };

        Some(scaled)
    }

    /// Applies hysteresis between the release and press thresholds and returns the new state if it changed.
    pub fn digital(&mut self, raw: u16, config: &AdcConfig) -> Option<bool> {
        let pressed = if raw > config.digital_value_threshold_on {
            true
        } else if raw < config.digital_value_threshold_off {
            false
        } else {
            self.button
        };

        if pressed == self.button {
            return None;
        }

        self.button = pressed;
        Some(pressed)
    }
}
