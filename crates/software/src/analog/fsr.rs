use super::AdcConfig;
use crate::{map_range, MIDI_7_BIT_VALUE_MAX};

/// Consecutive non-zero samples required before a press is accepted.
pub const FSR_PRESS_DEBOUNCE_SAMPLES: u8 = 3;

/// Consecutive zero samples required before a release is accepted.
pub const FSR_RELEASE_DEBOUNCE_SAMPLES: u8 = 3;

/// Largest velocity change between consecutive samples for the pressure to count as stable.
pub const FSR_STABILITY_TOLERANCE: u8 = 4;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Pressure {
    Velocity,
    Aftertouch,
}

/// Linear calibration of a raw sample to a 7-bit pressure, clamped to the sensor's usable range.
fn calibrate(raw: u16, pressure: Pressure, config: &AdcConfig) -> u8 {
    let max = match pressure {
        Pressure::Velocity => config.fsr_max_value,
        Pressure::Aftertouch => config.aftertouch_max_value,
    };

    map_range(
        u32::from(raw),
        u32::from(config.fsr_min_value),
        u32::from(max),
        0,
        u32::from(MIDI_7_BIT_VALUE_MAX),
    ) as u8
}

/// What a force-sensitive resistor sample resulted in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum FsrEvent {
    Pressed(u8),
    Aftertouch(u8),
    Released,
}

/// Press/release debouncing of one force-sensitive resistor.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Fsr {
    pressed: bool,
    debounce_started: bool,
    samples: u8,
    velocity: u8,
    aftertouch: u8,
}

impl Fsr {
    #[cfg(test)]
    pub fn pressed(&self) -> bool {
        self.pressed
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn update(&mut self, raw: u16, config: &AdcConfig) -> Option<FsrEvent> {
        let velocity = calibrate(raw, Pressure::Velocity, config);

        if self.pressed {
            if velocity == 0 {
                self.samples += 1;
                if self.samples >= FSR_RELEASE_DEBOUNCE_SAMPLES {
                    self.reset();
                    return Some(FsrEvent::Released);
                }
                return None;
            }

            self.samples = 0;
            let aftertouch = calibrate(raw, Pressure::Aftertouch, config);
            if aftertouch == self.aftertouch {
                return None;
            }
            self.aftertouch = aftertouch;
            return Some(FsrEvent::Aftertouch(aftertouch));
        }

        if velocity == 0 {
            self.debounce_started = false;
            self.samples = 0;
            return None;
        }

        if !self.debounce_started || self.velocity.abs_diff(velocity) > FSR_STABILITY_TOLERANCE {
            // (re)start the press debounce from this sample
            self.debounce_started = true;
            self.samples = 1;
            self.velocity = velocity;
            return None;
        }

        self.samples += 1;
        self.velocity = velocity;
        if self.samples < FSR_PRESS_DEBOUNCE_SAMPLES {
            return None;
        }

        self.pressed = true;
        self.debounce_started = false;
        self.samples = 0;
        self.aftertouch = 0;
        Some(FsrEvent::Pressed(velocity))
    }
}
