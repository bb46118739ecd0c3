//! Board implementations of the hardware traits.

use defmt::*;
use embassy_stm32::gpio::Output;
use midi_deck_lib::hwa::{AnalogHwa, ButtonHandler, LedHwa};

/// Latest set of conversions, refreshed by the control task before every pipeline update.
pub struct AdcSnapshot<const N: usize> {
    samples: [u16; N],
}

impl<const N: usize> Default for AdcSnapshot<N> {
    fn default() -> Self {
        Self { samples: [0; N] }
    }
}

impl<const N: usize> AdcSnapshot<N> {
    /// Stores the conversion of the input at `index`.
    pub fn store(&mut self, index: usize, sample: u16) {
        if let Some(slot) = self.samples.get_mut(index) {
            *slot = sample;
        }
    }
}

impl<const N: usize> AnalogHwa for AdcSnapshot<N> {
    fn state(&self, index: usize) -> u16 {
        self.samples.get(index).copied().unwrap_or_default()
    }
}

/// LEDs wired straight to GPIO outputs, active high.
pub struct GpioLeds<const N: usize> {
    outputs: [Output<'static>; N],
}

impl<const N: usize> GpioLeds<N> {
    pub fn new(outputs: [Output<'static>; N]) -> Self {
        Self { outputs }
    }
}

impl<const N: usize> LedHwa for GpioLeds<N> {
    fn set_state(&mut self, index: usize, on: bool) {
        match self.outputs.get_mut(index) {
            Some(output) if on => output.set_high(),
            Some(output) => output.set_low(),
            None => warn!("No LED wired at index {}", index),
        }
    }
}

/// Nothing on this board consumes analog buttons yet; their transitions are only logged.
pub struct ButtonLog;

impl ButtonHandler for ButtonLog {
    fn button(&mut self, index: usize, pressed: bool) {
        info!("Analog button {} pressed: {}", index, pressed);
    }
}
