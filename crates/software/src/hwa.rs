//! Narrow interfaces through which the core reaches hardware and its collaborators.
//!
//! Each role is a trait of its own so the board layer can implement only what it has. Optional collaborators
//! (buttons, encoders, display) are implemented for `()`, which stands for "nothing registered".

use wmidi::MidiMessage;

/// Source of raw analog samples.
pub trait AnalogHwa {
    /// Returns the latest raw sample of the analog input at `index`.
    ///
    /// The value must reflect one coherent conversion; its resolution is fixed by the selected
    /// [`AdcType`](crate::analog::AdcType).
    fn state(&self, index: usize) -> u16;
}

/// One component of an RGB LED.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RgbComponent {
    /// Red.
    R,
    /// Green.
    G,
    /// Blue.
    B,
}

/// Physical LED outputs.
pub trait LedHwa {
    /// Drives the physical LED at `index`.
    fn set_state(&mut self, index: usize, on: bool);

    /// Returns the RGB LED index the physical LED at `led_index` belongs to.
    fn rgb_index(&self, led_index: usize) -> usize {
        led_index / 3
    }

    /// Returns the physical LED index of one component of the RGB LED at `rgb_index`.
    fn rgb_component_index(&self, rgb_index: usize, component: RgbComponent) -> usize {
        rgb_index * 3
            + match component {
                RgbComponent::R => 0,
                RgbComponent::G => 1,
                RgbComponent::B => 2,
            }
    }

    /// Sets the transition speed of LED drivers which support fading. No-op by default.
    fn set_fade_speed(&mut self, _speed: u8) {}
}

/// Sink for generated MIDI messages.
pub trait MidiOut {
    /// Queues or sends `message`.
    fn send(&mut self, message: &MidiMessage<'_>);
}

/// Receives the digital state of analog inputs configured as buttons.
pub trait ButtonHandler {
    /// Called when the analog input at `index` changes state.
    fn button(&mut self, index: usize, pressed: bool);
}

impl ButtonHandler for () {
    fn button(&mut self, _index: usize, _pressed: bool) {}
}

/// Receives values for encoders synchronized to incoming Control Change messages.
pub trait EncoderSync {
    /// Sets the current value of the encoder at `index`.
    fn set_value(&mut self, index: usize, value: u16);
}

impl EncoderSync for () {
    fn set_value(&mut self, _index: usize, _value: u16) {}
}

/// Whether a MIDI event was received by the device or generated by it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MidiDirection {
    /// Received from the host or a DIN port.
    In,
    /// Generated locally.
    Out,
}

/// Observer for MIDI traffic, e.g., a display showing the latest events.
pub trait DisplayNotifier {
    /// Called for every routed MIDI event.
    fn midi_event(&mut self, direction: MidiDirection, message: &MidiMessage<'_>);

    /// Called after the active preset changed.
    fn preset_changed(&mut self, _preset: u8) {}
}

impl DisplayNotifier for () {
    fn midi_event(&mut self, _direction: MidiDirection, _message: &MidiMessage<'_>) {}
}
