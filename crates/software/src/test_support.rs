//! Scripted inputs and recording collaborators for unit tests.

use crate::{
    dispatch::RawMessage,
    hwa::{AnalogHwa, ButtonHandler, DisplayNotifier, EncoderSync, LedHwa, MidiDirection, MidiOut},
};
use std::vec::Vec;
use wmidi::MidiMessage;

/// ADC returning whatever the test last stored.
#[derive(Debug, Clone)]
pub struct MockAdc<const N: usize> {
    samples: [u16; N],
}

impl<const N: usize> Default for MockAdc<N> {
    fn default() -> Self {
        Self { samples: [0; N] }
    }
}

impl<const N: usize> MockAdc<N> {
    pub fn set(&mut self, index: usize, value: u16) {
        self.samples[index] = value;
    }

    pub fn set_all(&mut self, value: u16) {
        self.samples = [value; N];
    }
}

impl<const N: usize> AnalogHwa for MockAdc<N> {
    fn state(&self, index: usize) -> u16 {
        self.samples[index]
    }
}

/// MIDI sink keeping every message it receives.
#[derive(Debug, Default, Clone)]
pub struct RecordingMidi {
    sent: Vec<RawMessage>,
}

impl RecordingMidi {
    pub fn messages(&self) -> Vec<MidiMessage<'_>> {
        self.sent.iter().filter_map(RawMessage::message).collect()
    }

    pub fn len(&self) -> usize {
        self.sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }
}

impl MidiOut for RecordingMidi {
    fn send(&mut self, message: &MidiMessage<'_>) {
        if let Some(raw) = RawMessage::new(message) {
            self.sent.push(raw);
        }
    }
}

/// LED hardware keeping every physical write, with RGB LEDs laid out as three consecutive outputs.
#[derive(Debug, Default, Clone)]
pub struct RecordingLeds {
    pub writes: Vec<(usize, bool)>,
    pub fade_speed: Option<u8>,
}

impl RecordingLeds {
    /// Last state written to the physical LED at `index`.
    pub fn state(&self, index: usize) -> Option<bool> {
        self.writes
            .iter()
            .rev()
            .find(|(written, _)| *written == index)
            .map(|(_, on)| *on)
    }
}

impl LedHwa for RecordingLeds {
    fn set_state(&mut self, index: usize, on: bool) {
        self.writes.push((index, on));
    }

    fn set_fade_speed(&mut self, speed: u8) {
        self.fade_speed = Some(speed);
    }
}

#[derive(Debug, Default, Clone)]
pub struct RecordingButtons {
    pub events: Vec<(usize, bool)>,
}

impl ButtonHandler for RecordingButtons {
    fn button(&mut self, index: usize, pressed: bool) {
        self.events.push((index, pressed));
    }
}

#[derive(Debug, Default, Clone)]
pub struct RecordingEncoders {
    pub values: Vec<(usize, u16)>,
}

impl EncoderSync for RecordingEncoders {
    fn set_value(&mut self, index: usize, value: u16) {
        self.values.push((index, value));
    }
}

#[derive(Debug, Default, Clone)]
pub struct RecordingDisplay {
    pub events: Vec<(MidiDirection, Option<RawMessage>)>,
    pub presets: Vec<u8>,
}

impl DisplayNotifier for RecordingDisplay {
    fn midi_event(&mut self, direction: MidiDirection, message: &MidiMessage<'_>) {
        self.events.push((direction, RawMessage::new(message)));
    }

    fn preset_changed(&mut self, preset: u8) {
        self.presets.push(preset);
    }
}
