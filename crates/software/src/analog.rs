//! The Analog Pipeline: turns raw ADC samples into MIDI messages.
//!
//! Every enabled input is sampled once per [`Analog::update`], optionally smoothed, and then handled according
//! to its [`AnalogType`]:
//! - continuous controllers are mapped into the type's resolution, debounced with a direction-aware step
//!   threshold, scaled into the configured limits and emitted when the scaled value changes;
//! - force-sensitive resistors produce Note On/Off with velocity and polyphonic aftertouch while pressed;
//! - buttons are reported to a [`ButtonHandler`] with hysteresis between two thresholds.

use crate::{
    configuration::{AnalogSection, AnalogType, Database, Section},
    hwa::{AnalogHwa, ButtonHandler, MidiOut},
};
use wmidi::{Channel as MidiChannel, ControlFunction, MidiMessage, Note, U14, U7};

mod adc_config;
pub use adc_config::*;

mod channel;
use channel::{Channel, Range};

mod filter;

mod fsr;
pub use fsr::{FSR_PRESS_DEBOUNCE_SAMPLES, FSR_RELEASE_DEBOUNCE_SAMPLES, FSR_STABILITY_TOLERANCE};
use fsr::FsrEvent;

const NRPN_PARAMETER_MSB: u8 = 99;
const NRPN_PARAMETER_LSB: u8 = 98;
const DATA_ENTRY_MSB: u8 = 6;
const DATA_ENTRY_LSB: u8 = 38;

/// Offset between the MSB and LSB controllers of a 14-bit Control Change pair.
const CC_14_BIT_LSB_OFFSET: u16 = 32;

/// Analog Pipeline for `N` inputs.
pub struct Analog<H: AnalogHwa, const N: usize> {
    hwa: H,
    config: AdcConfig,
    filtering: bool,
    channels: [Channel; N],
}

impl<H: AnalogHwa, const N: usize> Analog<H, N> {
    /// Constructs the pipeline with filtering enabled and every input in its initial state.
    pub fn new(hwa: H, adc_type: AdcType) -> Self {
        Self {
            hwa,
            config: adc_type.into(),
            filtering: true,
            channels: [Channel::default(); N],
        }
    }

    /// Returns the thresholds and step sizes in use.
    pub fn config(&self) -> &AdcConfig {
        &self.config
    }

    /// Enables the exponential moving-average filter.
    pub fn enable_filtering(&mut self) {
        self.filtering = true;
    }

    /// Disables the exponential moving-average filter; samples are used as read.
    pub fn disable_filtering(&mut self) {
        self.filtering = false;
    }

    /// Returns a reference to the hardware layer.
    pub fn hwa(&self) -> &H {
        &self.hwa
    }

    /// Returns a mutable reference to the hardware layer, e.g., to store a fresh set of samples.
    pub fn hwa_mut(&mut self) -> &mut H {
        &mut self.hwa
    }

    /// Returns the input at `index` to its initial state, so that its next value is emitted unconditionally.
    ///
    /// Call this whenever the configuration of the input changes.
    pub fn debounce_reset(&mut self, index: usize) {
        if let Some(channel) = self.channels.get_mut(index) {
            channel.reset();
        }
    }

    /// Samples every enabled input once, in index order, and emits the resulting messages to `midi`.
    pub fn update<D: Database, M: MidiOut, B: ButtonHandler>(
        &mut self,
        database: &D,
        midi: &mut M,
        buttons: &mut B,
    ) {
        for index in 0..N {
            if !database.read_bool(Section::Analog(AnalogSection::Enable), index) {
                continue;
            }

            let raw = self.hwa.state(index).min(self.config.adc_max_value);
            let channel = &mut self.channels[index];
            let value = if self.filtering {
                channel.filter.apply(raw, &self.config)
            } else {
                raw
            };

            let analog_type =
                AnalogType::from_config(database.read(Section::Analog(AnalogSection::Type), index));
            let midi_id = database.read(Section::Analog(AnalogSection::MidiId), index) as u16;
            let midi_channel = midi_channel(database.read(Section::Analog(AnalogSection::MidiChannel), index));

            match analog_type {
                AnalogType::Button => {
                    if let Some(pressed) = channel.digital(value, &self.config) {
                        debug!("Analog button {}: {}", index, pressed);
                        buttons.button(index, pressed);
                    }
                }
                AnalogType::Fsr => {
                    let note = Note::from_u8_lossy(midi_id as u8);
                    match channel.fsr.update(value, &self.config) {
                        Some(FsrEvent::Pressed(velocity)) => {
                            debug!("FSR {} pressed, velocity {}", index, velocity);
                            midi.send(&MidiMessage::NoteOn(midi_channel, note, U7::from_u8_lossy(velocity)));
                        }
                        Some(FsrEvent::Aftertouch(pressure)) => {
                            midi.send(&MidiMessage::PolyphonicKeyPressure(
                                midi_channel,
                                note,
                                U7::from_u8_lossy(pressure),
                            ));
                        }
                        Some(FsrEvent::Released) => {
                            debug!("FSR {} released", index);
                            midi.send(&MidiMessage::NoteOff(midi_channel, note, U7::MIN));
                        }
                        None => {}
                    }
                }
                _ => {
                    let range = Range {
                        lower: database.read(Section::Analog(AnalogSection::LowerLimit), index) as u16,
                        upper: database.read(Section::Analog(AnalogSection::UpperLimit), index) as u16,
                        invert: database.read_bool(Section::Analog(AnalogSection::Invert), index),
                        fourteen_bit: analog_type.is_14_bit(),
                    };
                    if let Some(value) = channel.potentiometer(value, range, &self.config) {
                        debug!("Analog {}: {}", index, value);
                        send_value(midi, analog_type, midi_channel, midi_id, value);
                    }
                }
            }
        }
    }
}

fn midi_channel(value: i32) -> MidiChannel {
    MidiChannel::from_index((value & 0x0F) as u8).unwrap_or(MidiChannel::Ch1)
}

fn control_change<M: MidiOut>(midi: &mut M, channel: MidiChannel, control: u8, value: u8) {
    midi.send(&MidiMessage::ControlChange(
        channel,
        ControlFunction(U7::from_u8_lossy(control)),
        U7::from_u8_lossy(value),
    ));
}

/// Encodes one value of a continuous controller as the message sequence its type calls for.
fn send_value<M: MidiOut>(midi: &mut M, analog_type: AnalogType, channel: MidiChannel, id: u16, value: u16) {
    let lsb = (value & 0x7F) as u8;
    let msb = ((value >> 7) & 0x7F) as u8;

    match analog_type {
        AnalogType::PotentiometerNote => {
            let note = Note::from_u8_lossy(id as u8);
            if value == 0 {
                midi.send(&MidiMessage::NoteOff(channel, note, U7::MIN));
            } else {
                midi.send(&MidiMessage::NoteOn(channel, note, U7::from_u8_lossy(lsb)));
            }
        }
        AnalogType::Nrpn7Bit | AnalogType::Nrpn14Bit => {
            control_change(midi, channel, NRPN_PARAMETER_MSB, ((id >> 7) & 0x7F) as u8);
            control_change(midi, channel, NRPN_PARAMETER_LSB, (id & 0x7F) as u8);
            if analog_type == AnalogType::Nrpn14Bit {
                control_change(midi, channel, DATA_ENTRY_MSB, msb);
                control_change(midi, channel, DATA_ENTRY_LSB, lsb);
            } else {
                control_change(midi, channel, DATA_ENTRY_MSB, lsb);
            }
        }
        AnalogType::ControlChange14Bit => {
            let id = id & 0x7F;
            control_change(midi, channel, id as u8, msb);
            if id < 128 - CC_14_BIT_LSB_OFFSET {
                control_change(midi, channel, (id + CC_14_BIT_LSB_OFFSET) as u8, lsb);
            }
        }
        AnalogType::PitchBend => {
            // scaled values never exceed the 14-bit range
            let value = U14::try_from(value).unwrap_or(U14::MAX);
            midi.send(&MidiMessage::PitchBendChange(channel, value));
        }
        _ => control_change(midi, channel, (id & 0x7F) as u8, lsb),
    }
}
