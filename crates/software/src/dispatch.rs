//! Event Dispatch: routes incoming and locally generated MIDI to the LED State Engine, remote-synced encoders and
//! the display.

use crate::{
    configuration::{Database, EncoderSection, EncoderType, Section},
    hwa::{DisplayNotifier, EncoderSync, LedHwa, MidiDirection},
    leds::{Leds, MessageKind},
};
use bitmask_enum::bitmask;
use embassy_time::Instant;
use num_traits::FromPrimitive;
use wmidi::MidiMessage;

mod midi_buffer;
pub use midi_buffer::*;

/// Number of MIDI channels.
const MIDI_CHANNELS: usize = 16;

/// Operations that may be performed while dispatching.
#[bitmask(u8)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Operation {
    /// At least one LED was addressed.
    LedChange,
    /// The active preset changed.
    PresetChange,
    /// At least one encoder was synchronized to an incoming value.
    EncoderSync,
    /// The blink clock received a MIDI clock pulse or Start.
    BlinkClock,
}

/// Everything the dispatcher routes to.
pub struct Targets<'a, D, H, E, S, const L: usize>
where
    D: Database,
    H: LedHwa,
    E: EncoderSync,
    S: DisplayNotifier,
{
    /// Configuration store; Program Change may select a preset.
    pub database: &'a mut D,
    /// LED State Engine.
    pub leds: &'a mut Leds<H, L>,
    /// Encoders synchronized to incoming Control Change.
    pub encoders: &'a mut E,
    /// Observer of the routed events.
    pub display: &'a mut S,
}

/// Routes MIDI events for a controller with `E` encoders.
///
/// The last program received on each channel is cached so that Program Change LEDs can be re-asserted after a
/// preset change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatcher<const E: usize> {
    last_program: [Option<u8>; MIDI_CHANNELS],
}

impl<const E: usize> Default for Dispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const E: usize> Dispatcher<E> {
    /// Constructs a dispatcher with an empty program cache.
    pub fn new() -> Self {
        Self {
            last_program: [None; MIDI_CHANNELS],
        }
    }

    /// Returns the last program received on the channel with the given index (0-15).
    pub fn last_program(&self, channel: u8) -> Option<u8> {
        self.last_program.get(usize::from(channel)).copied().flatten()
    }

    /// Indicates the current program on every channel: the cached one, or program 0 while none was received.
    ///
    /// Call this once the LEDs are initialized, so that Program Change LEDs don't stay dark until the first
    /// Program Change arrives.
    pub fn init<D, H, S, N, const L: usize>(&mut self, targets: &mut Targets<'_, D, H, N, S, L>)
    where
        D: Database,
        H: LedHwa,
        N: EncoderSync,
        S: DisplayNotifier,
    {
        for (channel, program) in self.last_program.iter().enumerate() {
            targets.leds.midi_to_state(
                targets.database,
                MessageKind::ProgramChange,
                program.unwrap_or(0),
                0,
                channel as u8,
                false,
            );
        }
    }

    /// Updates the targets given a slice of data. Returns the [`Operation`]s performed.
    ///
    /// Data may contain one or more USB-MIDI Event Packets.
    pub fn process_packets<D, H, S, N, const L: usize>(
        &mut self,
        data: &[u8],
        now: Instant,
        targets: &mut Targets<'_, D, H, N, S, L>,
    ) -> Operation
    where
        D: Database,
        H: LedHwa,
        N: EncoderSync,
        S: DisplayNotifier,
    {
        let mut operation = Operation::none();
        data.chunks(4)
            .filter_map(|potential_packet| {
                if potential_packet.len() != 4 {
                    error!("USB-MIDI Event Packets must always be 32 bits long");
                    None
                } else {
                    // the Packet Header only carries the cable number and code index
                    MidiMessage::from_bytes(&potential_packet[1..]).ok()
                }
            })
            .for_each(|message| operation |= self.process(&message, now, targets));
        operation
    }

    /// Routes one incoming message. Returns the [`Operation`]s performed.
    pub fn process<D, H, S, N, const L: usize>(
        &mut self,
        message: &MidiMessage<'_>,
        now: Instant,
        targets: &mut Targets<'_, D, H, N, S, L>,
    ) -> Operation
    where
        D: Database,
        H: LedHwa,
        N: EncoderSync,
        S: DisplayNotifier,
    {
        match *message {
            MidiMessage::NoteOn(channel, note, velocity) => {
                trace!("Received NoteOn: channel {}, note {}", channel.number(), note as u8);
                targets.display.midi_event(MidiDirection::In, message);
                targets.leds.midi_to_state(
                    targets.database,
                    MessageKind::NoteOn,
                    note as u8,
                    u8::from(velocity),
                    channel.index(),
                    false,
                );
                Operation::LedChange
            }
            MidiMessage::NoteOff(channel, note, _) => {
                trace!("Received NoteOff: channel {}, note {}", channel.number(), note as u8);
                targets.display.midi_event(MidiDirection::In, message);
                targets.leds.midi_to_state(
                    targets.database,
                    MessageKind::NoteOff,
                    note as u8,
                    0,
                    channel.index(),
                    false,
                );
                Operation::LedChange
            }
            MidiMessage::ControlChange(channel, control, value) => {
                let control = u8::from(control.0);
                let value = u8::from(value);
                trace!("Received Control Change: channel {}, CC {}", channel.number(), control);
                targets.display.midi_event(MidiDirection::In, message);
                targets.leds.midi_to_state(
                    targets.database,
                    MessageKind::ControlChange,
                    control,
                    value,
                    channel.index(),
                    false,
                );

                let mut operation = Operation::LedChange;
                if sync_encoders::<D, N, E>(targets.database, targets.encoders, channel.index(), control, value) {
                    operation |= Operation::EncoderSync;
                }
                operation
            }
            MidiMessage::ProgramChange(channel, program) => {
                let program = u8::from(program);
                info!("Received Program Change: channel {}, program {}", channel.number(), program);
                self.last_program[usize::from(channel.index())] = Some(program);
                targets.display.midi_event(MidiDirection::In, message);
                targets.leds.midi_to_state(
                    targets.database,
                    MessageKind::ProgramChange,
                    program,
                    0,
                    channel.index(),
                    false,
                );

                let mut operation = Operation::LedChange;
                if program != targets.database.preset() && targets.database.set_preset(program).is_ok() {
                    self.preset_changed(program, targets);
                    operation |= Operation::PresetChange;
                }
                operation
            }
            MidiMessage::TimingClock => {
                targets.leds.check_blinking(now, true);
                Operation::BlinkClock
            }
            MidiMessage::Start => {
                debug!("Received Start");
                targets.leds.reset_blinking();
                targets.leds.check_blinking(now, true);
                Operation::BlinkClock
            }
            _ => {
                let mut data = [0_u8; 3];
                match message.copy_to_slice(&mut data) {
                    Ok(_) => info!("Received unsupported MIDI message: {}", data),
                    Err(_) => info!("Received unsupported MIDI message"),
                }
                Operation::none()
            }
        }
    }

    /// Re-applies the configuration after the active preset changed to `preset`.
    ///
    /// LED configuration is reloaded, local Program Change LEDs show the preset, and the cached program of every
    /// channel is re-asserted so that MIDI-driven Program Change LEDs match the new mapping.
    pub fn preset_changed<D, H, S, N, const L: usize>(
        &mut self,
        preset: u8,
        targets: &mut Targets<'_, D, H, N, S, L>,
    ) where
        D: Database,
        H: LedHwa,
        N: EncoderSync,
        S: DisplayNotifier,
    {
        info!("Preset changed to {}", preset);
        targets.leds.reload(targets.database);
        targets
            .leds
            .midi_to_state(targets.database, MessageKind::ProgramChange, preset, 0, 0, true);

        for (channel, program) in self.last_program.iter().enumerate() {
            if let Some(program) = program {
                targets.leds.midi_to_state(
                    targets.database,
                    MessageKind::ProgramChange,
                    *program,
                    0,
                    channel as u8,
                    false,
                );
            }
        }

        targets.display.preset_changed(preset);
    }

    /// Routes a message generated by the controller itself (e.g., by the Analog Pipeline) to LEDs using local
    /// control types and to the display. Returns the [`Operation`]s performed.
    pub fn local<D, H, S, N, const L: usize>(
        &mut self,
        message: &MidiMessage<'_>,
        targets: &mut Targets<'_, D, H, N, S, L>,
    ) -> Operation
    where
        D: Database,
        H: LedHwa,
        N: EncoderSync,
        S: DisplayNotifier,
    {
        let (kind, data1, data2, channel) = match *message {
            MidiMessage::NoteOn(channel, note, velocity) => {
                (MessageKind::NoteOn, note as u8, u8::from(velocity), channel)
            }
            MidiMessage::NoteOff(channel, note, _) => (MessageKind::NoteOff, note as u8, 0, channel),
            MidiMessage::ControlChange(channel, control, value) => (
                MessageKind::ControlChange,
                u8::from(control.0),
                u8::from(value),
                channel,
            ),
            MidiMessage::ProgramChange(channel, program) => {
                (MessageKind::ProgramChange, u8::from(program), 0, channel)
            }
            _ => {
                targets.display.midi_event(MidiDirection::Out, message);
                return Operation::none();
            }
        };

        targets.display.midi_event(MidiDirection::Out, message);
        targets
            .leds
            .midi_to_state(targets.database, kind, data1, data2, channel.index(), true);
        Operation::LedChange
    }
}

/// Hands `value` to every Control Change encoder with remote sync on the matching channel and controller.
fn sync_encoders<D: Database, N: EncoderSync, const E: usize>(
    database: &D,
    encoders: &mut N,
    channel: u8,
    control: u8,
    value: u8,
) -> bool {
    let mut synced = false;
    for index in 0..E {
        let read = |section| database.read(Section::Encoder(section), index);

        if read(EncoderSection::RemoteSync) == 0 {
            continue;
        }
        if EncoderType::from_i32(read(EncoderSection::Mode)) != Some(EncoderType::ControlChange) {
            continue;
        }
        if read(EncoderSection::MidiChannel) != i32::from(channel)
            || read(EncoderSection::MidiId) != i32::from(control)
        {
            continue;
        }

        debug!("Encoder {} synced to {}", index, value);
        encoders.set_value(index, u16::from(value));
        synced = true;
    }
    synced
}
