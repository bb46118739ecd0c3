use crate::hwa::MidiOut;
use tinyvec::ArrayVec;
use wmidi::MidiMessage;

/// Default capacity of a [`MidiBuffer`], enough for one NRPN sequence per analog input of a full update.
pub const MIDI_BUFFER_DEFAULT_CAPACITY: usize = 64;

/// A short (at most three bytes) MIDI message in its encoded form.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawMessage {
    bytes: [u8; 3],
    len: u8,
}

impl RawMessage {
    /// Encodes `message`. System Exclusive messages don't fit and yield `None`.
    pub fn new(message: &MidiMessage<'_>) -> Option<Self> {
        let mut bytes = [0_u8; 3];
        let len = message.copy_to_slice(&mut bytes).ok()?;
        Some(Self {
            bytes,
            len: len as u8,
        })
    }

    /// Returns the encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }

    /// Decodes the message again.
    pub fn message(&self) -> Option<MidiMessage<'_>> {
        MidiMessage::from_bytes(self.bytes()).ok()
    }

    /// Wraps the message in a 32-bit USB-MIDI Event Packet for virtual cable `cable`.
    pub fn usb_packet(&self, cable: u8) -> [u8; 4] {
        let status = self.bytes[0];
        let code_index = match status {
            0x80..=0xEF => status >> 4,
            0xF1 | 0xF3 => 0x2,
            0xF2 => 0x3,
            0xF6 => 0x5,
            // single-byte real-time messages
            _ => 0xF,
        };

        [
            (cable & 0x0F) << 4 | code_index,
            self.bytes[0],
            self.bytes[1],
            self.bytes[2],
        ]
    }
}

/// Bounded queue of outgoing MIDI messages.
///
/// Messages are queued during an update and drained by the transport afterwards; when the queue is full, new
/// messages are dropped.
#[derive(Debug, Default, Clone)]
pub struct MidiBuffer<const N: usize = MIDI_BUFFER_DEFAULT_CAPACITY> {
    queue: ArrayVec<[RawMessage; N]>,
}

impl<const N: usize> MidiBuffer<N> {
    /// Constructs an empty buffer.
    pub fn new() -> Self {
        Self {
            queue: ArrayVec::new(),
        }
    }

    /// Returns the number of queued messages.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Removes and yields the queued messages in the order they were sent.
    pub fn drain(&mut self) -> impl Iterator<Item = RawMessage> + '_ {
        self.queue.drain(..)
    }
}

impl<const N: usize> MidiOut for MidiBuffer<N> {
    fn send(&mut self, message: &MidiMessage<'_>) {
        let Some(raw) = RawMessage::new(message) else {
            warn!("Message too long for the outgoing buffer");
            return;
        };

        if self.queue.try_push(raw).is_some() {
            warn!("Outgoing MIDI buffer full, dropping {}", raw.bytes());
        }
    }
}
