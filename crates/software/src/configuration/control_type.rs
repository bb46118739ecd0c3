use crate::leds::MessageKind;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

/// Determines which MIDI messages control an LED, and whether those messages arrive over MIDI or are generated
/// locally by the controller's own inputs.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, ToPrimitive, FromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlType {
    /// Incoming Note sets the state, incoming Control Change sets the blink speed.
    #[default]
    MidiInNoteForStateCcForBlink,
    /// Locally generated Note sets the state; no blinking.
    LocalNoteForStateNoBlink,
    /// Incoming Control Change sets the state, incoming Note sets the blink speed.
    MidiInCcForStateNoteForBlink,
    /// Locally generated Control Change sets the state; no blinking.
    LocalCcForStateNoBlink,
    /// Incoming Program Change lights the LED whose activation ID matches the program.
    MidiInPcForStateNoBlink,
    /// Locally generated Program Change (including preset changes) lights the LED whose activation ID matches.
    LocalPcForStateNoBlink,
    /// Incoming Note sets the state from its velocity and the blink speed from its channel.
    MidiInNoteForStateAndBlink,
    /// Locally generated Note sets the state from its velocity and the blink speed from its channel.
    LocalNoteForStateAndBlink,
    /// Incoming Control Change sets the state from its value and the blink speed from its channel.
    MidiInCcForStateAndBlink,
    /// Locally generated Control Change sets the state from its value and the blink speed from its channel.
    LocalCcForStateAndBlink,
}

/// What a matching message does to an LED.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedRole {
    /// Value selects the color; zero turns the constant state off.
    State,
    /// Value selects the blink speed; "no blink" turns blinking off.
    Blink,
    /// Value selects the color, channel selects the blink speed.
    StateAndBlink,
    /// LED is on when the program equals its activation ID and off otherwise.
    Program,
}

impl ControlType {
    /// Decodes a configuration value, falling back to the default for unknown values.
    pub fn from_config(value: i32) -> Self {
        Self::from_i32(value).unwrap_or_default()
    }

    /// Returns `true` for the types driven by locally generated messages.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::LocalNoteForStateNoBlink
                | Self::LocalCcForStateNoBlink
                | Self::LocalPcForStateNoBlink
                | Self::LocalNoteForStateAndBlink
                | Self::LocalCcForStateAndBlink
        )
    }

    /// Returns the role a message of the given kind plays for this type, if any.
    pub fn role(&self, kind: MessageKind) -> Option<LedRole> {
        let note = matches!(kind, MessageKind::NoteOn | MessageKind::NoteOff);
        let cc = kind == MessageKind::ControlChange;
        let pc = kind == MessageKind::ProgramChange;

        match self {
            Self::MidiInNoteForStateCcForBlink if note => Some(LedRole::State),
            Self::MidiInNoteForStateCcForBlink if cc => Some(LedRole::Blink),
            Self::MidiInCcForStateNoteForBlink if cc => Some(LedRole::State),
            Self::MidiInCcForStateNoteForBlink if note => Some(LedRole::Blink),
            Self::LocalNoteForStateNoBlink if note => Some(LedRole::State),
            Self::LocalCcForStateNoBlink if cc => Some(LedRole::State),
            Self::MidiInPcForStateNoBlink | Self::LocalPcForStateNoBlink if pc => {
                Some(LedRole::Program)
            }
            Self::MidiInNoteForStateAndBlink | Self::LocalNoteForStateAndBlink if note => {
                Some(LedRole::StateAndBlink)
            }
            Self::MidiInCcForStateAndBlink | Self::LocalCcForStateAndBlink if cc => {
                Some(LedRole::StateAndBlink)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locality() {
        assert!(!ControlType::MidiInNoteForStateCcForBlink.is_local());
        assert!(ControlType::LocalPcForStateNoBlink.is_local());
        assert!(ControlType::LocalCcForStateAndBlink.is_local());
        assert!(!ControlType::MidiInCcForStateAndBlink.is_local());
    }

    #[test]
    fn roles() {
        let control = ControlType::MidiInNoteForStateCcForBlink;
        assert_eq!(Some(LedRole::State), control.role(MessageKind::NoteOn), "Expected left but got right");
        assert_eq!(Some(LedRole::State), control.role(MessageKind::NoteOff), "Expected left but got right");
        assert_eq!(Some(LedRole::Blink), control.role(MessageKind::ControlChange), "Expected left but got right");
        assert_eq!(None, control.role(MessageKind::ProgramChange), "Expected left but got right");

        let control = ControlType::MidiInCcForStateNoteForBlink;
        assert_eq!(Some(LedRole::Blink), control.role(MessageKind::NoteOn), "Expected left but got right");
        assert_eq!(Some(LedRole::State), control.role(MessageKind::ControlChange), "Expected left but got right");

        assert_eq!(
            None,
            ControlType::LocalCcForStateNoBlink.role(MessageKind::NoteOn),
            "Expected left but got right"
        );
        assert_eq!(
            Some(LedRole::Program),
            ControlType::LocalPcForStateNoBlink.role(MessageKind::ProgramChange),
            "Expected left but got right"
        );
    }
}
