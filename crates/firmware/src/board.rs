//! Component counts and factory configuration of the Nucleo-F767ZI build.
//!
//! The six Arduino-header analog pins (A0-A5) are scanned as potentiometers and the three user LEDs are driven as
//! individual LEDs:
//! - LD1 (green) follows Note 60 on channel 1, with Control Change 60 selecting its blink speed;
//! - LD2 (blue) follows the Control Change sent by A0;
//! - LD3 (red) lights up while the second preset is active.

use midi_deck_lib::configuration::{
    AnalogSection, ConfigError, ControlType, Database as _, LedSection, LedSetting, RamDatabase,
    Section,
};

/// Number of analog inputs.
pub const ANALOG_INPUTS: usize = 6;

/// Number of physical LEDs.
pub const LEDS: usize = 3;

/// Number of encoders; none are fitted.
pub const ENCODERS: usize = 0;

/// Number of presets selectable with Program Change.
pub const PRESETS: usize = 4;

/// Controller number sent by A0 in the first preset; each further input and preset counts up from here.
const FIRST_CONTROLLER: i32 = 20;

const GREEN_LED: usize = 0;
const BLUE_LED: usize = 1;
const RED_LED: usize = 2;

const GREEN_LED_NOTE: i32 = 60;

/// Configuration store of this board.
pub type Database = RamDatabase<ANALOG_INPUTS, LEDS, ENCODERS, PRESETS>;

/// Writes the board's factory configuration into every preset and selects the first one.
pub fn apply_factory_defaults(database: &mut Database) -> Result<(), ConfigError> {
    for preset in 0..PRESETS {
        database.set_preset(preset as u8)?;

        let first_controller = FIRST_CONTROLLER + (preset * ANALOG_INPUTS) as i32;
        for index in 0..ANALOG_INPUTS {
            database.update(Section::Analog(AnalogSection::Enable), index, 1)?;
            database.update(
                Section::Analog(AnalogSection::MidiId),
                index,
                first_controller + index as i32,
            )?;
        }

        database.update(
            Section::Leds(LedSection::ActivationId),
            GREEN_LED,
            GREEN_LED_NOTE,
        )?;

        database.update(
            Section::Leds(LedSection::ControlType),
            BLUE_LED,
            ControlType::LocalCcForStateNoBlink as i32,
        )?;
        database.update(
            Section::Leds(LedSection::ActivationId),
            BLUE_LED,
            first_controller,
        )?;

        database.update(
            Section::Leds(LedSection::ControlType),
            RED_LED,
            ControlType::LocalPcForStateNoBlink as i32,
        )?;
        database.update(Section::Leds(LedSection::ActivationId), RED_LED, 1)?;

        database.update(
            Section::Leds(LedSection::Global),
            LedSetting::UseStartupAnimation as usize,
            1,
        )?;
    }

    database.set_preset(0)
}
