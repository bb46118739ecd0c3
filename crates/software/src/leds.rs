//! The LED State Engine: per-LED state machine, MIDI-to-state routing and the shared blink clock.

use crate::{
    configuration::{ControlType, Database, LedRole, LedSection, LedSetting, Section},
    hwa::{LedHwa, RgbComponent},
};
use embassy_time::Instant;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

mod blink;
pub use blink::BLINK_TIMER_TICK;
use blink::BlinkClock;

mod state;
pub use state::*;

/// Largest transition speed accepted by [`Leds::set_fade_speed`].
pub const FADE_SPEED_MAX: u8 = 10;

/// Kinds of MIDI messages which affect LEDs.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageKind {
    /// Note On.
    NoteOn,
    /// Note Off.
    NoteOff,
    /// Control Change.
    ControlChange,
    /// Program Change.
    ProgramChange,
}

/// LED color. Bit 0 is the red component, bit 1 green and bit 2 blue; single-color LEDs are lit for anything but
/// [`Color::Off`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, ToPrimitive, FromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    /// Off.
    #[default]
    Off,
    /// Red.
    Red,
    /// Green.
    Green,
    /// Red and green.
    Yellow,
    /// Blue.
    Blue,
    /// Red and blue.
    Magenta,
    /// Green and blue.
    Cyan,
    /// All components.
    White,
}

impl Color {
    /// Decodes a color from a MIDI value: each block of 16 values selects the next color.
    pub fn from_value(value: u8) -> Self {
        Self::from_u8((value & 0x7F) / 16).unwrap_or_default()
    }

    /// Returns whether the given component is lit for this color.
    pub fn component(&self, component: RgbComponent) -> bool {
        let bit = match component {
            RgbComponent::R => 0,
            RgbComponent::G => 1,
            RgbComponent::B => 2,
        };
        ((*self as u8) >> bit) & 1 == 1
    }
}

/// Blink period buckets.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ToPrimitive, FromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlinkSpeed {
    /// Not blinking.
    #[default]
    NoBlink,
    /// Toggles every 100 ms.
    Ms100,
    /// Toggles every 200 ms.
    Ms200,
    /// Toggles every 300 ms.
    Ms300,
    /// Toggles every 400 ms.
    Ms400,
    /// Toggles every 500 ms.
    Ms500,
    /// Toggles every 600 ms.
    Ms600,
    /// Toggles every 700 ms.
    Ms700,
    /// Toggles every 800 ms.
    Ms800,
    /// Toggles every 900 ms.
    Ms900,
    /// Toggles every 1000 ms.
    Ms1000,
}

impl BlinkSpeed {
    /// Number of buckets, [`BlinkSpeed::NoBlink`] included.
    pub const COUNT: usize = 11;

    /// Decodes a blink speed from a MIDI value: each block of 12 values selects the next bucket.
    pub fn from_value(value: u8) -> Self {
        Self::from_u8((value / 12).min(Self::Ms1000 as u8)).unwrap_or_default()
    }

    /// Decodes a blink speed from a MIDI channel index; channels above the slowest bucket don't blink.
    pub fn from_channel(channel: u8) -> Self {
        Self::from_u8(channel).unwrap_or_default()
    }
}

/// Source of the blink clock.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, ToPrimitive, FromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlinkType {
    /// Internal millisecond timer.
    #[default]
    Timer,
    /// Incoming MIDI clock pulses.
    MidiClock,
}

#[derive(Debug, Default, Copy, Clone)]
struct Led {
    state: LedState,
    color: Color,
    speed: BlinkSpeed,
    /// Drives all three components of its RGB LED.
    rgb: bool,
    /// Green or blue component of an RGB LED; driven through the red one.
    component: bool,
    /// Last color pushed to the hardware.
    output: Color,
}

impl Led {
    fn computed_output(&self, clock: &BlinkClock) -> Color {
        if self.state.constant_on() || (self.state.blink_on() && clock.phase(self.speed)) {
            self.color
        } else {
            Color::Off
        }
    }
}

/// The LED State Engine for `N` logical LEDs.
pub struct Leds<H: LedHwa, const N: usize> {
    hwa: H,
    leds: [Led; N],
    clock: BlinkClock,
}

impl<H: LedHwa, const N: usize> Leds<H, N> {
    /// Constructs the engine with every LED off. Call [`Leds::init`] before use.
    pub fn new(hwa: H) -> Self {
        Self {
            hwa,
            leds: [Led {
                color: Color::White,
                ..Default::default()
            }; N],
            clock: BlinkClock::default(),
        }
    }

    /// Loads the configuration, turns every LED off and returns whether the startup animation should run.
    pub fn init<D: Database>(&mut self, database: &D) -> bool {
        self.reload(database);
        self.set_all_off();
        self.clock.reset();

        database.read_bool(
            Section::Leds(LedSection::Global),
            LedSetting::UseStartupAnimation as usize,
        )
    }

    /// Re-reads the blink type, fade speed and RGB assignments, e.g., after a preset change.
    pub fn reload<D: Database>(&mut self, database: &D) {
        let blink_type = if database.read_bool(
            Section::Leds(LedSection::Global),
            LedSetting::BlinkWithMidiClock as usize,
        ) {
            BlinkType::MidiClock
        } else {
            BlinkType::Timer
        };
        if blink_type != self.clock.kind() {
            self.set_blink_type(blink_type);
        }

        let fade_speed = database.read(
            Section::Leds(LedSection::Global),
            LedSetting::FadeSpeed as usize,
        );
        self.set_fade_speed(u8::try_from(fade_speed).unwrap_or(u8::MAX));

        for index in 0..N {
            let rgb_index = self.hwa.rgb_index(index);
            let rgb = database.read_bool(Section::Leds(LedSection::RgbEnable), rgb_index);
            let red = self.hwa.rgb_component_index(rgb_index, RgbComponent::R);
            let led = &mut self.leds[index];
            led.rgb = rgb;
            led.component = rgb && index != red;
        }
    }

    /// Applies an incoming (`local == false`) or locally generated MIDI event to every LED it activates.
    ///
    /// Events matching no LED are ignored.
    pub fn midi_to_state<D: Database>(
        &mut self,
        database: &D,
        kind: MessageKind,
        data1: u8,
        data2: u8,
        channel: u8,
        local: bool,
    ) {
        let data2 = if kind == MessageKind::NoteOff { 0 } else { data2 };

        for index in 0..N {
            if self.leds[index].component {
                continue;
            }

            let control = ControlType::from_config(
                database.read(Section::Leds(LedSection::ControlType), index),
            );
            if control.is_local() != local {
                continue;
            }
            let Some(role) = control.role(kind) else {
                continue;
            };

            let activation_id = database.read(Section::Leds(LedSection::ActivationId), index);
            let led_channel = database.read(Section::Leds(LedSection::MidiChannel), index);
            let id_match = activation_id == i32::from(data1);
            let channel_match = led_channel == i32::from(channel);

            let led = &mut self.leds[index];
            match role {
                LedRole::State if id_match && channel_match => {
                    let color = Color::from_value(data2);
                    if color == Color::Off {
                        led.state.off(false);
                    } else {
                        led.color = color;
                        led.state.on(false);
                    }
                }
                LedRole::Blink if id_match && channel_match => {
                    let speed = BlinkSpeed::from_value(data2);
                    if speed == BlinkSpeed::NoBlink {
                        led.state.off(true);
                    } else {
                        led.speed = speed;
                        led.state.on(true);
                    }
                }
                LedRole::StateAndBlink if id_match => {
                    let color = Color::from_value(data2);
                    let speed = BlinkSpeed::from_channel(channel);
                    if color == Color::Off {
                        led.state.clear();
                    } else {
                        led.color = color;
                        led.speed = speed;
                        led.state.force(speed != BlinkSpeed::NoBlink);
                    }
                }
                LedRole::Program if channel_match => {
                    if id_match {
                        led.state.force(false);
                    } else {
                        led.state.clear();
                    }
                }
                _ => continue,
            }

            trace!(
                "LED {} -> constant: {}, blink: {}, remember: {}",
                index,
                led.state.constant_on(),
                led.state.blink_on(),
                led.state.remember()
            );
        }

        self.update_blink_enable();
        self.push_changed();
    }

    /// Advances the blink clock and pushes LEDs whose output changed.
    ///
    /// `clock_tick` signals a MIDI clock pulse; it is ignored when blinking on the internal timer.
    pub fn check_blinking(&mut self, now: Instant, clock_tick: bool) {
        if self.clock.tick(now, clock_tick) {
            self.push_changed();
        }
    }

    /// Restarts every blink bucket lit, e.g., on MIDI Start.
    pub fn reset_blinking(&mut self) {
        self.clock.reset();
        self.push_changed();
    }

    /// Returns `true` while at least one LED is blinking.
    pub fn blinking_active(&self) -> bool {
        self.clock.active()
    }

    /// Turns every LED on constantly.
    pub fn set_all_on(&mut self) {
        for led in self.leds.iter_mut().filter(|led| !led.component) {
            led.color = Color::Red;
            led.state.force(false);
        }
        self.update_blink_enable();
        self.push_changed();
    }

    /// Turns every LED off.
    pub fn set_all_off(&mut self) {
        for led in self.leds.iter_mut() {
            led.state.clear();
        }
        self.update_blink_enable();
        self.refresh();
    }

    /// Lights the LED at `index` constantly in `color`, or turns its constant state off for [`Color::Off`].
    ///
    /// The green and blue components of an RGB LED are ignored.
    pub fn set_color(&mut self, index: usize, color: Color) {
        // components of an RGB LED are driven through its first LED
        let Some(led) = self.leds.get_mut(index).filter(|led| !led.component) else {
            return;
        };

        if color == Color::Off {
            led.state.off(false);
        } else {
            led.color = color;
            led.state.on(false);
        }
        self.update_blink_enable();
        self.push_changed();
    }

    /// Returns the color the LED at `index` shows when lit, or [`Color::Off`] when it is inactive.
    pub fn color(&self, index: usize) -> Color {
        match self.leds.get(index) {
            Some(led) if led.state.active() => led.color,
            _ => Color::Off,
        }
    }

    /// Makes the LED at `index` blink at `speed`, or stops its blinking for [`BlinkSpeed::NoBlink`].
    pub fn set_blink_state(&mut self, index: usize, speed: BlinkSpeed) {
        // components of an RGB LED are driven through its first LED
        let Some(led) = self.leds.get_mut(index).filter(|led| !led.component) else {
            return;
        };

        if speed == BlinkSpeed::NoBlink {
            led.state.off(true);
        } else {
            led.speed = speed;
            led.state.on(true);
        }
        self.update_blink_enable();
        self.push_changed();
    }

    /// Returns `true` when the LED at `index` is blinking.
    pub fn blink_state(&self, index: usize) -> bool {
        self.leds
            .get(index)
            .is_some_and(|led| led.state.blink_on())
    }

    /// Returns the logical state of the LED at `index`.
    pub fn state(&self, index: usize) -> Option<LedState> {
        self.leds.get(index).map(|led| led.state)
    }

    /// Selects the blink clock source and restarts the blink phases.
    pub fn set_blink_type(&mut self, blink_type: BlinkType) {
        info!("Blink type: {}", blink_type);
        self.clock.set_kind(blink_type);
        self.push_changed();
    }

    /// Returns the blink clock source.
    pub fn blink_type(&self) -> BlinkType {
        self.clock.kind()
    }

    /// Forwards the transition speed to the hardware. Returns `false`, changing nothing, when `speed` exceeds
    /// [`FADE_SPEED_MAX`].
    pub fn set_fade_speed(&mut self, speed: u8) -> bool {
        if speed > FADE_SPEED_MAX {
            warn!("Fade speed {} out of range", speed);
            return false;
        }

        self.hwa.set_fade_speed(speed);
        true
    }

    /// Pushes the output of every LED to the hardware, whether it changed or not.
    pub fn refresh(&mut self) {
        for index in 0..N {
            let led = &mut self.leds[index];
            led.output = led.computed_output(&self.clock);
            Self::write(&mut self.hwa, index, led);
        }
    }

    /// Returns a reference to the hardware layer.
    pub fn hwa(&self) -> &H {
        &self.hwa
    }

    fn update_blink_enable(&mut self) {
        let active = self.leds.iter().any(|led| led.state.blink_on());
        self.clock.set_active(active);
    }

    fn push_changed(&mut self) {
        for index in 0..N {
            let led = &mut self.leds[index];
            let output = led.computed_output(&self.clock);
            if output != led.output {
                led.output = output;
                Self::write(&mut self.hwa, index, led);
            }
        }
    }

    fn write(hwa: &mut H, index: usize, led: &Led) {
        if led.component {
            return;
        }

        if led.rgb {
            let rgb_index = hwa.rgb_index(index);
            for component in [RgbComponent::R, RgbComponent::G, RgbComponent::B] {
                let physical = hwa.rgb_component_index(rgb_index, component);
                hwa.set_state(physical, led.output.component(component));
            }
        } else {
            hwa.set_state(index, led.output != Color::Off);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{configuration::RamDatabase, test_support::RecordingLeds};

    type TestDatabase = RamDatabase<0, 6, 0>;

    fn configure(db: &mut TestDatabase, index: usize, control: ControlType, id: i32, channel: i32) {
        db.update(Section::Leds(LedSection::ControlType), index, control as i32)
            .unwrap();
        db.update(Section::Leds(LedSection::ActivationId), index, id).unwrap();
        db.update(Section::Leds(LedSection::MidiChannel), index, channel).unwrap();
    }

    fn engine(db: &TestDatabase) -> Leds<RecordingLeds, 6> {
        let mut leds = Leds::new(RecordingLeds::default());
        leds.init(db);
        leds
    }

    #[test]
    fn decodes_values() {
        assert_eq!(Color::Off, Color::from_value(15), "Expected left but got right");
        assert_eq!(Color::Red, Color::from_value(16), "Expected left but got right");
        assert_eq!(Color::White, Color::from_value(127), "Expected left but got right");
        assert_eq!(BlinkSpeed::NoBlink, BlinkSpeed::from_value(11), "Expected left but got right");
        assert_eq!(BlinkSpeed::Ms100, BlinkSpeed::from_value(12), "Expected left but got right");
        assert_eq!(BlinkSpeed::Ms1000, BlinkSpeed::from_value(127), "Expected left but got right");
        assert_eq!(BlinkSpeed::Ms300, BlinkSpeed::from_channel(3), "Expected left but got right");
        assert_eq!(BlinkSpeed::NoBlink, BlinkSpeed::from_channel(11), "Expected left but got right");
        assert!(Color::Yellow.component(RgbComponent::R));
        assert!(Color::Yellow.component(RgbComponent::G));
        assert!(!Color::Yellow.component(RgbComponent::B));
    }

    #[test]
    fn init_turns_everything_off_and_reports_the_animation() {
        let mut db = TestDatabase::new();
        let mut leds = Leds::<_, 6>::new(RecordingLeds::default());
        assert!(!leds.init(&db));
        assert!((0..6).all(|index| leds.hwa().state(index) == Some(false)));

        db.update(
            Section::Leds(LedSection::Global),
            LedSetting::UseStartupAnimation as usize,
            1,
        )
        .unwrap();
        assert!(leds.init(&db));
    }

    #[test]
    fn note_sets_state_and_cc_sets_blink() {
        let mut db = TestDatabase::new();
        configure(&mut db, 0, ControlType::MidiInNoteForStateCcForBlink, 10, 0);
        let mut leds = engine(&db);

        leds.midi_to_state(&db, MessageKind::NoteOn, 10, 127, 0, false);
        assert_eq!(Color::White, leds.color(0), "Expected left but got right");
        assert_eq!(Some(true), leds.hwa().state(0), "Expected left but got right");

        leds.midi_to_state(&db, MessageKind::ControlChange, 10, 24, 0, false);
        assert!(leds.blink_state(0));
        assert!(leds.blinking_active());

        leds.midi_to_state(&db, MessageKind::ControlChange, 10, 0, 0, false);
        assert!(!leds.blink_state(0));
        assert!(!leds.blinking_active());
        assert!(leds.state(0).is_some_and(|state| state.constant_on()));

        leds.midi_to_state(&db, MessageKind::NoteOff, 10, 127, 0, false);
        assert_eq!(Color::Off, leds.color(0), "Note Off should turn the LED off whatever its velocity");
        assert_eq!(Some(false), leds.hwa().state(0), "Expected left but got right");
    }

    #[test]
    fn events_for_other_ids_channels_or_sources_are_ignored() {
        let mut db = TestDatabase::new();
        configure(&mut db, 0, ControlType::MidiInNoteForStateCcForBlink, 10, 0);
        let mut leds = engine(&db);
        let writes = leds.hwa().writes.len();

        leds.midi_to_state(&db, MessageKind::NoteOn, 11, 127, 0, false);
        leds.midi_to_state(&db, MessageKind::NoteOn, 10, 127, 1, false);
        leds.midi_to_state(&db, MessageKind::NoteOn, 10, 127, 0, true);
        assert_eq!(Color::Off, leds.color(0), "Expected left but got right");
        assert_eq!(writes, leds.hwa().writes.len(), "Expected no physical writes");
    }

    #[test]
    fn local_control_types_follow_local_events_only() {
        let mut db = TestDatabase::new();
        configure(&mut db, 1, ControlType::LocalCcForStateNoBlink, 7, 2);
        let mut leds = engine(&db);

        leds.midi_to_state(&db, MessageKind::ControlChange, 7, 64, 2, false);
        assert_eq!(Color::Off, leds.color(1), "Expected left but got right");

        leds.midi_to_state(&db, MessageKind::ControlChange, 7, 64, 2, true);
        assert_eq!(Color::Blue, leds.color(1), "Expected left but got right");

        leds.midi_to_state(&db, MessageKind::ControlChange, 7, 24, 2, true);
        assert!(!leds.blink_state(1), "No-blink types should never blink");
    }

    #[test]
    fn remember_restores_constant_state() {
        let mut db = TestDatabase::new();
        configure(&mut db, 0, ControlType::MidiInNoteForStateCcForBlink, 3, 0);
        let mut leds = engine(&db);

        leds.midi_to_state(&db, MessageKind::NoteOn, 3, 127, 0, false);
        leds.midi_to_state(&db, MessageKind::ControlChange, 3, 60, 0, false);
        leds.midi_to_state(&db, MessageKind::ControlChange, 3, 0, 0, false);

        let state = leds.state(0).unwrap();
        assert!(state.constant_on(), "Expected the LED to be constantly on");
        assert!(!state.blink_on());
        assert_eq!(Some(true), leds.hwa().state(0), "Expected left but got right");
    }

    #[test]
    fn blink_enable_follows_the_last_blinking_led() {
        let mut db = TestDatabase::new();
        configure(&mut db, 0, ControlType::MidiInNoteForStateCcForBlink, 0, 0);
        configure(&mut db, 1, ControlType::MidiInNoteForStateCcForBlink, 1, 0);
        let mut leds = engine(&db);
        assert!(!leds.blinking_active());

        leds.midi_to_state(&db, MessageKind::ControlChange, 0, 12, 0, false);
        leds.midi_to_state(&db, MessageKind::ControlChange, 1, 12, 0, false);
        assert!(leds.blinking_active());

        leds.check_blinking(Instant::from_millis(0), false);
        leds.check_blinking(Instant::from_millis(100), false);
        assert_ne!(0, leds.clock.counter(BlinkSpeed::Ms200), "Expected the counters to advance");

        leds.midi_to_state(&db, MessageKind::ControlChange, 0, 0, 0, false);
        assert!(leds.blinking_active(), "One LED is still blinking");

        leds.midi_to_state(&db, MessageKind::ControlChange, 1, 0, 0, false);
        assert!(!leds.blinking_active());
        assert_eq!(0, leds.clock.counter(BlinkSpeed::Ms200), "Expected left but got right");
    }

    #[test]
    fn blinking_toggles_the_physical_output() {
        let mut db = TestDatabase::new();
        configure(&mut db, 0, ControlType::MidiInNoteForStateCcForBlink, 0, 0);
        let mut leds = engine(&db);

        // 24 / 12 selects the 200 ms bucket
        leds.midi_to_state(&db, MessageKind::ControlChange, 0, 24, 0, false);
        assert_eq!(Some(true), leds.hwa().state(0), "Blinking should start lit");

        leds.check_blinking(Instant::from_millis(1_000), false);
        leds.check_blinking(Instant::from_millis(1_100), false);
        assert_eq!(Some(true), leds.hwa().state(0), "Expected left but got right");
        leds.check_blinking(Instant::from_millis(1_200), false);
        assert_eq!(Some(false), leds.hwa().state(0), "Expected left but got right");
        leds.check_blinking(Instant::from_millis(1_300), false);
        assert_eq!(Some(false), leds.hwa().state(0), "Expected left but got right");
        leds.check_blinking(Instant::from_millis(1_400), false);
        assert_eq!(Some(true), leds.hwa().state(0), "Expected left but got right");
    }

    #[test]
    fn midi_clock_blinking_and_reset() {
        let mut db = TestDatabase::new();
        configure(&mut db, 0, ControlType::MidiInNoteForStateCcForBlink, 0, 0);
        db.update(
            Section::Leds(LedSection::Global),
            LedSetting::BlinkWithMidiClock as usize,
            1,
        )
        .unwrap();
        let mut leds = engine(&db);
        assert_eq!(BlinkType::MidiClock, leds.blink_type(), "Expected left but got right");

        leds.midi_to_state(&db, MessageKind::ControlChange, 0, 12, 0, false);
        let now = Instant::from_millis(0);
        leds.check_blinking(now, false);
        assert_eq!(Some(true), leds.hwa().state(0), "Timer should not drive MIDI clock blinking");

        leds.check_blinking(now, true);
        leds.check_blinking(now, true);
        assert_eq!(Some(false), leds.hwa().state(0), "Expected left but got right");

        leds.reset_blinking();
        assert_eq!(Some(true), leds.hwa().state(0), "Reset should light every phase");
    }

    #[test]
    fn state_and_blink_types_use_the_channel_as_speed() {
        let mut db = TestDatabase::new();
        // channel deliberately differs from the incoming ones
        configure(&mut db, 2, ControlType::MidiInNoteForStateAndBlink, 40, 15);
        let mut leds = engine(&db);

        leds.midi_to_state(&db, MessageKind::NoteOn, 40, 32, 4, false);
        assert_eq!(Color::Green, leds.color(2), "Expected left but got right");
        assert!(leds.blink_state(2));

        leds.midi_to_state(&db, MessageKind::NoteOn, 40, 16, 0, false);
        assert_eq!(Color::Red, leds.color(2), "Expected left but got right");
        assert!(!leds.blink_state(2), "Channel 0 should select no blinking");
        assert!(!leds.blinking_active());

        leds.midi_to_state(&db, MessageKind::NoteOff, 40, 0, 4, false);
        assert_eq!(Color::Off, leds.color(2), "Expected left but got right");
    }

    #[test]
    fn program_change_lights_the_matching_led_only() {
        let mut db = TestDatabase::new();
        configure(&mut db, 0, ControlType::MidiInPcForStateNoBlink, 0, 0);
        configure(&mut db, 1, ControlType::MidiInPcForStateNoBlink, 1, 0);
        configure(&mut db, 2, ControlType::MidiInPcForStateNoBlink, 1, 1);
        let mut leds = engine(&db);

        leds.midi_to_state(&db, MessageKind::ProgramChange, 0, 0, 0, false);
        assert_eq!(Some(true), leds.hwa().state(0), "Expected left but got right");
        assert_eq!(Some(false), leds.hwa().state(1), "Expected left but got right");

        leds.midi_to_state(&db, MessageKind::ProgramChange, 1, 0, 0, false);
        assert_eq!(Some(false), leds.hwa().state(0), "Expected left but got right");
        assert_eq!(Some(true), leds.hwa().state(1), "Expected left but got right");
        assert_eq!(Some(false), leds.hwa().state(2), "Other channels should be untouched");
    }

    #[test]
    fn rgb_leds_drive_all_components() {
        let mut db = TestDatabase::new();
        db.update(Section::Leds(LedSection::RgbEnable), 0, 1).unwrap();
        configure(&mut db, 0, ControlType::MidiInNoteForStateCcForBlink, 5, 0);
        // would match too, but is the green component of the same RGB LED
        configure(&mut db, 1, ControlType::MidiInNoteForStateCcForBlink, 5, 0);
        let mut leds = engine(&db);

        // 5 * 16 selects magenta
        leds.midi_to_state(&db, MessageKind::NoteOn, 5, 80, 0, false);
        assert_eq!(Color::Magenta, leds.color(0), "Expected left but got right");
        assert_eq!(Color::Off, leds.color(1), "Expected left but got right");
        assert_eq!(Some(true), leds.hwa().state(0), "Expected left but got right");
        assert_eq!(Some(false), leds.hwa().state(1), "Expected left but got right");
        assert_eq!(Some(true), leds.hwa().state(2), "Expected left but got right");
        assert_eq!(Some(false), leds.hwa().state(3), "Second RGB LED should be untouched");
    }

    #[test]
    fn setters_ignore_rgb_components() {
        let mut db = TestDatabase::new();
        db.update(Section::Leds(LedSection::RgbEnable), 0, 1).unwrap();
        let mut leds = engine(&db);

        leds.set_color(1, Color::Green);
        leds.set_blink_state(2, BlinkSpeed::Ms500);
        assert_eq!(Some(LedState::default()), leds.state(1), "Expected left but got right");
        assert_eq!(Some(LedState::default()), leds.state(2), "Expected left but got right");
        assert!(!leds.blinking_active(), "Expected the blink clock to stay idle");

        // the first LED still addresses the whole RGB LED
        leds.set_color(0, Color::Cyan);
        assert_eq!(Color::Cyan, leds.color(0), "Expected left but got right");
        assert_eq!(Some(false), leds.hwa().state(0), "Expected left but got right");
        assert_eq!(Some(true), leds.hwa().state(1), "Expected left but got right");
        assert_eq!(Some(true), leds.hwa().state(2), "Expected left but got right");
    }

    #[test]
    fn writes_only_on_change_unless_refreshed() {
        let mut db = TestDatabase::new();
        configure(&mut db, 0, ControlType::MidiInNoteForStateCcForBlink, 0, 0);
        let mut leds = engine(&db);

        leds.midi_to_state(&db, MessageKind::NoteOn, 0, 127, 0, false);
        let writes = leds.hwa().writes.len();
        leds.midi_to_state(&db, MessageKind::NoteOn, 0, 127, 0, false);
        assert_eq!(writes, leds.hwa().writes.len(), "Expected no duplicate writes");

        leds.refresh();
        assert_eq!(writes + 6, leds.hwa().writes.len(), "Expected left but got right");
    }

    #[test]
    fn manual_setters() {
        let db = TestDatabase::new();
        let mut leds = engine(&db);

        leds.set_color(3, Color::Cyan);
        assert_eq!(Color::Cyan, leds.color(3), "Expected left but got right");
        leds.set_blink_state(3, BlinkSpeed::Ms500);
        assert!(leds.blink_state(3));
        leds.set_blink_state(3, BlinkSpeed::NoBlink);
        assert_eq!(Color::Cyan, leds.color(3), "Constant state should be restored");

        leds.set_all_on();
        assert!((0..6).all(|index| leds.hwa().state(index) == Some(true)));
        leds.set_all_off();
        assert!((0..6).all(|index| leds.hwa().state(index) == Some(false)));

        // out of range indices are ignored
        leds.set_color(6, Color::Red);
        assert_eq!(Color::Off, leds.color(6), "Expected left but got right");
    }

    #[test]
    fn fade_speed_is_bounded() {
        let db = TestDatabase::new();
        let mut leds = engine(&db);
        assert!(leds.set_fade_speed(FADE_SPEED_MAX));
        assert_eq!(Some(FADE_SPEED_MAX), leds.hwa().fade_speed, "Expected left but got right");
        assert!(!leds.set_fade_speed(FADE_SPEED_MAX + 1));
        assert_eq!(Some(FADE_SPEED_MAX), leds.hwa().fade_speed, "Expected left but got right");
    }
}
