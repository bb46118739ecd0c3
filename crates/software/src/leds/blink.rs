use super::{BlinkSpeed, BlinkType};
use embassy_time::{Duration, Instant};

/// Time between two advances of the blink counters in [`BlinkType::Timer`] mode.
pub const BLINK_TIMER_TICK: Duration = Duration::from_millis(100);

/// Number of counter advances after which each bucket toggles when blinking on the internal timer.
const TIMER_RESET: [u8; BlinkSpeed::COUNT] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10];

/// Number of MIDI clock pulses after which each bucket toggles when blinking with MIDI clock.
const MIDI_CLOCK_RESET: [u8; BlinkSpeed::COUNT] = [255, 2, 3, 4, 6, 9, 12, 18, 24, 36, 48];

/// Shared blink clock keeping every LED of the same [`BlinkSpeed`] in phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BlinkClock {
    kind: BlinkType,
    active: bool,
    last_update: Option<Instant>,
    counters: [u8; BlinkSpeed::COUNT],
    phases: [bool; BlinkSpeed::COUNT],
}

impl Default for BlinkClock {
    fn default() -> Self {
        Self {
            kind: BlinkType::Timer,
            active: false,
            last_update: None,
            counters: [0; BlinkSpeed::COUNT],
            phases: [true; BlinkSpeed::COUNT],
        }
    }
}

impl BlinkClock {
    pub fn kind(&self) -> BlinkType {
        self.kind
    }

    pub fn set_kind(&mut self, kind: BlinkType) {
        self.kind = kind;
        self.reset();
    }

    pub fn active(&self) -> bool {
        self.active
    }

    /// Current phase of `speed`. Buckets which do not blink are always lit.
    pub fn phase(&self, speed: BlinkSpeed) -> bool {
        speed == BlinkSpeed::NoBlink || self.phases[speed as usize]
    }

    #[cfg(test)]
    pub fn counter(&self, speed: BlinkSpeed) -> u8 {
        self.counters[speed as usize]
    }

    /// Zeroes the counters and lights every phase.
    pub fn reset(&mut self) {
        self.counters = [0; BlinkSpeed::COUNT];
        self.phases = [true; BlinkSpeed::COUNT];
        self.last_update = None;
    }

    /// Raises or lowers the global blink-active flag. Starting restarts every phase lit; stopping zeroes the
    /// counters.
    pub fn set_active(&mut self, active: bool) {
        if active == self.active {
            return;
        }

        self.active = active;
        if active {
            debug!("Blinking started");
            self.reset();
        } else {
            debug!("Blinking stopped");
            self.counters = [0; BlinkSpeed::COUNT];
        }
    }

    /// Advances the counters if a blink step is due and returns `true` if any phase toggled.
    ///
    /// A step is due every [`BLINK_TIMER_TICK`] in [`BlinkType::Timer`] mode, and on every `clock_tick` in
    /// [`BlinkType::MidiClock`] mode.
    pub fn tick(&mut self, now: Instant, clock_tick: bool) -> bool {
        if !self.active {
            return false;
        }

        let reset = match self.kind {
            BlinkType::Timer => {
                let Some(last_update) = self.last_update else {
                    self.last_update = Some(now);
                    return false;
                };
                if now.saturating_duration_since(last_update) < BLINK_TIMER_TICK {
                    return false;
                }
                self.last_update = Some(now);
                &TIMER_RESET
            }
            BlinkType::MidiClock => {
                if !clock_tick {
                    return false;
                }
                &MIDI_CLOCK_RESET
            }
        };

        let mut toggled = false;
        // bucket 0 never blinks
        for speed in 1..BlinkSpeed::COUNT {
            self.counters[speed] += 1;
            if self.counters[speed] >= reset[speed] {
                self.counters[speed] = 0;
                self.phases[speed] = !self.phases[speed];
                toggled = true;
            }
        }

        toggled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_clock(kind: BlinkType) -> BlinkClock {
        let mut clock = BlinkClock::default();
        clock.set_kind(kind);
        clock.set_active(true);
        clock
    }

    #[test]
    fn inactive_clock_never_advances() {
        let mut clock = BlinkClock::default();
        assert!(!clock.tick(Instant::from_millis(0), true));
        assert!(!clock.tick(Instant::from_millis(1_000), true));
        assert!(clock.phase(BlinkSpeed::Ms100), "Expected the phase to stay lit");
    }

    #[test]
    fn timer_cadence_per_bucket() {
        let mut clock = active_clock(BlinkType::Timer);
        // first call only anchors the timer
        assert!(!clock.tick(Instant::from_millis(0), false));

        let mut toggles_100 = 0;
        let mut toggles_300 = 0;
        let mut toggles_1000 = 0;
        let mut previous = (true, true, true);
        for step in 1..=30 {
            clock.tick(Instant::from_millis(step * 100), false);
            let current = (
                clock.phase(BlinkSpeed::Ms100),
                clock.phase(BlinkSpeed::Ms300),
                clock.phase(BlinkSpeed::Ms1000),
            );
            toggles_100 += usize::from(current.0 != previous.0);
            toggles_300 += usize::from(current.1 != previous.1);
            toggles_1000 += usize::from(current.2 != previous.2);
            previous = current;
        }

        assert_eq!(30, toggles_100, "Expected left but got right");
        assert_eq!(10, toggles_300, "Expected left but got right");
        assert_eq!(3, toggles_1000, "Expected left but got right");
    }

    #[test]
    fn timer_waits_for_a_full_tick() {
        let mut clock = active_clock(BlinkType::Timer);
        clock.tick(Instant::from_millis(1_000), false);
        assert!(!clock.tick(Instant::from_millis(1_099), false));
        assert!(clock.phase(BlinkSpeed::Ms100));
        assert!(clock.tick(Instant::from_millis(1_100), false));
        assert!(!clock.phase(BlinkSpeed::Ms100));
    }

    #[test]
    fn timer_ignores_clock_ticks() {
        let mut clock = active_clock(BlinkType::Timer);
        clock.tick(Instant::from_millis(0), true);
        assert!(!clock.tick(Instant::from_millis(50), true));
    }

    #[test]
    fn midi_clock_cadence() {
        let mut clock = active_clock(BlinkType::MidiClock);
        let now = Instant::from_millis(0);

        assert!(!clock.tick(now, false), "MIDI clock mode should only advance on clock pulses");

        // 24 pulses make one quarter note; the 800 ms bucket toggles every 24 pulses
        let mut toggles = 0;
        let mut previous = clock.phase(BlinkSpeed::Ms800);
        for _ in 0..48 {
            clock.tick(now, true);
            let current = clock.phase(BlinkSpeed::Ms800);
            toggles += usize::from(current != previous);
            previous = current;
        }
        assert_eq!(2, toggles, "Expected left but got right");

        let mut clock = active_clock(BlinkType::MidiClock);
        clock.tick(now, true);
        assert!(clock.phase(BlinkSpeed::Ms100));
        clock.tick(now, true);
        assert!(!clock.phase(BlinkSpeed::Ms100), "Fastest bucket should toggle every two pulses");
    }

    #[test]
    fn stopping_zeroes_the_counters() {
        let mut clock = active_clock(BlinkType::MidiClock);
        let now = Instant::from_millis(0);
        for _ in 0..5 {
            clock.tick(now, true);
        }
        assert_eq!(5, clock.counter(BlinkSpeed::Ms1000), "Expected left but got right");

        clock.set_active(false);
        assert!(!clock.active());
        for speed in 0..BlinkSpeed::COUNT {
            assert_eq!(0, clock.counters[speed], "Expected left but got right");
        }
    }

    #[test]
    fn reset_lights_every_phase() {
        let mut clock = active_clock(BlinkType::MidiClock);
        let now = Instant::from_millis(0);
        for _ in 0..7 {
            clock.tick(now, true);
        }
        clock.reset();
        assert!(clock.phases.iter().all(|phase| *phase));
        assert!(clock.counters.iter().all(|counter| *counter == 0));
    }
}
