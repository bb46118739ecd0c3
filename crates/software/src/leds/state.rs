/// Logical state of one LED.
///
/// An LED is driven either constantly or by the blink clock. When an activation event arrives for one mode while
/// the other mode is already active, the newer mode takes over the output and the older one is remembered, so
/// that the matching deactivation event restores it instead of turning the LED off.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedState {
    constant_on: bool,
    blink_on: bool,
    remember: bool,
}

impl LedState {
    /// Returns `true` when the LED is lit constantly.
    pub fn constant_on(&self) -> bool {
        self.constant_on
    }

    /// Returns `true` when the LED follows the blink clock.
    pub fn blink_on(&self) -> bool {
        self.blink_on
    }

    /// Returns `true` when the inactive mode will be restored on the next deactivation event.
    pub fn remember(&self) -> bool {
        self.remember
    }

    /// Returns `true` when the LED is either lit constantly or blinking.
    pub fn active(&self) -> bool {
        self.constant_on || self.blink_on
    }

    /// Applies an activation event for the blinking (`blink == true`) or the constant mode.
    pub(crate) fn on(&mut self, blink: bool) {
        let (target, other) = self.modes(blink);
        if *other {
            *other = false;
            *target = true;
            self.remember = true;
        } else {
            *target = true;
        }
    }

    /// Applies a deactivation event for the blinking (`blink == true`) or the constant mode.
    pub(crate) fn off(&mut self, blink: bool) {
        let remember = self.remember;
        let (target, other) = self.modes(blink);
        if *target {
            *target = false;
            // hand the output back to the mode which was displaced
            *other = remember;
        }
        // in both branches the remembered mode is now either restored or cancelled
        self.remember = false;
    }

    /// Shows the LED in exactly one mode, dropping anything remembered.
    pub(crate) fn force(&mut self, blink: bool) {
        *self = Self {
            constant_on: !blink,
            blink_on: blink,
            remember: false,
        };
    }

    /// Turns the LED off regardless of its mode.
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    fn modes(&mut self, blink: bool) -> (&mut bool, &mut bool) {
        if blink {
            (&mut self.blink_on, &mut self.constant_on)
        } else {
            (&mut self.constant_on, &mut self.blink_on)
        }
    }
}
