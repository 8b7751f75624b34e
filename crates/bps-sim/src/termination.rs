//! Run-completion detection.

/// Fires once, the first time arrivals are exhausted and no case is active.
#[derive(Clone, Debug, Default)]
pub struct Termination {
    arrivals_exhausted: bool,
    active:             usize,
    fired:              bool,
}

impl Termination {
    pub fn case_started(&mut self) {
        self.active += 1;
    }

    pub fn case_finished(&mut self) {
        debug_assert!(self.active > 0, "case finished with no active cases");
        self.active = self.active.saturating_sub(1);
    }

    pub fn arrivals_exhausted(&mut self) {
        self.arrivals_exhausted = true;
    }

    /// `true` exactly once: on the first call where both conditions hold.
    pub fn check(&mut self) -> bool {
        if self.fired || !self.arrivals_exhausted || self.active > 0 {
            return false;
        }
        self.fired = true;
        true
    }

    pub fn is_exhausted(&self) -> bool {
        self.arrivals_exhausted
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}
