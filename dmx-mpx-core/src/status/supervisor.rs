//! Link activity supervisor
//!
//! Runs on the slow status period. Toggles the heartbeat lamp and clears
//! the activity lamp once the receiver has been idle for more than
//! [`IDLE_PERIODS_BEFORE_CLEAR`] consecutive periods.

/// Idle periods tolerated before the activity lamp goes dark
pub const IDLE_PERIODS_BEFORE_CLEAR: u8 = 2;

/// Desired lamp states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Lamps {
    pub heartbeat: bool,
    pub activity: bool,
}

#[derive(Debug, Clone, Default)]
pub struct LinkSupervisor {
    lamps: Lamps,
    idle_history: u8,
}

impl LinkSupervisor {
    pub const fn new() -> Self {
        Self {
            lamps: Lamps {
                heartbeat: false,
                activity: false,
            },
            idle_history: 0,
        }
    }

    /// Slots are being captured
    pub fn note_activity(&mut self) -> Lamps {
        self.lamps.activity = true;
        self.lamps
    }

    /// A line error was seen
    pub fn note_line_error(&mut self) -> Lamps {
        self.lamps.activity = false;
        self.lamps
    }

    /// Status period elapsed
    ///
    /// `rx_idle` is true if the receive line carried no bytes during the
    /// period.
    pub fn on_period(&mut self, rx_idle: bool) -> Lamps {
        self.lamps.heartbeat = !self.lamps.heartbeat;

        if !rx_idle {
            self.idle_history = 0;
        } else if self.idle_history > IDLE_PERIODS_BEFORE_CLEAR {
            self.lamps.activity = false;
            self.idle_history = 0;
        } else {
            self.idle_history += 1;
        }

        self.lamps
    }

    pub fn lamps(&self) -> Lamps {
        self.lamps
    }

    pub fn idle_history(&self) -> u8 {
        self.idle_history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heartbeat_toggles() {
        let mut sup = LinkSupervisor::new();
        assert!(sup.on_period(false).heartbeat);
        assert!(!sup.on_period(false).heartbeat);
        assert!(sup.on_period(true).heartbeat);
    }

    #[test]
    fn test_activity_cleared_after_sustained_idle() {
        let mut sup = LinkSupervisor::new();
        sup.note_activity();

        // Three idle periods are tolerated
        for _ in 0..=IDLE_PERIODS_BEFORE_CLEAR {
            assert!(sup.on_period(true).activity);
        }
        assert!(!sup.on_period(true).activity);
        assert_eq!(sup.idle_history(), 0);
    }

    #[test]
    fn test_traffic_resets_idle_history() {
        let mut sup = LinkSupervisor::new();
        sup.note_activity();
        sup.on_period(true);
        sup.on_period(true);
        sup.on_period(false);
        assert_eq!(sup.idle_history(), 0);
        sup.on_period(true);
        assert!(sup.lamps().activity);
    }

    #[test]
    fn test_line_error_clears_activity() {
        let mut sup = LinkSupervisor::new();
        sup.note_activity();
        assert!(!sup.note_line_error().activity);
    }
}
