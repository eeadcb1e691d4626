//! Tick-counted cooldowns that turn a held key into a fixed-cadence action.

use crate::config::PlacementSettings;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebounceTimer {
    elapsed: u32,
    threshold: u32,
}

impl DebounceTimer {
    pub const fn new(threshold: u32) -> Self {
        Self {
            elapsed: 0,
            threshold,
        }
    }

    /// True once at least `threshold` ticks have passed since the last reset.
    #[inline]
    pub fn ready(&self) -> bool {
        self.elapsed >= self.threshold
    }

    #[inline]
    pub fn reset(&mut self) {
        self.elapsed = 0;
    }

    #[inline]
    pub fn advance(&mut self) {
        self.elapsed = self.elapsed.saturating_add(1);
    }

    #[inline]
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    #[inline]
    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebounceTimers {
    pub rotation: DebounceTimer,
    pub cancel: DebounceTimer,
    /// Only consulted for standard buildings.
    pub placement: DebounceTimer,
}

impl DebounceTimers {
    pub fn from_settings(s: &PlacementSettings) -> Self {
        Self {
            rotation: DebounceTimer::new(s.rotation_delay),
            cancel: DebounceTimer::new(s.cancel_delay),
            placement: DebounceTimer::new(s.placement_delay),
        }
    }

    pub fn advance_all(&mut self) {
        self.rotation.advance();
        self.cancel.advance();
        self.placement.advance();
    }
}
