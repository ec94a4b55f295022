//! Poll-tick time base: wrap-safe tick instants and millisecond conversion.
//!
//! The clock is a free-running `u32` counter advanced once per poll period. It wraps silently,
//! so elapsed time is always measured with wrapping subtraction ([`Tick::ticks_since`]).

/// One instant of the poll clock.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tick(pub u32);

impl Tick {
    /// Ticks elapsed from `earlier` to `self`, correct across counter wraparound.
    #[inline]
    #[must_use]
    pub const fn ticks_since(self, earlier: Self) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// The instant `ticks` after `self`, wrapping.
    #[inline]
    #[must_use]
    pub const fn wrapping_add(self, ticks: u32) -> Self {
        Self(self.0.wrapping_add(ticks))
    }
}

/// Source of the monotonic poll clock.
pub trait TickSource {
    /// Current tick count. Must never go backwards except by wrapping.
    fn now(&self) -> Tick;
}

impl<T: TickSource + ?Sized> TickSource for &T {
    fn now(&self) -> Tick {
        (**self).now()
    }
}

/// Conversion between milliseconds and poll ticks.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickRate {
    tick_ms: u32,
}

impl TickRate {
    /// A tick period of `tick_ms` milliseconds. Zero is treated as one.
    #[must_use]
    pub const fn from_millis(tick_ms: u32) -> Self {
        Self {
            tick_ms: if tick_ms == 0 { 1 } else { tick_ms },
        }
    }

    #[must_use]
    pub const fn tick_ms(self) -> u32 {
        self.tick_ms
    }

    /// Convert a millisecond interval to ticks, rounding to nearest.
    ///
    /// A positive interval never rounds down to zero ticks; zero stays zero (for repeat
    /// intervals zero means "never repeat").
    #[must_use]
    pub const fn to_ticks(self, millis: u32) -> u32 {
        if millis == 0 {
            return 0;
        }
        let half = self.tick_ms / 2;
        match millis.saturating_add(half).checked_div(self.tick_ms) {
            Some(0) | None => 1,
            Some(ticks) => ticks,
        }
    }
}

impl Default for TickRate {
    fn default() -> Self {
        Self::from_millis(crate::TICK_MS)
    }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;

    #[test]
    fn ticks_since_survives_wraparound() {
        let before = Tick(u32::MAX - 2);
        let after = before.wrapping_add(5);
        assert_eq!(after, Tick(2));
        assert_eq!(after.ticks_since(before), 5);
    }

    #[test]
    fn millis_round_to_nearest_tick() {
        let rate = TickRate::from_millis(10);
        assert_eq!(rate.to_ticks(50), 5);
        assert_eq!(rate.to_ticks(330), 33);
        assert_eq!(rate.to_ticks(54), 5);
        assert_eq!(rate.to_ticks(55), 6);
    }

    #[test]
    fn positive_millis_floor_at_one_tick() {
        let rate = TickRate::from_millis(10);
        assert_eq!(rate.to_ticks(1), 1);
        assert_eq!(rate.to_ticks(4), 1);
        assert_eq!(rate.to_ticks(0), 0);
    }

    #[test]
    fn huge_millis_saturate_instead_of_overflowing() {
        let rate = TickRate::from_millis(10);
        assert_eq!(rate.to_ticks(u32::MAX), u32::MAX / 10);
    }

    #[test]
    fn zero_tick_period_is_treated_as_one_millisecond() {
        let rate = TickRate::from_millis(0);
        assert_eq!(rate.tick_ms(), 1);
        assert_eq!(rate.to_ticks(7), 7);
    }
}
