//! Carrier and symbol-timer settings for each supported system clock divider.
//!
//! The symbol timer is prescaled by the carrier period, so one symbol-timer count lasts exactly
//! one carrier cycle (about 26.7 µs, a ~37.5 kHz carrier) whatever the divider.

/// Nominal MSI oscillator frequency, before division.
pub const MSI_BASE_HZ: u32 = 1 << 22;

/// Timer settings for one clock divider.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrTiming {
    /// System clock cycles per carrier cycle.
    pub mod_period: u16,
    /// System clock cycles the carrier is high within one cycle.
    pub mod_duty: u16,
    /// Symbol-timer prescaler, in system clock cycles.
    pub base_prescale: u16,
    /// Unit length for symbol durations, in symbol-timer counts.
    pub base_duration: u16,
    divider: u32,
}

impl IrTiming {
    /// Settings for `divider`, one of 1, 2, 4, 8 or 16.
    ///
    /// # Panics
    /// Panics for any other divider. Evaluated in a `const`, that is a build error.
    #[must_use]
    pub const fn for_clock_divider(divider: u32) -> Self {
        let (mod_period, mod_duty) = match divider {
            1 => (112, 56),
            2 => (56, 28),
            4 => (28, 14),
            8 => (14, 7),
            16 => (7, 3),
            _ => panic!("clock divider must be 1, 2, 4, 8 or 16 for IR output"),
        };
        Self {
            mod_period,
            mod_duty,
            base_prescale: mod_period,
            base_duration: 29,
            divider,
        }
    }

    #[must_use]
    pub const fn divider(&self) -> u32 {
        self.divider
    }

    #[expect(
        clippy::arithmetic_side_effects,
        clippy::integer_division_remainder_used,
        reason = "the divider is one of 1, 2, 4, 8 or 16"
    )]
    #[must_use]
    pub const fn sys_clk_hz(&self) -> u32 {
        MSI_BASE_HZ / self.divider
    }

    #[expect(
        clippy::arithmetic_side_effects,
        clippy::integer_division_remainder_used,
        reason = "every table entry has a non-zero carrier period"
    )]
    #[must_use]
    pub const fn carrier_hz(&self) -> u32 {
        self.sys_clk_hz() / self.mod_period as u32
    }

    /// Wall-clock length of `counts` symbol-timer counts, in microseconds (rounded down).
    #[must_use]
    pub const fn counts_to_micros(&self, counts: u32) -> u64 {
        let cycles = (counts as u64).saturating_mul(self.base_prescale as u64);
        match cycles
            .saturating_mul(1_000_000)
            .checked_div(self.sys_clk_hz() as u64)
        {
            Some(micros) => micros,
            None => 0,
        }
    }
}

impl Default for IrTiming {
    fn default() -> Self {
        Self::for_clock_divider(crate::CLOCK_DIVIDER)
    }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;

    #[test]
    fn carrier_is_near_38_khz_for_every_divider() {
        for divider in [1, 2, 4, 8, 16] {
            let timing = IrTiming::for_clock_divider(divider);
            assert_eq!(timing.base_prescale, timing.mod_period);
            assert_eq!(timing.base_duration, 29);
            let carrier = timing.carrier_hz();
            assert!((37_000..=38_000).contains(&carrier), "{divider}: {carrier} Hz");
        }
    }

    #[test]
    fn default_matches_configured_divider() {
        let timing = IrTiming::default();
        assert_eq!(timing.divider(), 16);
        assert_eq!((timing.mod_period, timing.mod_duty), (7, 3));
        assert_eq!(timing.sys_clk_hz(), 262_144);
    }

    #[test]
    fn counts_convert_to_micros() {
        let timing = IrTiming::for_clock_divider(16);
        // 29 counts * 7 cycles / 262_144 Hz = 774 µs
        assert_eq!(timing.counts_to_micros(29), 774);
        assert_eq!(timing.counts_to_micros(0), 0);
        // 2^32 - 1 counts is about 31 hours at this carrier.
        let longest = timing.counts_to_micros(u32::MAX);
        assert!((114_000_000_000..115_000_000_000).contains(&longest), "{longest} us");
    }

    #[test]
    #[should_panic(expected = "clock divider must be")]
    fn unsupported_divider_panics() {
        let _ = IrTiming::for_clock_divider(32);
    }
}
