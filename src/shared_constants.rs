use crate::button::ButtonSetup;

/// Milliseconds per poll tick. Set at build time with `FAN_REMOTE_TICK_MS`
/// (see `build.rs`), clamped to 1..=100.
pub const TICK_MS: u32 = clamp_tick_ms(parse_u32(env!("FAN_REMOTE_TICK_MS")));

pub const MIN_TICK_MS: u32 = 1;
pub const MAX_TICK_MS: u32 = 100;

/// Divider applied to the 4.194 MHz MSI system clock. Selects the carrier timing.
pub const CLOCK_DIVIDER: u32 = 16;

/// Number of physical buttons on the remote.
pub const BUTTON_COUNT: usize = 4;

/// Power, speed down, speed up, rotate. Index order matches the command table.
pub const DEFAULT_BUTTON_SETUPS: [ButtonSetup; BUTTON_COUNT] = [
    ButtonSetup::new(50, 0),
    ButtonSetup::new(50, 330),
    ButtonSetup::new(50, 330),
    ButtonSetup::new(50, 0),
];

/// Parse a decimal string at compile time. Non-digits end the number.
#[must_use]
pub const fn parse_u32(text: &str) -> u32 {
    let mut bytes = text.as_bytes();
    let mut value: u32 = 0;
    while let [first, rest @ ..] = bytes {
        let byte = *first;
        if !byte.is_ascii_digit() {
            break;
        }
        value = value
            .saturating_mul(10)
            .saturating_add(byte.wrapping_sub(b'0') as u32);
        bytes = rest;
    }
    value
}

#[must_use]
pub const fn clamp_tick_ms(tick_ms: u32) -> u32 {
    if tick_ms < MIN_TICK_MS {
        MIN_TICK_MS
    } else if tick_ms > MAX_TICK_MS {
        MAX_TICK_MS
    } else {
        tick_ms
    }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;

    #[test]
    fn parse_u32_reads_leading_digits() {
        assert_eq!(parse_u32("10"), 10);
        assert_eq!(parse_u32("250ms"), 250);
        assert_eq!(parse_u32(""), 0);
        assert_eq!(parse_u32("x5"), 0);
        assert_eq!(parse_u32("99999999999"), u32::MAX);
    }

    #[test]
    fn tick_period_is_clamped() {
        assert_eq!(clamp_tick_ms(0), 1);
        assert_eq!(clamp_tick_ms(10), 10);
        assert_eq!(clamp_tick_ms(500), 100);
        assert!((MIN_TICK_MS..=MAX_TICK_MS).contains(&TICK_MS));
    }
}
