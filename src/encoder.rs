//! Encode a command into the duty/period symbol stream played by the IR symbol timer.
//!
//! One message is a start-of-frame symbol, sixteen payload bits (most significant first) and an
//! inter-frame gap. The message is sent [`REPEAT_COUNT`] times back to back:
//!
//! ```text
//!   | SOF | b15 | b14 | ... | b0 | IFG | SOF | b15 | ... | b0 | IFG |
//!   '------------ copy 0 -----------'  '--------- copy 1 ----------'
//! ```
//!
//! Each symbol is a pair of timer register values: the compare value (`duty`) at which the
//! output level changes, and the auto-reload value (`period`) that ends the symbol. Register
//! values are one less than the count they represent.

use crate::command::Command;
use crate::ir_timing::IrTiming;

pub const PAYLOAD_BITS: usize = u16::BITS as usize;
/// SOF + payload bits + IFG.
pub const SYMBOLS_PER_MESSAGE: usize = 1 + PAYLOAD_BITS + 1;
/// Copies of the message per transmission, as the fan's own remote sends.
pub const REPEAT_COUNT: usize = 2;
pub const STREAM_LEN: usize = SYMBOLS_PER_MESSAGE * REPEAT_COUNT;
/// Duty value that never expires within a symbol; holds the level until the next symbol loads.
pub const HOLD_DUTY: u16 = u16::MAX;

/// One encoded symbol, as timer register values.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Symbol {
    pub duty: u16,
    pub period: u16,
}

impl Symbol {
    /// A symbol from duty and period in counts, stored as register values.
    #[must_use]
    pub const fn from_counts(duty_counts: u16, period_counts: u16) -> Self {
        Self {
            duty: duty_counts.saturating_sub(1),
            period: period_counts.saturating_sub(1),
        }
    }

    /// Symbol length in symbol-timer counts.
    #[must_use]
    pub const fn period_counts(self) -> u32 {
        (self.period as u32).saturating_add(1)
    }

    /// Counts of silence at the start of the symbol: the timer output stays inactive until the
    /// counter reaches the compare value.
    #[must_use]
    pub const fn space_counts(self) -> u32 {
        let duty = self.duty as u32;
        let period = self.period_counts();
        if duty < period { duty } else { period }
    }

    /// Counts of carrier that close the symbol.
    #[must_use]
    pub const fn mark_counts(self) -> u32 {
        self.period_counts().saturating_sub(self.space_counts())
    }
}

/// The four symbol shapes, derived from the timer's base duration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SymbolSet {
    pub sof: Symbol,
    pub one: Symbol,
    pub zero: Symbol,
    pub ifg: Symbol,
}

impl SymbolSet {
    #[must_use]
    pub const fn new(timing: &IrTiming) -> Self {
        let base = timing.base_duration;
        Self {
            sof: Symbol::from_counts(1, base.saturating_mul(3)),
            one: Symbol::from_counts(base.saturating_mul(2), base.saturating_mul(3)),
            zero: Symbol::from_counts(base, base.saturating_mul(2)),
            ifg: Symbol::from_counts(base.saturating_mul(134), base.saturating_mul(134)),
        }
    }
}

/// A full transmission, laid out as two parallel arrays for DMA into the compare and
/// auto-reload registers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SymbolStream {
    duty: [u16; STREAM_LEN],
    period: [u16; STREAM_LEN],
}

impl SymbolStream {
    const EMPTY: Self = Self {
        duty: [0; STREAM_LEN],
        period: [0; STREAM_LEN],
    };

    #[must_use]
    pub const fn duty(&self) -> &[u16; STREAM_LEN] {
        &self.duty
    }

    #[must_use]
    pub const fn period(&self) -> &[u16; STREAM_LEN] {
        &self.period
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        STREAM_LEN
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        STREAM_LEN == 0
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Symbol> {
        Some(Symbol {
            duty: *self.duty.get(index)?,
            period: *self.period.get(index)?,
        })
    }

    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.duty
            .iter()
            .zip(self.period.iter())
            .map(|(&duty, &period)| Symbol { duty, period })
    }

    /// Total playback length in symbol-timer counts.
    #[must_use]
    pub fn duration_counts(&self) -> u32 {
        self.symbols().map(Symbol::period_counts).sum()
    }
}

/// Builds symbol streams for one timer configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Encoder {
    symbols: SymbolSet,
}

impl Encoder {
    #[must_use]
    pub const fn new(timing: &IrTiming) -> Self {
        Self {
            symbols: SymbolSet::new(timing),
        }
    }

    #[must_use]
    pub const fn symbols(&self) -> &SymbolSet {
        &self.symbols
    }

    /// Advance `command`'s rolling counter and encode the resulting payload.
    pub fn encode(&self, command: &mut Command) -> SymbolStream {
        let payload = command.advance();
        self.encode_payload(payload)
    }

    /// Encode `payload` without touching any counter.
    #[must_use]
    pub fn encode_payload(&self, payload: u16) -> SymbolStream {
        let message = self.message(payload);
        let mut stream = SymbolStream::EMPTY;
        let copies = stream
            .duty
            .chunks_exact_mut(SYMBOLS_PER_MESSAGE)
            .zip(stream.period.chunks_exact_mut(SYMBOLS_PER_MESSAGE));
        for (copy, (duty, period)) in copies.enumerate() {
            for (symbol, (duty_slot, period_slot)) in
                message.iter().zip(duty.iter_mut().zip(period.iter_mut()))
            {
                *duty_slot = symbol.duty;
                *period_slot = symbol.period;
            }
            // Stitching copies together: hold the gap level into the next copy's SOF.
            if copy.saturating_add(1) < REPEAT_COUNT {
                if let Some(gap_duty) = duty.last_mut() {
                    *gap_duty = HOLD_DUTY;
                }
            }
        }
        stream
    }

    fn message(&self, payload: u16) -> [Symbol; SYMBOLS_PER_MESSAGE] {
        let mut message = [self.symbols.ifg; SYMBOLS_PER_MESSAGE];
        let mut slots = message.iter_mut();
        if let Some(sof) = slots.next() {
            *sof = self.symbols.sof;
        }
        for (bit, slot) in (0..PAYLOAD_BITS).rev().zip(slots) {
            *slot = if payload & (1 << bit) != 0 {
                self.symbols.one
            } else {
                self.symbols.zero
            };
        }
        message
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(&IrTiming::default())
    }
}
