//! Pico adapters: buttons on GPIO inputs, the poll clock on `embassy_time`, and a PWM carrier
//! player for symbol streams.
//!
//! See `demos/fan_remote.rs` for the wiring.
#![cfg(not(feature = "host"))]

use embassy_executor::Spawner;
use embassy_futures::select::select_array;
use embassy_rp::Peri;
use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::gpio::{AnyPin, Input, Output, Pull};
use embassy_rp::pwm::{Config, Pwm};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Timer};

use crate::button::ButtonInputs;
use crate::encoder::SymbolStream;
use crate::ir_timing::IrTiming;
use crate::sequencer::{TransmitLink, Transmitter};
use crate::tick::{Tick, TickRate, TickSource};
use crate::{Error, Result};

// ===== Buttons ==============================================================

/// Push buttons wired to ground with the internal pull-up enabled: low means pressed.
pub struct PinButtons<const N: usize> {
    pins: [Input<'static>; N],
}

impl<const N: usize> PinButtons<N> {
    #[must_use]
    pub fn new(pins: [Peri<'static, AnyPin>; N]) -> Self {
        Self {
            pins: pins.map(|pin| Input::new(pin, Pull::Up)),
        }
    }

    /// Wait until any button reads pressed.
    pub async fn wait_for_press(&mut self) {
        if N == 0 {
            return core::future::pending::<()>().await;
        }
        let presses = self.pins.each_mut().map(|pin| pin.wait_for_low());
        select_array(presses).await;
    }
}

impl<const N: usize> ButtonInputs for PinButtons<N> {
    fn is_pressed(&mut self, index: usize) -> bool {
        self.pins.get(index).is_some_and(Input::is_low)
    }
}

// ===== Poll clock ===========================================================

/// Poll ticks derived from `embassy_time::Instant`, truncated to a wrapping `u32`.
#[derive(Clone, Copy, Debug)]
pub struct EmbassyTicks {
    tick_ms: u64,
}

impl EmbassyTicks {
    #[must_use]
    pub const fn new(rate: TickRate) -> Self {
        Self {
            tick_ms: rate.tick_ms() as u64,
        }
    }

    /// The instant the tick after the current one begins.
    #[must_use]
    pub fn next_tick(&self) -> Instant {
        let elapsed = self.elapsed_ticks();
        Instant::from_millis(elapsed.saturating_add(1).saturating_mul(self.tick_ms))
    }

    fn elapsed_ticks(&self) -> u64 {
        Instant::now()
            .as_millis()
            .checked_div(self.tick_ms)
            .unwrap_or_default()
    }
}

impl Default for EmbassyTicks {
    fn default() -> Self {
        Self::new(TickRate::default())
    }
}

impl TickSource for EmbassyTicks {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the poll clock wraps at 32 bits"
    )]
    fn now(&self) -> Tick {
        Tick(self.elapsed_ticks() as u32)
    }
}

// ===== IR transmitter =======================================================

/// The completion link used with the PWM transmitter; its level pin is the "IR active" LED.
pub type FanTransmitLink = TransmitLink<Output<'static>>;

/// Static type for the `PwmTransmitter`.
pub type PwmTransmitterStatic = Signal<CriticalSectionRawMutex, SymbolStream>;

/// Plays symbol streams as a keyed PWM carrier on a background task.
///
/// The carrier is off for each symbol's space and on for its mark. When a stream is exhausted
/// the task calls [`TransmitLink::complete`].
pub struct PwmTransmitter {
    streams: &'static PwmTransmitterStatic,
}

impl PwmTransmitter {
    /// Create static resources for the transmitter task.
    #[must_use]
    pub const fn new_static() -> PwmTransmitterStatic {
        Signal::new()
    }

    /// Spawn the player on `pwm`, a slice configured with one output.
    ///
    /// # Errors
    /// Returns an error if the background task cannot be spawned.
    pub fn new(
        pwm: Pwm<'static>,
        timing: IrTiming,
        streams: &'static PwmTransmitterStatic,
        link: &'static FanTransmitLink,
        spawner: Spawner,
    ) -> Result<Self> {
        let carrier = Carrier::new(pwm, &timing);
        let token = pwm_transmitter_task(carrier, timing, streams, link).map_err(Error::TaskSpawn)?;
        spawner.spawn(token);
        Ok(Self { streams })
    }
}

impl Transmitter for PwmTransmitter {
    fn begin(&mut self, stream: &SymbolStream) {
        self.streams.signal(*stream);
    }
}

struct Carrier {
    pwm: Pwm<'static>,
    cfg: Config,
    on_compare: u16,
}

impl Carrier {
    fn new(mut pwm: Pwm<'static>, timing: &IrTiming) -> Self {
        let clk = clk_sys_freq();
        let top = clk
            .checked_div(timing.carrier_hz())
            .unwrap_or(u32::from(u16::MAX))
            .clamp(2, u32::from(u16::MAX));
        let on_compare = top
            .saturating_mul(u32::from(timing.mod_duty))
            .checked_div(u32::from(timing.mod_period))
            .unwrap_or(top / 2);

        let mut cfg = Config::default();
        cfg.top = u16::try_from(top.saturating_sub(1)).unwrap_or(u16::MAX);
        cfg.compare_a = 0;
        cfg.phase_correct = false;
        cfg.enable = true;
        pwm.set_config(&cfg);

        #[cfg(feature = "defmt")]
        defmt::info!(
            "IR carrier: clk={}Hz top={} on={} ({}Hz)",
            clk,
            cfg.top,
            on_compare,
            timing.carrier_hz()
        );

        let on_compare = u16::try_from(on_compare).unwrap_or(cfg.top / 2);
        Self {
            pwm,
            cfg,
            on_compare,
        }
    }

    fn set(&mut self, on: bool) {
        self.cfg.compare_a = if on { self.on_compare } else { 0 };
        self.pwm.set_config(&self.cfg);
    }
}

#[embassy_executor::task]
async fn pwm_transmitter_task(
    mut carrier: Carrier,
    timing: IrTiming,
    streams: &'static PwmTransmitterStatic,
    link: &'static FanTransmitLink,
) -> ! {
    #[cfg(feature = "defmt")]
    defmt::info!("IR transmitter task started");
    loop {
        let stream = streams.wait().await;
        let started = Instant::now();
        let mut deadline = started;
        for symbol in stream.symbols() {
            for (on, counts) in [(false, symbol.space_counts()), (true, symbol.mark_counts())] {
                if counts == 0 {
                    continue;
                }
                carrier.set(on);
                deadline = deadline
                    .checked_add(Duration::from_micros(timing.counts_to_micros(counts)))
                    .unwrap_or(Instant::MAX);
                Timer::at(deadline).await;
            }
        }
        carrier.set(false);
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "stream played in {} us",
            Instant::now().duration_since(started).as_micros()
        );
        link.complete();
    }
}
