//! Four-button IR fan remote on a Raspberry Pi Pico.
//!
//! Buttons from GP2..GP5 to ground: power, speed down, speed up, rotate. The IR LED driver is on
//! GP16 (PWM slice 0, channel A) and the onboard LED on GP25 lights while a command is on air.
#![no_std]
#![no_main]
#![allow(clippy::future_not_send, reason = "Single-threaded")]

use core::convert::Infallible;

use defmt::info;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::pwm::{Config, Pwm};
use embassy_time::Timer;
use fan_remote::pico::{
    EmbassyTicks, FanTransmitLink, PinButtons, PwmTransmitter, PwmTransmitterStatic,
};
use fan_remote::{
    Activity, Buttons, DEFAULT_BUTTON_SETUPS, Encoder, FanCommandTable, IrTiming, Remote, Result,
    Sequencer, TickRate,
};
use panic_probe as _;

static TRANSMIT_LINK: FanTransmitLink = FanTransmitLink::new();
static PWM_TRANSMITTER_STATIC: PwmTransmitterStatic = PwmTransmitter::new_static();

#[embassy_executor::main]
pub async fn main(spawner: Spawner) -> ! {
    // If it returns, something went wrong.
    let err = inner_main(spawner).await.unwrap_err();
    panic!("{err}");
}

async fn inner_main(spawner: Spawner) -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());

    let timing = IrTiming::default();
    TRANSMIT_LINK.attach(Output::new(p.PIN_25, Level::Low))?;
    let pwm = Pwm::new_output_a(p.PWM_SLICE0, p.PIN_16, Config::default());
    let transmitter = PwmTransmitter::new(
        pwm,
        timing,
        &PWM_TRANSMITTER_STATIC,
        &TRANSMIT_LINK,
        spawner,
    )?;

    let rate = TickRate::default();
    let clock = EmbassyTicks::new(rate);
    let buttons = Buttons::new(&DEFAULT_BUTTON_SETUPS, rate)?;
    let inputs = PinButtons::new([
        p.PIN_2.into(),
        p.PIN_3.into(),
        p.PIN_4.into(),
        p.PIN_5.into(),
    ]);
    let sequencer = Sequencer::new(
        FanCommandTable::default(),
        Encoder::new(&timing),
        transmitter,
        &TRANSMIT_LINK,
    );
    let mut remote = Remote::new(clock, inputs, buttons, sequencer);

    info!(
        "fan remote ready: {} buttons, {} ms tick, {} Hz carrier",
        remote.buttons().len(),
        rate.tick_ms(),
        timing.carrier_hz()
    );

    loop {
        let next_tick = clock.next_tick();
        match remote.poll()? {
            Activity::Active => Timer::at(next_tick).await,
            Activity::Idle => {
                info!("idle; waiting for a button");
                remote.inputs_mut().wait_for_press().await;
            }
        }
    }
}
