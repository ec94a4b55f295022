//! The poll loop driver: one [`Remote::poll`] per tick ties the button engine to the sequencer.

use embedded_hal::digital::OutputPin;

use crate::button::{ButtonInputs, ButtonPoll, Buttons};
use crate::sequencer::{Sequencer, Transmitter};
use crate::tick::{Tick, TickSource};
use crate::{Error, Result};

/// Whether the processor may sleep after a poll.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Activity {
    /// A button is held or a transmission is running; keep the poll clock going.
    Active,
    /// Nothing pending. The caller may stop until the next interrupt.
    Idle,
}

impl Activity {
    #[must_use]
    pub const fn may_sleep(self) -> bool {
        matches!(self, Self::Idle)
    }
}

pub struct Remote<'a, C, I, T, P, const N: usize> {
    clock: C,
    inputs: I,
    buttons: Buttons,
    sequencer: Sequencer<'a, T, P, N>,
    last_poll: ButtonPoll,
}

impl<'a, C, I, T, P, const N: usize> Remote<'a, C, I, T, P, N>
where
    C: TickSource,
    I: ButtonInputs,
    T: Transmitter,
    P: OutputPin,
    Error: From<P::Error>,
{
    #[must_use]
    pub fn new(clock: C, inputs: I, buttons: Buttons, sequencer: Sequencer<'a, T, P, N>) -> Self {
        Self {
            clock,
            inputs,
            buttons,
            sequencer,
            last_poll: ButtonPoll::default(),
        }
    }

    /// Run one poll cycle: read the clock, condition the buttons, then sequence.
    ///
    /// The buttons advance before sequencing, so a poll that fails has still consumed its
    /// triggers.
    ///
    /// # Errors
    /// Returns an error if the sequencer cannot raise the level output.
    pub fn poll(&mut self) -> Result<Activity> {
        let now: Tick = self.clock.now();
        let poll = self.buttons.service(now, &mut self.inputs);
        self.last_poll = poll;
        let transmitting = self.sequencer.service(poll.triggers)?;
        Ok(if poll.any_active || transmitting {
            Activity::Active
        } else {
            Activity::Idle
        })
    }

    /// Outcome of the most recent button poll.
    #[must_use]
    pub const fn last_poll(&self) -> ButtonPoll {
        self.last_poll
    }

    /// The raw inputs, for waiting on a press while idle.
    pub const fn inputs_mut(&mut self) -> &mut I {
        &mut self.inputs
    }

    #[must_use]
    pub const fn buttons(&self) -> &Buttons {
        &self.buttons
    }

    #[must_use]
    pub const fn sequencer(&self) -> &Sequencer<'a, T, P, N> {
        &self.sequencer
    }

    pub const fn sequencer_mut(&mut self) -> &mut Sequencer<'a, T, P, N> {
        &mut self.sequencer
    }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use core::cell::Cell;
    use core::convert::Infallible;

    use embedded_hal::digital::ErrorType;

    use super::*;
    use crate::button::ButtonSetup;
    use crate::command::FanCommandTable;
    use crate::encoder::{Encoder, SymbolStream};
    use crate::sequencer::TransmitLink;
    use crate::tick::TickRate;

    struct NoLevel;

    impl ErrorType for NoLevel {
        type Error = Infallible;
    }

    impl OutputPin for NoLevel {
        fn set_low(&mut self) -> core::result::Result<(), Infallible> {
            Ok(())
        }

        fn set_high(&mut self) -> core::result::Result<(), Infallible> {
            Ok(())
        }
    }

    struct Clock<'c>(&'c Cell<u32>);

    impl TickSource for Clock<'_> {
        fn now(&self) -> Tick {
            Tick(self.0.get())
        }
    }

    #[derive(Default)]
    struct Count(usize);

    impl Transmitter for Count {
        fn begin(&mut self, _: &SymbolStream) {
            self.0 += 1;
        }
    }

    #[test]
    fn idle_until_a_button_is_pressed() {
        let ticks = Cell::new(0);
        let pressed = Cell::new(false);
        let link = TransmitLink::<NoLevel>::new();
        let buttons = Buttons::new(&[ButtonSetup::new(50, 0)], TickRate::from_millis(10))
            .expect("buttons");
        let sequencer =
            Sequencer::new(FanCommandTable::default(), Encoder::default(), Count::default(), &link);
        let mut remote = Remote::new(Clock(&ticks), |_: usize| pressed.get(), buttons, sequencer);

        assert_eq!(remote.poll().expect("poll"), Activity::Idle);
        assert!(Activity::Idle.may_sleep());

        pressed.set(true);
        for tick in 1..=6 {
            ticks.set(tick);
            assert_eq!(remote.poll().expect("poll"), Activity::Active);
        }
        assert_eq!(remote.sequencer_mut().transmitter().0, 1);

        pressed.set(false);
        ticks.set(7);
        assert_eq!(remote.poll().expect("poll"), Activity::Active, "still sending");
        link.complete();
        ticks.set(8);
        assert_eq!(remote.poll().expect("poll"), Activity::Idle);
        assert!(!remote.last_poll().any_active);
    }

    struct StuckLevel;

    #[derive(Debug)]
    struct StuckLevelError;

    impl embedded_hal::digital::Error for StuckLevelError {
        fn kind(&self) -> embedded_hal::digital::ErrorKind {
            embedded_hal::digital::ErrorKind::Other
        }
    }

    impl From<StuckLevelError> for Error {
        fn from(_: StuckLevelError) -> Self {
            Self::CannotSetOutputState
        }
    }

    impl ErrorType for StuckLevel {
        type Error = StuckLevelError;
    }

    impl OutputPin for StuckLevel {
        fn set_low(&mut self) -> core::result::Result<(), StuckLevelError> {
            Ok(())
        }

        fn set_high(&mut self) -> core::result::Result<(), StuckLevelError> {
            Err(StuckLevelError)
        }
    }

    #[test]
    fn failed_poll_consumes_its_trigger() {
        let ticks = Cell::new(0);
        let link = TransmitLink::new();
        link.attach(StuckLevel).expect("attach");
        let buttons = Buttons::new(&[ButtonSetup::new(50, 0)], TickRate::from_millis(10))
            .expect("buttons");
        let sequencer =
            Sequencer::new(FanCommandTable::default(), Encoder::default(), Count::default(), &link);
        let mut remote = Remote::new(Clock(&ticks), |_: usize| true, buttons, sequencer);

        for tick in 0..5 {
            ticks.set(tick);
            assert_eq!(remote.poll().expect("debouncing"), Activity::Active);
        }
        ticks.set(5);
        assert!(matches!(remote.poll(), Err(Error::CannotSetOutputState)));
        assert_eq!(remote.last_poll().triggers, crate::Triggers::single(0));

        // Held without repeat: the confirmed press does not fire again.
        ticks.set(6);
        assert_eq!(remote.poll().expect("held"), Activity::Active);
        assert!(remote.last_poll().triggers.is_empty());
        assert_eq!(remote.sequencer_mut().transmitter().0, 0);
    }
}
