//! Button conditioning: debounce, auto-repeat and lowest-index arbitration for a bank of
//! polled push buttons.
//!
//! Each channel runs a three-state machine once per poll tick:
//!
//! ```text
//!            pressed                      held >= debounce (fires)
//!   Idle ------------> Triggered ------------------------------> Active --+
//!    ^                    |                                        |  ^    | held >= repeat,
//!    |     released       |                released                |  |    | repeat > 0 (fires)
//!    +--------------------+----------------------------------------+  +----+
//! ```
//!
//! After every channel has been stepped, the lowest-indexed channel that is `Active` masks off
//! every higher trigger bit, so at most the lowest active press reaches the transmitter.

use heapless::Vec;

use crate::tick::{Tick, TickRate};
use crate::triggers::Triggers;
use crate::{Error, Result};

/// Debounce and repeat intervals for one button, in milliseconds.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonSetup {
    pub debounce_ms: u32,
    /// Zero disables auto-repeat.
    pub repeat_ms: u32,
}

impl ButtonSetup {
    #[must_use]
    pub const fn new(debounce_ms: u32, repeat_ms: u32) -> Self {
        Self {
            debounce_ms,
            repeat_ms,
        }
    }
}

/// Raw, undebounced button levels.
pub trait ButtonInputs {
    /// `true` while the button on `index` is physically pressed.
    fn is_pressed(&mut self, index: usize) -> bool;
}

impl<F> ButtonInputs for F
where
    F: FnMut(usize) -> bool,
{
    fn is_pressed(&mut self, index: usize) -> bool {
        self(index)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonState {
    #[default]
    Idle,
    /// Press seen, debounce window open.
    Triggered,
    /// Press confirmed; may auto-repeat.
    Active,
}

/// Outcome of stepping one channel's state machine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Step {
    pub state: ButtonState,
    /// Restart the channel's interval timer at the current tick.
    pub restart: bool,
    /// Emit this channel's trigger bit for the current poll.
    pub fire: bool,
}

impl Step {
    const fn stay(state: ButtonState) -> Self {
        Self {
            state,
            restart: false,
            fire: false,
        }
    }

    const fn restart(state: ButtonState) -> Self {
        Self {
            state,
            restart: true,
            fire: false,
        }
    }

    const fn fire(state: ButtonState) -> Self {
        Self {
            state,
            restart: true,
            fire: true,
        }
    }
}

impl ButtonState {
    /// The transition function for one poll.
    ///
    /// `elapsed` is the number of ticks since the channel's last restart.
    #[must_use]
    pub const fn step(self, pressed: bool, elapsed: u32, debounce: u32, repeat: u32) -> Step {
        match self {
            Self::Idle => {
                if pressed {
                    Step::restart(Self::Triggered)
                } else {
                    Step::restart(Self::Idle)
                }
            }
            Self::Triggered => {
                if !pressed {
                    Step::restart(Self::Idle)
                } else if elapsed >= debounce {
                    Step::fire(Self::Active)
                } else {
                    Step::stay(Self::Triggered)
                }
            }
            Self::Active => {
                if !pressed {
                    Step::restart(Self::Idle)
                } else if repeat > 0 && elapsed >= repeat {
                    Step::fire(Self::Active)
                } else {
                    Step::stay(Self::Active)
                }
            }
        }
    }
}

/// One physical input line and its conditioning state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ButtonChannel {
    index: usize,
    debounce: u32,
    repeat: u32,
    state: ButtonState,
    last_transition: Tick,
}

impl ButtonChannel {
    /// A channel with intervals already in ticks.
    #[must_use]
    pub const fn new(index: usize, debounce: u32, repeat: u32) -> Self {
        Self {
            index,
            debounce,
            repeat,
            state: ButtonState::Idle,
            last_transition: Tick(0),
        }
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Debounce interval in ticks.
    #[must_use]
    pub const fn debounce(&self) -> u32 {
        self.debounce
    }

    /// Repeat interval in ticks; zero means no auto-repeat.
    #[must_use]
    pub const fn repeat(&self) -> u32 {
        self.repeat
    }

    #[must_use]
    pub const fn state(&self) -> ButtonState {
        self.state
    }

    /// Advance one poll. Returns `true` if the channel fires this poll.
    pub fn update(&mut self, now: Tick, pressed: bool) -> bool {
        let elapsed = now.ticks_since(self.last_transition);
        let step = self.state.step(pressed, elapsed, self.debounce, self.repeat);
        if step.restart {
            self.last_transition = now;
        }
        #[cfg(feature = "defmt")]
        if step.fire {
            if self.state == ButtonState::Active {
                defmt::trace!("button {}: repeat at {}", self.index, now);
            } else {
                defmt::trace!("button {}: confirmed at {}", self.index, now);
            }
        }
        self.state = step.state;
        step.fire
    }
}

/// Result of one conditioning poll.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonPoll {
    pub triggers: Triggers,
    /// Some channel is `Triggered` or `Active`, so the poll clock must keep running.
    pub any_active: bool,
}

/// The button conditioning engine for up to [`Triggers::CAPACITY`] channels.
///
/// Built once from a configuration list; an empty list yields an engine that never fires and
/// never reports activity.
#[derive(Clone, Debug, Default)]
pub struct Buttons {
    channels: Vec<ButtonChannel, { Triggers::CAPACITY }>,
}

impl Buttons {
    /// Build one channel per setup, in order, converting milliseconds to ticks.
    ///
    /// # Errors
    /// Returns [`Error::TooManyChannels`] if `setups` is longer than [`Triggers::CAPACITY`].
    pub fn new(setups: &[ButtonSetup], tick_rate: TickRate) -> Result<Self> {
        if setups.len() > Triggers::CAPACITY {
            return Err(Error::TooManyChannels {
                requested: setups.len(),
                capacity: Triggers::CAPACITY,
            });
        }
        let mut channels = Vec::new();
        for (index, setup) in setups.iter().enumerate() {
            let channel = ButtonChannel::new(
                index,
                tick_rate.to_ticks(setup.debounce_ms),
                tick_rate.to_ticks(setup.repeat_ms),
            );
            channels
                .push(channel)
                .map_err(|_| Error::TooManyChannels {
                    requested: setups.len(),
                    capacity: Triggers::CAPACITY,
                })?;
        }
        #[cfg(feature = "defmt")]
        if channels.is_empty() {
            defmt::warn!("no buttons configured; conditioning stays inactive");
        }
        Ok(Self { channels })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    #[must_use]
    pub fn channel(&self, index: usize) -> Option<&ButtonChannel> {
        self.channels.get(index)
    }

    /// Run one poll: sample every channel, step its state machine, then arbitrate.
    ///
    /// Call exactly once per tick with a non-decreasing (wrapping) `now`.
    pub fn service<I>(&mut self, now: Tick, inputs: &mut I) -> ButtonPoll
    where
        I: ButtonInputs + ?Sized,
    {
        let mut triggers = Triggers::NONE;
        for channel in &mut self.channels {
            let pressed = inputs.is_pressed(channel.index);
            if channel.update(now, pressed) {
                triggers.set(channel.index);
            }
        }

        ButtonPoll {
            triggers: self.suppress(triggers),
            any_active: self.any_active(),
        }
    }

    /// The lowest-indexed `Active` channel masks every higher trigger bit.
    fn suppress(&self, triggers: Triggers) -> Triggers {
        let Some(dominant) = self
            .channels
            .iter()
            .find(|channel| channel.state == ButtonState::Active)
        else {
            return triggers;
        };
        let kept = triggers.keep_through(dominant.index);
        #[cfg(feature = "defmt")]
        if kept != triggers {
            defmt::debug!(
                "button {} active; suppressed triggers {=u8:#b}",
                dominant.index,
                triggers.bits() & !kept.bits()
            );
        }
        kept
    }

    fn any_active(&self) -> bool {
        self.channels
            .iter()
            .any(|channel| channel.state != ButtonState::Idle)
    }
}
