//! Single-in-flight transmission sequencing.
//!
//! The [`Sequencer`] runs in the poll loop. The hardware player runs elsewhere and reports the
//! end of playback through [`TransmitLink::complete`]. The two sides share only the
//! [`TransmitLink`]: a busy flag plus the "transmission active" level output.

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::digital::OutputPin;
use portable_atomic::{AtomicBool, Ordering};

use crate::command::CommandTable;
use crate::encoder::{Encoder, SymbolStream};
use crate::shared_constants::BUTTON_COUNT;
use crate::triggers::Triggers;
use crate::{Error, Result};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmitState {
    #[default]
    Idle,
    Busy,
}

/// Hardware side of a transmission.
pub trait Transmitter {
    /// Start playing `stream`. Must not block. Playback ends with exactly one call to
    /// [`TransmitLink::complete`].
    fn begin(&mut self, stream: &SymbolStream);
}

impl<T: Transmitter + ?Sized> Transmitter for &mut T {
    fn begin(&mut self, stream: &SymbolStream) {
        (**self).begin(stream);
    }
}

/// State shared between the poll loop and the completion context.
///
/// Usually a `static`, created with [`TransmitLink::new`] and given its level pin at startup
/// with [`TransmitLink::attach`]. Without a pin the link only tracks busy/idle.
pub struct TransmitLink<P> {
    busy: AtomicBool,
    level: Mutex<RefCell<Option<P>>>,
}

impl<P> TransmitLink<P> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
            level: Mutex::new(RefCell::new(None)),
        }
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn state(&self) -> TransmitState {
        if self.is_busy() {
            TransmitState::Busy
        } else {
            TransmitState::Idle
        }
    }
}

impl<P> TransmitLink<P>
where
    P: OutputPin,
    Error: From<P::Error>,
{
    /// Install the "transmission active" output, driving it to match the current state.
    ///
    /// # Errors
    /// Returns an error if the pin cannot be driven.
    pub fn attach(&self, mut pin: P) -> Result<()> {
        critical_section::with(|cs| {
            if self.busy.load(Ordering::Acquire) {
                pin.set_high()?;
            } else {
                pin.set_low()?;
            }
            *self.level.borrow_ref_mut(cs) = Some(pin);
            Ok(())
        })
    }

    /// Mark a transmission as started and raise the level output, atomically with respect to
    /// [`Self::complete`].
    ///
    /// If the level cannot be raised the link stays idle.
    fn start(&self) -> Result<()> {
        critical_section::with(|cs| {
            if let Some(pin) = self.level.borrow_ref_mut(cs).as_mut() {
                pin.set_high()?;
            }
            self.busy.store(true, Ordering::Release);
            Ok(())
        })
    }

    /// The transmission-finished event. Clears busy and lowers the level output in one critical
    /// section. Safe to call from interrupt context and idempotent: a completion without a
    /// transmission in flight changes nothing, not even the level output.
    pub fn complete(&self) {
        let was_busy = critical_section::with(|cs| {
            let was_busy = self.busy.swap(false, Ordering::AcqRel);
            let mut level = self.level.borrow_ref_mut(cs);
            if let Some(pin) = level.as_mut().filter(|_| was_busy) {
                if pin.set_low().is_err() {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("transmit link: could not clear level output");
                }
            }
            was_busy
        });
        #[cfg(feature = "defmt")]
        if was_busy {
            defmt::debug!("transmission complete");
        } else {
            defmt::trace!("completion with no transmission in flight ignored");
        }
        #[cfg(not(feature = "defmt"))]
        let _ = was_busy;
    }

    /// Detach and return the level output, if any.
    pub fn take_level(&self) -> Option<P> {
        critical_section::with(|cs| self.level.borrow_ref_mut(cs).take())
    }
}

impl<P> Default for TransmitLink<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns trigger bitmasks into transmissions, one at a time.
pub struct Sequencer<'a, T, P, const N: usize = BUTTON_COUNT> {
    commands: CommandTable<N>,
    encoder: Encoder,
    transmitter: T,
    link: &'a TransmitLink<P>,
}

impl<'a, T, P, const N: usize> Sequencer<'a, T, P, N>
where
    T: Transmitter,
    P: OutputPin,
    Error: From<P::Error>,
{
    #[must_use]
    pub fn new(
        commands: CommandTable<N>,
        encoder: Encoder,
        transmitter: T,
        link: &'a TransmitLink<P>,
    ) -> Self {
        Self {
            commands,
            encoder,
            transmitter,
            link,
        }
    }

    /// One poll's worth of sequencing. Returns whether a transmission is in progress afterward.
    ///
    /// While busy the triggers are dropped. When idle, the lowest set trigger bit with a
    /// command is encoded and handed to the transmitter. Bits without a command are ignored.
    ///
    /// # Errors
    /// Returns an error if the level output cannot be raised; nothing is sent in that case.
    pub fn service(&mut self, triggers: Triggers) -> Result<bool> {
        if self.link.is_busy() {
            #[cfg(feature = "defmt")]
            if !triggers.is_empty() {
                defmt::trace!("busy; dropped triggers {}", triggers);
            }
            return Ok(true);
        }
        let Some(index) = triggers.lowest() else {
            return Ok(false);
        };
        let Some(command) = self.commands.get_mut(index) else {
            #[cfg(feature = "defmt")]
            defmt::trace!("trigger {} has no command", index);
            return Ok(false);
        };

        self.link.start()?;
        let stream = self.encoder.encode(command);
        #[cfg(feature = "defmt")]
        defmt::info!(
            "sending command {}: base {=u16:#x} counter {}",
            index,
            command.base_value(),
            command.counter()
        );
        self.transmitter.begin(&stream);
        Ok(true)
    }

    #[must_use]
    pub fn state(&self) -> TransmitState {
        self.link.state()
    }

    #[must_use]
    pub const fn commands(&self) -> &CommandTable<N> {
        &self.commands
    }

    pub const fn transmitter(&mut self) -> &mut T {
        &mut self.transmitter
    }
}
