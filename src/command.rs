//! The fan's remote-control command set and its rolling counters.

/// Highest rolling-counter value before it wraps back to zero.
pub const MAX_COUNTER: u8 = 3;

/// The functions the remote can send, in trigger-bit order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FanCommand {
    PowerToggle,
    SpeedDown,
    SpeedUp,
    RotateToggle,
}

impl FanCommand {
    pub const ALL: [Self; 4] = [
        Self::PowerToggle,
        Self::SpeedDown,
        Self::SpeedUp,
        Self::RotateToggle,
    ];

    /// The fixed 16-bit code the receiver associates with this function.
    #[must_use]
    pub const fn base_value(self) -> u16 {
        match self {
            Self::PowerToggle => 0x5000,
            Self::SpeedDown => 0x50FA,
            Self::SpeedUp => 0x5054,
            Self::RotateToggle => 0x50A8,
        }
    }
}

/// One command plus the rolling counter mixed into every send of it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Command {
    base_value: u16,
    /// `None` until the first send.
    counter: Option<u8>,
}

impl Command {
    #[must_use]
    pub const fn new(base_value: u16) -> Self {
        Self {
            base_value,
            counter: None,
        }
    }

    #[must_use]
    pub const fn base_value(&self) -> u16 {
        self.base_value
    }

    /// Counter used by the most recent send, if any.
    #[must_use]
    pub const fn counter(&self) -> Option<u8> {
        self.counter
    }

    /// Step the rolling counter and return the payload for this send.
    ///
    /// The first send uses counter zero; after [`MAX_COUNTER`] it wraps to zero again. The
    /// payload is `base_value + counter` with 16-bit wraparound.
    pub const fn advance(&mut self) -> u16 {
        let next = match self.counter {
            Some(counter) if counter < MAX_COUNTER => counter.wrapping_add(1),
            _ => 0,
        };
        self.counter = Some(next);
        self.base_value.wrapping_add(next as u16)
    }
}

impl From<FanCommand> for Command {
    fn from(command: FanCommand) -> Self {
        Self::new(command.base_value())
    }
}

/// Fixed table mapping trigger-bit index to command.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CommandTable<const N: usize> {
    commands: [Command; N],
}

impl<const N: usize> CommandTable<N> {
    #[must_use]
    pub const fn new(commands: [Command; N]) -> Self {
        Self { commands }
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Command> {
        self.commands.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Command> {
        self.commands.get_mut(index)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }
}

/// The fan remote's four commands, all unsent.
pub type FanCommandTable = CommandTable<4>;

impl Default for FanCommandTable {
    fn default() -> Self {
        Self::new(FanCommand::ALL.map(Command::from))
    }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;

    #[test]
    fn first_send_uses_counter_zero() {
        let mut command = Command::new(0x5000);
        assert_eq!(command.counter(), None);
        assert_eq!(command.advance(), 0x5000);
        assert_eq!(command.counter(), Some(0));
    }

    #[test]
    fn counter_wraps_after_max() {
        let mut command = Command::from(FanCommand::SpeedUp);
        let payloads: [u16; 6] = core::array::from_fn(|_| command.advance());
        assert_eq!(payloads, [0x5054, 0x5055, 0x5056, 0x5057, 0x5054, 0x5055]);
    }

    #[test]
    fn payload_addition_wraps_at_16_bits() {
        let mut command = Command::new(0xFFFE);
        assert_eq!(command.advance(), 0xFFFE);
        assert_eq!(command.advance(), 0xFFFF);
        assert_eq!(command.advance(), 0x0000);
        assert_eq!(command.advance(), 0x0001);
    }

    #[test]
    fn fan_table_is_in_trigger_order() {
        let table = FanCommandTable::default();
        let bases: [u16; 4] =
            core::array::from_fn(|index| table.get(index).map_or(0, Command::base_value));
        assert_eq!(bases, [0x5000, 0x50FA, 0x5054, 0x50A8]);
        assert!(table.get(4).is_none());
    }

    #[test]
    fn counters_are_per_command() {
        let mut table = FanCommandTable::default();
        for _ in 0..3 {
            if let Some(command) = table.get_mut(0) {
                command.advance();
            }
        }
        assert_eq!(table.get(0).and_then(Command::counter), Some(2));
        assert_eq!(table.get(1).and_then(Command::counter), None);
    }
}
