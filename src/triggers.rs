//! Per-poll trigger bitmask: bit `i` set means button channel `i` fired this poll.

use core::ops::{BitOr, BitOrAssign};

/// Bitmask of fired channels. Produced fresh every poll and never stored across polls.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Triggers(u8);

impl Triggers {
    /// How many channels one bitmask can carry.
    pub const CAPACITY: usize = u8::BITS as usize;

    pub const NONE: Self = Self(0);

    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Triggers with only `index` set. Out-of-range indexes give an empty mask.
    #[must_use]
    pub const fn single(index: usize) -> Self {
        if index < Self::CAPACITY {
            Self(1 << index)
        } else {
            Self::NONE
        }
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn contains(self, index: usize) -> bool {
        !Self::single(index).is_empty() && (self.0 & Self::single(index).0) != 0
    }

    pub const fn set(&mut self, index: usize) {
        self.0 |= Self::single(index).0;
    }

    /// Lowest set index, if any.
    #[must_use]
    pub const fn lowest(self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros() as usize)
        }
    }

    /// Clear every bit above `index`, keeping `index` and everything below it.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "index is below 7 here, so the shift and subtraction stay in range"
    )]
    #[must_use]
    pub const fn keep_through(self, index: usize) -> Self {
        if index.saturating_add(1) >= Self::CAPACITY {
            self
        } else {
            Self(self.0 & ((1u8 << (index + 1)) - 1))
        }
    }

    /// Set indexes in increasing order.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..Self::CAPACITY).filter(move |&index| self.contains(index))
    }
}

impl BitOr for Triggers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Triggers {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;

    #[test]
    fn lowest_picks_smallest_index() {
        assert_eq!(Triggers::NONE.lowest(), None);
        assert_eq!(Triggers::from_bits(0b0110).lowest(), Some(1));
        assert_eq!(Triggers::from_bits(0b1000_0000).lowest(), Some(7));
    }

    #[test]
    fn keep_through_clears_higher_bits() {
        let triggers = Triggers::from_bits(0b1111_0101);
        assert_eq!(triggers.keep_through(0).bits(), 0b0000_0001);
        assert_eq!(triggers.keep_through(2).bits(), 0b0000_0101);
        assert_eq!(triggers.keep_through(7), triggers);
        assert_eq!(triggers.keep_through(20), triggers);
    }

    #[test]
    fn out_of_range_index_is_ignored() {
        let mut triggers = Triggers::NONE;
        triggers.set(8);
        assert!(triggers.is_empty());
        assert!(!triggers.contains(8));
    }

    #[test]
    fn iter_yields_set_indexes_in_order() {
        let mut triggers = Triggers::single(5) | Triggers::single(1);
        triggers |= Triggers::single(3);
        let mut indexes = triggers.iter();
        assert_eq!(indexes.next(), Some(1));
        assert_eq!(indexes.next(), Some(3));
        assert_eq!(indexes.next(), Some(5));
        assert_eq!(indexes.next(), None);
    }
}
