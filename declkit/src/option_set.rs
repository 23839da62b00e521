//! Set algebra shared by every generated option set.
//!
//! `option_set!` implements [`OptionSet`] by exposing the backing integer;
//! every set operation below is derived from that one conversion.

use std::fmt::Debug;
use std::hash::Hash;
use std::ops::{BitAnd, BitOr, BitXor, Not};

mod sealed {
    pub trait Sealed {}
}

/// Primitive integers that can store the bits of an option set.
pub trait RawBits:
    sealed::Sealed
    + Copy
    + Eq
    + Hash
    + Debug
    + Default
    + BitOr<Output = Self>
    + BitAnd<Output = Self>
    + BitXor<Output = Self>
    + Not<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// No bits set.
    const ZERO: Self;
}

macro_rules! raw_bits {
    ($($ty:ty),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl RawBits for $ty {
                const ZERO: Self = 0;
            }
        )*
    };
}

raw_bits!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize,
);

/// A set of independent options packed into one integer.
///
/// Each declared option occupies one bit, so single options and
/// combinations share one type: `Shipping::NEXT_DAY` is itself a set.
///
/// ```rust
/// use declkit::{OptionSet, option_set};
///
/// option_set! {
///     #[derive(Debug)]
///     struct Shipping {
///         #[repr(u8)]
///         enum Options { NextDay, SecondDay, Priority }
///     }
/// }
///
/// let mut chosen = Shipping::empty();
/// assert!(chosen.insert(Shipping::NEXT_DAY));
/// assert!(!chosen.insert(Shipping::NEXT_DAY));
/// assert!(chosen.is_subset(Shipping::all()));
/// assert_eq!(chosen.remove(Shipping::PRIORITY), None);
/// ```
pub trait OptionSet: Copy + Eq {
    /// The integer the bits are stored in.
    type RawValue: RawBits;

    /// The underlying bits.
    fn raw_value(&self) -> Self::RawValue;

    /// Reinterpret `raw_value` as a set. Undeclared bits are kept.
    fn from_raw_value(raw_value: Self::RawValue) -> Self;

    /// The set with no options.
    #[must_use]
    fn empty() -> Self {
        Self::from_raw_value(<Self::RawValue as RawBits>::ZERO)
    }

    /// Whether no option is set.
    fn is_empty(&self) -> bool {
        self.raw_value() == <Self::RawValue as RawBits>::ZERO
    }

    /// Options in either set.
    #[must_use]
    fn union(self, other: Self) -> Self {
        Self::from_raw_value(self.raw_value() | other.raw_value())
    }

    /// Options in both sets.
    #[must_use]
    fn intersection(self, other: Self) -> Self {
        Self::from_raw_value(self.raw_value() & other.raw_value())
    }

    /// Options in exactly one of the sets.
    #[must_use]
    fn symmetric_difference(self, other: Self) -> Self {
        Self::from_raw_value(self.raw_value() ^ other.raw_value())
    }

    /// Options in `self` but not in `other`.
    #[must_use]
    fn difference(self, other: Self) -> Self {
        Self::from_raw_value(self.raw_value() & !other.raw_value())
    }

    /// Whether every option in `member` is also in `self`.
    fn contains(&self, member: Self) -> bool {
        self.raw_value() & member.raw_value() == member.raw_value()
    }

    /// Whether the sets share no option.
    fn is_disjoint(&self, other: Self) -> bool {
        self.intersection(other).is_empty()
    }

    /// Whether every option in `self` is also in `other`.
    fn is_subset(&self, other: Self) -> bool {
        other.contains(*self)
    }

    /// Whether every option in `other` is also in `self`.
    fn is_superset(&self, other: Self) -> bool {
        self.contains(other)
    }

    /// Add `member`, returning `true` if it was not already fully present.
    fn insert(&mut self, member: Self) -> bool {
        let inserted = !self.contains(member);
        *self = self.union(member);
        inserted
    }

    /// Remove `member`, returning the options that were actually present.
    fn remove(&mut self, member: Self) -> Option<Self> {
        let present = self.intersection(member);
        if present.is_empty() {
            return None;
        }
        *self = self.difference(member);
        Some(present)
    }

    /// Add `member`, returning the options that were already present.
    fn update(&mut self, member: Self) -> Option<Self> {
        let present = self.intersection(member);
        *self = self.union(member);
        (!present.is_empty()).then_some(present)
    }
}
