use num_traits::{One, PrimInt};

/// Trait implemented by flag enums declared with [`define_flag_bits!`].
///
/// The enum's discriminant (via `#[repr(u8)]`) is the bit index inside `Storage`.
pub trait FlagBit {
    type Storage: PrimInt;

    fn bit_index(&self) -> u8;

    fn mask(&self) -> Self::Storage {
        // NOTE: `bit_index()` must be < number of bits in `Storage`.
        Self::Storage::one() << (self.bit_index() as usize)
    }
}

/// A compact set of flag bits.
///
/// Copyable and comparable so it can live inside per-tile data without indirection.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FlagSet<T: PrimInt> {
    bits: T,
}

impl<T: PrimInt> FlagSet<T> {
    /// Build a set from a list of flags.
    pub fn of<U: FlagBit<Storage = T> + Copy>(flags: &[U]) -> Self {
        Self {
            bits: combined(flags),
        }
    }

    pub fn bits(&self) -> T {
        self.bits
    }

    pub fn contains<U: FlagBit<Storage = T>>(&self, flag: U) -> bool {
        (self.bits & flag.mask()) != T::zero()
    }

    /// True if at least one listed flag is set. An empty list never matches.
    pub fn contains_any<U: FlagBit<Storage = T> + Copy>(&self, flags: &[U]) -> bool {
        (self.bits & combined(flags)) != T::zero()
    }
}

fn combined<T: PrimInt, U: FlagBit<Storage = T> + Copy>(flags: &[U]) -> T {
    flags.iter().fold(T::zero(), |acc, f| acc | f.mask())
}

/// Declare a flag enum and implement [`FlagBit`] for it.
///
/// Example:
/// ```rust
/// shared::define_flag_bits!(DoorState, u8, {
///     Open,
///     Locked,
/// });
/// ```
#[macro_export]
macro_rules! define_flag_bits {
    ($name:ident, $storage:ty, { $($variant:ident),* $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $($variant),*
        }

        impl $crate::flags::FlagBit for $name {
            type Storage = $storage;

            fn bit_index(&self) -> u8 {
                *self as u8
            }
        }
    };
}
