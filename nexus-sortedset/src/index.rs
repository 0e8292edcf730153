//! Node handles with a sentinel "none" value.
//!
//! Skip-list nodes link to each other through integer handles into the node
//! arena. A reserved sentinel (`MAX` of the integer type) stands in for a
//! missing link, so a forward or backward link costs one integer instead of
//! an `Option<Idx>`.

/// A copyable node handle with a sentinel "none" value.
///
/// The handle width bounds how many nodes a list can hold: every value
/// below the sentinel is a usable slot, so a `u16` list holds at most
/// 65 535 members.
///
/// # Example
///
/// ```
/// use nexus_sortedset::Index;
///
/// assert!(5u32.is_some());
/// assert!(u32::NONE.is_none());
/// assert_eq!(u8::CAPACITY, 255);
///
/// assert_eq!(u8::from_slot(254), Some(254));
/// assert_eq!(u8::from_slot(255), None);
/// ```
pub trait Index: Copy + Eq + core::fmt::Debug {
    /// Sentinel for "no node": end of a level, or the head when used as a
    /// predecessor. Never handed out by the arena.
    const NONE: Self;

    /// Number of distinct slots a handle can address.
    const CAPACITY: usize;

    /// Returns `true` if this is the sentinel.
    #[inline]
    fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Returns `true` if this refers to a slot.
    #[inline]
    fn is_some(self) -> bool {
        self != Self::NONE
    }

    /// Slot position this handle addresses.
    fn slot(self) -> usize;

    /// Handle for slot `slot`, or `None` if it collides with the sentinel
    /// or does not fit the integer type.
    fn from_slot(slot: usize) -> Option<Self>;
}

macro_rules! unsigned_handle {
    ($($ty:ty),*) => {$(
        impl Index for $ty {
            const NONE: Self = <$ty>::MAX;
            const CAPACITY: usize = if (<$ty>::MAX as u128) < (usize::MAX as u128) {
                <$ty>::MAX as usize
            } else {
                usize::MAX
            };

            #[inline]
            fn slot(self) -> usize {
                self as usize
            }

            #[inline]
            fn from_slot(slot: usize) -> Option<Self> {
                <$ty>::try_from(slot).ok().filter(|&idx| idx != Self::NONE)
            }
        }
    )*};
}

unsigned_handle!(u8, u16, u32, u64, usize);
