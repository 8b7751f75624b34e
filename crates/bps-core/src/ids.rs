//! Typed identifiers for cases, resources, and activities.
//!
//! Each id is a `Copy + Ord + Hash` newtype over a dense index, so tables of
//! cases, resources, and activities are plain `Vec`s.  The inner integer is
//! `pub`; prefer [`index`](CaseId::index) when indexing.

use std::fmt;

/// Declare a typed id.  `label` is what `Display` prints before the number,
/// so log lines read `case 3` or `resource 0`.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty) => $label:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Reserved value that never names a real entry.
            pub const INVALID: $name = $name(<$inner>::MAX);

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, " {}"), self.0)
            }
        }

        /// Fails past the reserved `INVALID` value as well as on overflow.
        impl TryFrom<usize> for $name {
            type Error = crate::CoreError;

            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n)
                    .ok()
                    .map($name)
                    .filter(|id| id.is_valid())
                    .ok_or_else(|| crate::CoreError::Config(format!(
                        concat!($label, " index {} out of range"),
                        n
                    )))
            }
        }
    };
}

typed_id! {
    /// A case, numbered from zero in arrival order.
    pub struct CaseId(u32) => "case";
}

typed_id! {
    /// A resource.  Ids are dense from zero so the pool can be a plain `Vec`.
    pub struct ResourceId(u32) => "resource";
}

typed_id! {
    /// An activity registered in an [`ActivityRegistry`][crate::ActivityRegistry].
    pub struct ActivityId(u16) => "activity";
}
