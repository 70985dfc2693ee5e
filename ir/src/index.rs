//! The six distinct handle types used throughout the IR. Each is a
//! newtype around a dense `u32` that implements [`index_vec::Idx`], so that
//! an `IndexVec`/`IndexSlice` can be indexed by it directly and so that a
//! `NodeIndex` can never be accidentally used where a `LocalIdx` (or any
//! other handle kind) was expected — the compiler rejects the mix-up.
//!
//! Every handle type reserves `u32::MAX` as its "null" sentinel, matching
//! the external contract in the spec's reserved-handle-values section.

use std::fmt;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        pub struct $name(u32);

        impl $name {
            /// The reserved sentinel meaning "absent".
            pub const NULL: $name = $name(u32::MAX);

            #[inline]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            pub const fn is_null(self) -> bool {
                self.0 == u32::MAX
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::NULL
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_null() {
                    write!(f, concat!(stringify!($name), "(null)"))
                } else {
                    write!(f, concat!(stringify!($name), "({})"), self.0)
                }
            }
        }

        impl index_vec::Idx for $name {
            #[inline]
            fn from_usize(idx: usize) -> Self {
                assert!(idx < u32::MAX as usize, "{} index overflowed u32", stringify!($name));
                $name(idx as u32)
            }

            #[inline]
            fn index(self) -> usize {
                debug_assert!(!self.is_null(), "attempted to use the null {} as an index", stringify!($name));
                self.0 as usize
            }
        }
    };
}

define_handle!(
    /// Identifies a single emitted [`crate::node::Node`] within a function's
    /// node pool.
    NodeIndex
);
define_handle!(
    /// Identifies a declared local (including parameters) within a function.
    LocalIdx
);
define_handle!(
    /// Identifies a basic block within a function.
    BlockIndex
);
define_handle!(
    /// Identifies a parameter. Defined to equal the parameter's `LocalIdx`
    /// at insertion time (`add_param` assigns `ParamIdx::new` the same raw
    /// value the about-to-be-created local will get), not an independent
    /// parameter-list counter.
    ParamIdx
);
define_handle!(
    /// Identifies an entry in a function's string literal table.
    StringIdx
);
define_handle!(
    /// Identifies a module-scoped [`crate::local::Global`].
    GlobalIdx
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_max_and_distinguishable() {
        assert!(NodeIndex::NULL.is_null());
        assert_eq!(NodeIndex::NULL.raw(), u32::MAX);
        assert!(!NodeIndex::new(0).is_null());
    }

    #[test]
    fn handles_are_dense_and_ordered() {
        let a = BlockIndex::new(0);
        let b = BlockIndex::new(1);
        assert!(a < b);
    }
}
