//! Typed `u32` indices into the expression arena.
//!
//! Children are referenced by [`ExprId`] and argument lists by
//! [`ExprRange`], a window into the arena's shared list buffer.

use std::fmt;
use std::ops::Range;

macro_rules! arena_index {
    ($($(#[$meta:meta])* $name:ident;)*) => {$(
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    )*};
}

arena_index! {
    /// A node. Children always have smaller ids than their parent.
    ExprId;
    /// An entry in the constant pool.
    ConstId;
    /// An entry in the application table.
    ApplyId;
    /// Identity of a construct inside the registry that resolved it.
    ///
    /// Opaque outside the registry; kept on application nodes so tooling can
    /// ask which overload a node was built from.
    ConstructId;
}

/// Child list of an application: `len` ids starting at `start` in the
/// list buffer. Calls are capped at `u16::MAX` arguments by the parser.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[repr(C)]
pub struct ExprRange {
    pub start: u32,
    pub len: u16,
}

impl ExprRange {
    pub const EMPTY: ExprRange = ExprRange { start: 0, len: 0 };

    #[inline]
    pub const fn new(start: u32, len: u16) -> Self {
        ExprRange { start, len }
    }

    #[inline]
    pub const fn len(self) -> usize {
        self.len as usize
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn to_range(self) -> Range<usize> {
        let first = self.start as usize;
        first..first + self.len()
    }
}

impl fmt::Debug for ExprRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Range { start, end } = self.to_range();
        write!(f, "ExprRange({start}..{end})")
    }
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{ExprId, ExprRange};
    crate::static_assert_size!(ExprId, 4);
    crate::static_assert_size!(ExprRange, 8);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_index_debug() {
        assert_eq!(format!("{:?}", ExprId::new(3)), "ExprId(3)");
        assert_eq!(format!("{:?}", ConstId::new(2)), "ConstId(2)");
        assert_eq!(ConstructId::new(9).index(), 9);
        assert!(ExprId::new(1) < ExprId::new(2));
    }

    #[test]
    fn test_range_indices() {
        let range = ExprRange::new(4, 3);
        assert_eq!(range.to_range(), 4..7);
        assert_eq!(range.len(), 3);
        assert_eq!(format!("{range:?}"), "ExprRange(4..7)");
        assert!(ExprRange::EMPTY.is_empty());
    }
}
