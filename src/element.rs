use std::fmt::{Debug, Display};

/**
 * All elements of the graph implement this trait. They are identified by their
 * index.
 */
pub trait Handle: Copy {
    /**
     * The index of the element.
     */
    fn index(&self) -> u32;
}

/**
 * Vertex handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VH {
    idx: u32,
}

/**
 * Edge handle. Edges are numbered in the order they are first discovered while
 * walking the faces of the input.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EH {
    idx: u32,
}

/**
 * Face handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FH {
    idx: u32,
}

macro_rules! impl_handle {
    ($name:ident, $label:literal) => {
        impl Handle for $name {
            fn index(&self) -> u32 {
                self.idx
            }
        }

        impl From<u32> for $name {
            fn from(idx: u32) -> Self {
                $name { idx }
            }
        }

        impl From<&u32> for $name {
            fn from(idx: &u32) -> Self {
                $name { idx: *idx }
            }
        }

        impl From<$name> for usize {
            fn from(h: $name) -> Self {
                h.idx as usize
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", $label, self.idx)
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", $label, self.idx)
            }
        }
    };
}

impl_handle!(VH, "VH");
impl_handle!(EH, "EH");
impl_handle!(FH, "FH");

impl VH {
    /// Order two vertices so the smaller index comes first. Undirected edges are
    /// always keyed by this canonical pair.
    pub fn canonical(a: VH, b: VH) -> (VH, VH) {
        if a <= b { (a, b) } else { (b, a) }
    }
}
