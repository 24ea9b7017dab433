//! Handle types and flags shared by the AST, binder, and checker.

use std::fmt;

bitflags::bitflags! {
    /// Direction of a channel type, matching Go's `ast.ChanDir`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChanDir: u8 {
        const SEND = 1 << 0;
        const RECV = 1 << 1;

        const BOTH = Self::SEND.bits() | Self::RECV.bits();
    }
}

/// Node ID for referencing AST nodes. Unique across all files of a package.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const INVALID: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The identity of a declared entity.
///
/// One `SymbolId` is minted per declaration by the binder. Two identifier
/// occurrences refer to the same variable exactly when they resolve to the
/// same `SymbolId`, whatever their spelling.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub const INVALID: SymbolId = SymbolId(u32::MAX);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Type ID for referencing entries in the checker's type table.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TypeId(pub u32);

impl TypeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Hands out node ids for one package. Each file's parser continues where
/// the previous one stopped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeIdAllocator {
    next: u32,
}

impl NodeIdAllocator {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn starting_at(next: u32) -> Self {
        Self { next }
    }

    #[inline]
    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// The number of ids handed out so far.
    pub fn count(&self) -> u32 {
        self.next
    }
}
