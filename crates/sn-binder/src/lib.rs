//! Symbol table and arena-context stack — spec §3.6, §3.7, §4.6, component C6.

pub mod arena_context;
pub mod symbol;
pub mod table;

pub use arena_context::{ArenaContext, AsValGuard, NativeGuard, PrivateGuard};
pub use symbol::{Symbol, SymbolKind};
pub use table::SymbolTable;
