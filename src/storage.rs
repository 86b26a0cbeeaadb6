pub mod contract;
pub mod local;
pub mod memory;

pub use contract::{ChildEntry, ItemHandle, ParentRef, Storage};
pub use local::LocalStorage;
pub use memory::MemoryStorage;
