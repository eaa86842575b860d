pub mod error;
pub mod flash;
pub mod memory;
pub mod image;
pub mod fixtures;

pub use error::{StorageError, Result};
pub use flash::FlashDump;
pub use memory::MemoryImage;
