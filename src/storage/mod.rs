pub mod engine;
pub mod file;
pub mod guarded;
pub mod memory;
pub mod notice;

pub use engine::{KeyValueStore, SharedStore};
pub use file::FileStore;
pub use guarded::GuardedStore;
pub use memory::MemoryStore;
pub use notice::{Notice, NoticeBoard, NoticeLevel};
