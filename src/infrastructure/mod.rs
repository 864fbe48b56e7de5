pub mod connections;
pub mod memory_cache;
pub mod notifier;
