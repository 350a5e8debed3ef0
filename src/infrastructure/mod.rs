//! Adapters implementing the domain ports.

pub mod gemini;
pub mod in_memory;
pub mod json_file;
pub mod local_state;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod supabase;
