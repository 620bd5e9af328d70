#![allow(dead_code)]

pub mod fixtures;
pub mod memory_handler;
pub mod shared_buffer;

pub use memory_handler::MemoryHandler;
pub use shared_buffer::{SharedBuf, read_output};
