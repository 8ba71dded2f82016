// src/commands/mod.rs
pub mod init;

pub use init::{ensure_initialized, ensure_initialized_once, serverdir_root, InitReport};
