//! The ROM-resident monitor/kernel contract: a synthesized native ROM
//! image plus the jump-table hooks and the interactive monitor program
//! that backs it. The monitor is re-implemented natively in Rust, bound
//! to the jump-table ABI, rather than assembled from 6502 source.

pub mod editor;
pub mod hooks;
pub mod monitor;
pub mod rom_image;

pub use editor::ScreenEditor;
pub use monitor::Monitor;
