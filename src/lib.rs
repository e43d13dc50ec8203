#[macro_use]
extern crate bitflags;

pub mod devices;
pub mod error;
pub mod filestore;
pub mod kernel;
pub mod machine;
pub mod reset;
pub mod rom;

pub use devices::{Bus, Cpu};
pub use error::CoreError;
pub use filestore::FileStore;
pub use machine::Machine;
pub use rom::RomImage;
