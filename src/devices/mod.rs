pub mod bus;
pub mod cpu;
pub mod pia;
pub mod ram;
pub mod screen;

pub use bus::Bus;
pub use cpu::Cpu;
pub use pia::Pia;
pub use screen::Screen;
