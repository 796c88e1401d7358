pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod error;
pub mod joypad;
pub mod ppu;
pub mod presenter;
pub mod render;

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate bitflags;
