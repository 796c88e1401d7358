#[path = "blarggcpu/mod.rs"]
mod blarggcpu;
