//! Entry point wiring `tests/nestest/mod.rs` up as an actual Cargo integration test
//! binary, matching the layout used for `blarggcpu` and `harte` below it.

#[path = "nestest/mod.rs"]
mod nestest;
