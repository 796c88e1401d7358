#[path = "harte/mod.rs"]
mod harte;
