// src/display/mod.rs
//! Console output

pub mod terminal;

pub use terminal::ConsoleReporter;
