//! Reading practice engine: questions are revealed a character at a time,
//! the reader buzzes in, answers, and is scored. The binary in `main.rs` is
//! the terminal front end; everything it drives lives here so tests and
//! benchmarks can reach it.

pub mod app;
pub mod config;
pub mod engine;
pub mod event;
pub mod keyboard;
pub mod logging;
pub mod question;
pub mod session;
pub mod store;
pub mod ui;
