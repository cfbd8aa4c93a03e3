// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod config;
pub mod controller;
pub mod leaderboard;
pub mod logging;
pub mod runtime;
pub mod session;
pub mod ui;
