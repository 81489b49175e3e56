pub mod api;
pub mod catalog;
pub mod client;
pub mod config;
pub mod detail;
pub mod errors;
pub mod gate;
pub mod logging;
pub mod mock;
pub mod mutation;
pub mod pipeline;
pub mod session;
pub mod ui;

pub use client::Client;
pub use config::{CliOverrides, ClientConfig};
