pub mod client;

// Re-export for convenient access (e.g. `use crate::binance::BinanceClient`).
pub use client::BinanceClient;
