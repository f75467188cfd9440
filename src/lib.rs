pub mod aggregate;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod network;
pub mod pitch;
pub mod sample;
pub mod state;
pub mod table;
