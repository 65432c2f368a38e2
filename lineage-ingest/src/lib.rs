//! HTTP host that feeds scheduler execution events into a lineage graph.

pub mod config;
pub mod error;
pub mod locks;
pub mod seed;
pub mod server;

pub use config::Config;
pub use server::{router, AppState};
