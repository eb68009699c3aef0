//! Session state, configuration and the microgame pool.

pub mod config;
pub mod difficulty;
pub mod pool;
pub mod session;
