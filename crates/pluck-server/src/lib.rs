//! # pluck-server
//!
//! HTTP front of the pluck gateway: request dispatch, response building and
//! the hyper serving loop. The `pluck` binary wires these to configuration.

pub mod gateway;
pub mod response;
pub mod server;

pub use gateway::Gateway;
pub use server::serve;
