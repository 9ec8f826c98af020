//! Inventory domain, persistence, real-time broadcasting and dashboard state.

pub mod context;
pub mod dashboard;
pub mod database;
pub mod domain;
pub mod memory;
pub mod realtime;

#[cfg(test)]
mod test;

mod uuids;

pub use uuids::TypedUuid;
