//! Stock Movements

pub(crate) mod create;
pub(crate) mod errors;
