//! Shared primitives: canonical addresses, fixed-point amounts, byte encoding, storage keys.

pub mod address;
pub mod amount;
pub mod encoding;
pub mod paths;
