//! REST access to the Kuru relay.

pub mod rest;

pub use rest::{KuruClient, OrderQuery};
