//! Domain model of the SAST online judge as seen from a contestant's client.

pub mod domain;

pub use domain::*;
