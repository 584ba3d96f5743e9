//! Difficulty module - retargeting control law

mod controller;

pub use controller::*;
