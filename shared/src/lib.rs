//! Names and sizes both sides of the device agree on.

pub mod constants;

pub use constants::{BUF_LENGTH, DEVICE_NAME, DEVICE_PATH};
