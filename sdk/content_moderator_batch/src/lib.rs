#![doc = include_str!("../README.md")]

pub mod calls;
pub mod error;
pub mod limiter;
pub mod records;
pub mod submitter;

pub use error::BatchError;
