#![doc = include_str!("../README.md")]

pub mod image_lists;
pub mod models;
pub mod term_lists;
