#![doc = include_str!("../README.md")]

pub mod image;
mod models;
pub mod text;
