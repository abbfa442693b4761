//! Hash function implementations.

pub mod hash;
