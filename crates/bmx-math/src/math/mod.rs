//! Core math modules.

pub mod combinatorial;
pub mod density;
pub mod sampling;
pub mod stable;
