//! bayesmix math utilities.

pub mod math;

pub use math::combinatorial::TriangularMemoizer;
pub use math::density::*;
pub use math::sampling;
pub use math::stable::*;
