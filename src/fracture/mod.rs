//! Convex subdivision capability.
//!
//! Splits a convex piece by planes around an impact location. The fracture
//! pipeline only sees the [`Subdivider`] trait; [`ConvexBreaker`] is the
//! plane-cutting implementation.

mod breaker;

pub use breaker::{ConvexBreaker, FractureError, Piece, SubdivisionParams, Subdivider};
