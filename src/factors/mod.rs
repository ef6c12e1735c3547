//! Factors of a pose graph
//!
//! A factor scores a subset of the poses with a traced scalar error, so the graph loss and
//! its gradient come out of one pass through [`crate::autodiff`].

pub mod between_factor;

pub use between_factor::BetweenFactor;
