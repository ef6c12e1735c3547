//! Problem-level components built on the manifold, autodiff and optimizer layers.

pub mod pose_graph;

pub use pose_graph::PoseGraph;
