/// Errors from the attractor / A* path planner.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("no path found from {from} to {to}")]
    NoPath { from: String, to: String },

    #[error("search exceeded max depth {max_depth}")]
    MaxDepthExceeded { max_depth: usize },

    #[error("search exceeded max explored nodes {max_nodes}")]
    MaxNodesExceeded { max_nodes: usize },

    #[error("attractor not found: {0}")]
    AttractorNotFound(String),

    #[error("invalid attractor: {0}")]
    InvalidAttractor(String),
}
