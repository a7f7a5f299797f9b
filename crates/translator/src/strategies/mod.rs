mod graph_to_relational;
mod null_strategy;
mod relational_to_graph;

pub use graph_to_relational::GraphToRelational;
pub use null_strategy::NullStrategy;
pub use relational_to_graph::RelationalToGraph;
