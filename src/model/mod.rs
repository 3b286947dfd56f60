mod edge;
mod node;
mod workflow;

pub use edge::EdgeModel;
pub use node::{NodeModel, NodeStatus};
pub use workflow::WorkflowModel;
