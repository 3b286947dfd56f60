pub mod actions;
pub mod consts;
pub mod edge;
pub mod node;
pub mod template;
mod workflow;

pub use node::NodeKind;
pub use workflow::Workflow;
