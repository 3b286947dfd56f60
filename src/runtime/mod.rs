mod channel;
mod context;
mod sink;

pub use channel::{Channel, ChannelEvent, ChannelOptions};
pub use context::ActionContext;
pub use sink::{GraphStore, NodeUpdate, StatusSink};
