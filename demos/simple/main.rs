use std::sync::Arc;

use flowrunner::{ChannelEvent, ChannelOptions, Config, GraphStore, RunnerBuilder, StatusEvent, WorkflowModel};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> flowrunner::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flowrunner=info"))).init();

    let config = Config::load_from_str(include_str!("./config.toml"))?;
    let model = WorkflowModel::from_json(include_str!("./workflow.json"))?;

    let store = Arc::new(GraphStore::new(model.clone()));
    let runner = RunnerBuilder::new().config(config).sink(store.clone()).build()?;

    let events = ChannelEvent::channel(runner.channel(), ChannelOptions::default())?;
    events.on_node(|e| {
        if let StatusEvent::Node {
            nid,
            status,
            ..
        } = e
        {
            println!("node {:<10} {}", nid, status.as_ref());
        }
    });
    events.on_error(|e| println!("failed: {:?}", e));

    let result = runner.run(&model, None).await?;
    println!("Execution path: {}", result.execution_path.join(" -> "));
    println!("Succeeded: {}", result.succeeded());

    let snapshot: serde_json::Value = serde_json::to_value(store.snapshot())?;
    println!("Graph: {:#}", snapshot);

    Ok(())
}
