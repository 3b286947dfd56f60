use std::collections::HashMap;

use serde_json::Value;

use crate::{
    common::Vars,
    workflow::{Workflow, node::NodeId},
};

/// Collects the values flowing into `nid` over its incoming edges.
///
/// Each upstream contributes its output from this run, else its literal
/// `config.value`, else the raw response it received earlier in this run.
/// Transient fields carried in the caller's snapshot are never read; a run
/// starts from a cleared graph. The key is the upstream's `targetField` when
/// set, otherwise the slot named by the edge's target handle. Later edges
/// overwrite earlier ones on the same key.
pub(crate) fn resolve(
    workflow: &Workflow,
    nid: &str,
    outputs: &HashMap<NodeId, Value>,
    responses: &HashMap<NodeId, Value>,
) -> Vars {
    let mut inputs = Vars::new();

    for edge in workflow.incoming_edges(nid) {
        let Some(upstream) = workflow.get_node(&edge.source) else {
            continue;
        };

        let value = outputs
            .get(&upstream.id)
            .filter(|v| !v.is_null())
            .or_else(|| upstream.literal_value())
            .or_else(|| responses.get(&upstream.id).filter(|v| !v.is_null()))
            .cloned()
            .unwrap_or(Value::Null);

        let key = upstream.target_field().unwrap_or_else(|| edge.input_slot().key().to_string());
        inputs.insert(key, value);
    }

    inputs
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{EdgeModel, NodeModel, WorkflowModel};

    fn workflow() -> Workflow {
        let mut cached = NodeModel::new("cached", "apiAction");
        cached.last_response = Some(json!({"from": "snapshot"}));

        let model = WorkflowModel::new(
            vec![
                NodeModel::new("a", "constant").with_config("value", 5),
                NodeModel::new("b", "constant").with_config("value", 3),
                NodeModel::new("title", "constant").with_config("value", "Standup").with_config("targetField", "summary"),
                cached,
                NodeModel::new("c", "condition"),
                NodeModel::new("cal", "googleCalendarAction"),
            ],
            vec![
                EdgeModel::new("e1", "a", "c").with_target_handle("input-a"),
                EdgeModel::new("e2", "b", "c").with_target_handle("input-b"),
                EdgeModel::new("e3", "title", "cal").with_target_handle("input-1"),
                EdgeModel::new("e4", "a", "cal").with_target_handle("start-input"),
                EdgeModel::new("e5", "cached", "cal"),
            ],
        );
        Workflow::from(&model)
    }

    #[test]
    fn test_handles_select_slots() {
        let inputs = resolve(&workflow(), "c", &HashMap::new(), &HashMap::new());
        assert_eq!(inputs.value("valueA"), Some(&json!(5)));
        assert_eq!(inputs.value("valueB"), Some(&json!(3)));
    }

    #[test]
    fn test_run_output_wins_over_literal() {
        let mut outputs = HashMap::new();
        outputs.insert("a".to_string(), json!(10));
        let inputs = resolve(&workflow(), "c", &outputs, &HashMap::new());
        assert_eq!(inputs.value("valueA"), Some(&json!(10)));
    }

    #[test]
    fn test_target_field_and_start_slot() {
        let inputs = resolve(&workflow(), "cal", &HashMap::new(), &HashMap::new());
        assert_eq!(inputs.value("summary"), Some(&json!("Standup")));
        assert_eq!(inputs.value("startDateTime"), Some(&json!(5)));
    }

    #[test]
    fn test_snapshot_last_response_is_ignored() {
        let inputs = resolve(&workflow(), "cal", &HashMap::new(), &HashMap::new());
        assert!(inputs.value("input").is_none());
    }

    #[test]
    fn test_response_from_this_run_is_last_fallback() {
        let mut outputs = HashMap::new();
        outputs.insert("cached".to_string(), Value::Null);
        let mut responses = HashMap::new();
        responses.insert("cached".to_string(), json!({"from": "this run"}));

        let inputs = resolve(&workflow(), "cal", &outputs, &responses);
        assert_eq!(inputs.value("input"), Some(&json!({"from": "this run"})));
    }

    #[test]
    fn test_later_edge_overwrites() {
        let model = WorkflowModel::new(
            vec![NodeModel::new("x", "constant").with_config("value", "first"), NodeModel::new("y", "constant").with_config("value", "second"), NodeModel::new("j", "join")],
            vec![EdgeModel::new("e1", "x", "j"), EdgeModel::new("e2", "y", "j")],
        );
        let inputs = resolve(&Workflow::from(&model), "j", &HashMap::new(), &HashMap::new());
        assert_eq!(inputs.value("input"), Some(&json!("second")));
        assert_eq!(inputs.len(), 1);
    }
}
