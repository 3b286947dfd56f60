use std::fmt;

use serde_json::Value;

use crate::{
    Result,
    common::Vars,
    model::NodeModel,
    workflow::{
        actions::{Action, ApiAction, ConditionAction, ConstantAction, EmailAction, EndAction, GoogleCalendarAction, PassThroughAction, StartAction},
        consts::{TARGET_FIELD_KEY, VALUE_KEY},
    },
};

/// node id
pub type NodeId = String;

/// Closed set of node types the runner knows how to dispatch.
///
/// Unknown type tags parse into [`NodeKind::Other`] and are simulated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, strum::EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum NodeKind {
    Start,
    End,
    Constant,
    Condition,
    Branch,
    Join,
    ApiAction,
    EmailAction,
    GoogleCalendarAction,
    #[strum(default)]
    Other(String),
}

impl NodeKind {
    pub fn parse(tag: &str) -> Self {
        tag.parse().unwrap_or_else(|_| NodeKind::Other(tag.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Start => "start",
            NodeKind::End => "end",
            NodeKind::Constant => "constant",
            NodeKind::Condition => "condition",
            NodeKind::Branch => "branch",
            NodeKind::Join => "join",
            NodeKind::ApiAction => "apiAction",
            NodeKind::EmailAction => "emailAction",
            NodeKind::GoogleCalendarAction => "googleCalendarAction",
            NodeKind::Other(tag) => tag,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime node: the parts of a [`NodeModel`] the runner reads.
#[derive(Debug, Clone)]
pub struct Node {
    /// node id
    pub id: NodeId,
    /// node type
    pub kind: NodeKind,
    /// editor-supplied parameters, read-only to the runner
    pub config: Vars,
}

impl From<&NodeModel> for Node {
    fn from(model: &NodeModel) -> Self {
        Self {
            id: model.id.clone(),
            kind: NodeKind::parse(&model.node_type),
            config: Vars::from(model.config.clone()),
        }
    }
}

impl Node {
    /// The upstream-declared input name this node's value is routed into, if any.
    pub fn target_field(&self) -> Option<String> {
        self.config.get::<String>(TARGET_FIELD_KEY).filter(|f| !f.is_empty())
    }

    /// The literal `config.value`, if set.
    pub fn literal_value(&self) -> Option<&Value> {
        self.config.value(VALUE_KEY)
    }

    /// Builds the handler for this node. Config problems surface here as validation errors.
    pub fn create_action(&self) -> Result<Box<dyn Action>> {
        match &self.kind {
            NodeKind::Start => Ok(Box::new(StartAction::create(&self.config)?)),
            NodeKind::End => Ok(Box::new(EndAction::create(&self.config)?)),
            NodeKind::Constant => Ok(Box::new(ConstantAction::create(&self.config)?)),
            NodeKind::Condition => Ok(Box::new(ConditionAction::create(&self.config)?)),
            NodeKind::Branch => Ok(Box::new(PassThroughAction::branch())),
            NodeKind::Join => Ok(Box::new(PassThroughAction::join())),
            NodeKind::ApiAction => Ok(Box::new(ApiAction::create(&self.config)?)),
            NodeKind::EmailAction => Ok(Box::new(EmailAction::create(&self.config)?)),
            NodeKind::GoogleCalendarAction => Ok(Box::new(GoogleCalendarAction::create(&self.config)?)),
            NodeKind::Other(tag) => Ok(Box::new(PassThroughAction::simulated(tag))),
        }
    }
}
