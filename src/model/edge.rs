use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EdgeModel {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default)]
    pub animated: bool,
    /// editor-only fields carried through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EdgeModel {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            ..Default::default()
        }
    }

    pub fn with_source_handle(
        mut self,
        handle: impl Into<String>,
    ) -> Self {
        self.source_handle = Some(handle.into());
        self
    }

    pub fn with_target_handle(
        mut self,
        handle: impl Into<String>,
    ) -> Self {
        self.target_handle = Some(handle.into());
        self
    }
}
