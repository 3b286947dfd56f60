use serde::Deserialize;
use serde_json::Value;

/// Comparison applied to `(valueA, valueB)`.
///
/// `equals`/`notEquals` use loose (coercing) equality, `strictEquals`
/// requires the same JSON type.
#[derive(Debug, Clone, PartialEq, Eq, strum::EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum ConditionOperator {
    Equals,
    StrictEquals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    Contains,
    IsEmpty,
    IsNotEmpty,
    IsTrue,
    IsFalse,
    #[strum(default)]
    Unknown(String),
}

impl ConditionOperator {
    pub fn parse(tag: &str) -> Self {
        tag.parse().unwrap_or_else(|_| ConditionOperator::Unknown(tag.to_string()))
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub(super) struct ConditionConfig {
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub value_a: Option<Value>,
    #[serde(default)]
    pub value_b: Option<Value>,
}
