use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::{
    FlowRunnerError, Result,
    common::Vars,
    runtime::ActionContext,
    workflow::{
        actions::{Action, ActionOutput, validate_config},
        consts::{VALUE_A_KEY, VALUE_B_KEY},
        node::NodeKind,
    },
};

use super::models::*;

#[derive(Debug, Clone)]
pub struct ConditionAction {
    operator: ConditionOperator,
    value_a: Option<Value>,
    value_b: Option<Value>,
}

impl ConditionAction {
    /// Evaluate the operator over both operands. `None` is an absent operand.
    pub fn evaluate(
        operator: &ConditionOperator,
        a: Option<&Value>,
        b: Option<&Value>,
    ) -> bool {
        match operator {
            ConditionOperator::Equals => loose_eq(a, b),
            ConditionOperator::StrictEquals => strict_eq(a, b),
            ConditionOperator::NotEquals => !loose_eq(a, b),
            ConditionOperator::GreaterThan => eval_cmp(a, b, |x, y| x > y),
            ConditionOperator::LessThan => eval_cmp(a, b, |x, y| x < y),
            ConditionOperator::GreaterOrEqual => eval_cmp(a, b, |x, y| x >= y),
            ConditionOperator::LessOrEqual => eval_cmp(a, b, |x, y| x <= y),
            ConditionOperator::Contains => match (a, b) {
                (Some(a), Some(b)) => to_js_string(a).contains(&to_js_string(b)),
                _ => false,
            },
            ConditionOperator::IsEmpty => is_empty(a),
            ConditionOperator::IsNotEmpty => !is_empty(a),
            ConditionOperator::IsTrue => matches_literal(a, true),
            ConditionOperator::IsFalse => matches_literal(a, false),
            ConditionOperator::Unknown(_) => false,
        }
    }
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(arr)) => arr.is_empty(),
        Some(Value::Object(obj)) => obj.is_empty(),
        _ => false,
    }
}

/// `true`, `"true"`, `1`, `"1"` and their false counterparts.
fn matches_literal(
    value: Option<&Value>,
    expected: bool,
) -> bool {
    let (word, digit_text, digit) = if expected { ("true", "1", 1.0) } else { ("false", "0", 0.0) };
    match value {
        Some(Value::Bool(b)) => *b == expected,
        Some(Value::String(s)) => s == word || s == digit_text,
        Some(Value::Number(n)) => n.as_f64() == Some(digit),
        _ => false,
    }
}

fn eval_cmp<F>(
    a: Option<&Value>,
    b: Option<&Value>,
    cmp: F,
) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    match (to_number(a), to_number(b)) {
        (Some(x), Some(y)) => cmp(x, y),
        _ => false,
    }
}

/// Numeric coercion; `None` stands for NaN.
fn to_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() { Some(0.0) } else { s.parse::<f64>().ok().filter(|f| !f.is_nan()) }
        }
        Value::Array(arr) if arr.is_empty() => Some(0.0),
        Value::Array(arr) if arr.len() == 1 => to_number(Some(&Value::String(to_js_string(&arr[0])))),
        _ => None,
    }
}

fn number_string(n: f64) -> String {
    if n == 0.0 {
        // covers -0
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

/// String coercion: arrays join with `,`, objects become `[object Object]`.
fn to_js_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.as_f64().map(number_string).unwrap_or_else(|| n.to_string()),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|v| match v {
                Value::Null => String::new(),
                v => to_js_string(v),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn strict_eq(
    a: Option<&Value>,
    b: Option<&Value>,
) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x.as_f64() == y.as_f64(),
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Abstract equality over JSON values; a missing operand behaves like `null`.
fn loose_eq(
    a: Option<&Value>,
    b: Option<&Value>,
) -> bool {
    let a = a.unwrap_or(&Value::Null);
    let b = b.unwrap_or(&Value::Null);

    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => a == b,
        (Value::Number(_), Value::String(_)) | (Value::String(_), Value::Number(_)) => match (to_number(Some(a)), to_number(Some(b))) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
        (Value::Bool(_), _) => loose_eq(to_number(Some(a)).map(Value::from).as_ref(), Some(b)),
        (_, Value::Bool(_)) => loose_eq(Some(a), to_number(Some(b)).map(Value::from).as_ref()),
        (Value::Array(_) | Value::Object(_), _) => loose_eq(Some(&Value::String(to_js_string(a))), Some(b)),
        (_, Value::Array(_) | Value::Object(_)) => loose_eq(Some(a), Some(&Value::String(to_js_string(b)))),
    }
}

#[async_trait]
impl Action for ConditionAction {
    fn create(config: &Vars) -> Result<Self> {
        validate_config(config, &Self::schema())?;
        let cfg: ConditionConfig = serde_json::from_value(config.clone().into()).map_err(|e| FlowRunnerError::Validation(format!("invalid condition config: {}", e)))?;

        Ok(ConditionAction {
            operator: ConditionOperator::parse(cfg.operator.as_deref().unwrap_or_default()),
            value_a: cfg.value_a.filter(|v| !v.is_null()),
            value_b: cfg.value_b.filter(|v| !v.is_null()),
        })
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "operator": { "type": ["string", "null"] }
            }
        })
    }

    fn action_type(&self) -> NodeKind {
        NodeKind::Condition
    }

    async fn run(
        &self,
        ctx: &ActionContext,
    ) -> Result<ActionOutput> {
        let a = ctx.inputs().value(VALUE_A_KEY).or(self.value_a.as_ref());
        let b = ctx.inputs().value(VALUE_B_KEY).or(self.value_b.as_ref());

        let result = Self::evaluate(&self.operator, a, b);
        debug!(nid = %ctx.nid(), operator = ?self.operator, result, "condition evaluated");

        Ok(ActionOutput::condition(result))
    }
}
