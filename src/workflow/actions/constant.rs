//! Constant nodes: a literal value, or a timestamp computed at dispatch time.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeDelta};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{FlowRunnerError, Result, common::Vars, runtime::ActionContext, workflow::node::NodeKind};

use super::{Action, ActionOutput, text_value, validate_config};

/// Minute-precision ISO format used for every computed timestamp.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

const DATETIME_VALUE_TYPE: &str = "datetime";

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DatetimeOption {
    #[default]
    #[serde(rename = "now")]
    Now,
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "tomorrow")]
    Tomorrow,
    #[serde(rename = "next_week")]
    NextWeek,
    #[serde(rename = "next_month")]
    NextMonth,
    #[serde(rename = "in_1_hour")]
    InOneHour,
    #[serde(rename = "in_2_hours")]
    InTwoHours,
    #[serde(rename = "in_30_min")]
    InThirtyMinutes,
    #[serde(rename = "end_of_day")]
    EndOfDay,
    #[serde(rename = "custom_offset")]
    CustomOffset,
    #[serde(rename = "fixed")]
    Fixed,
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OffsetUnit {
    #[default]
    Minutes,
    Hours,
    Days,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
struct ConstantConfig {
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    value_type: Option<String>,
    #[serde(default)]
    datetime_option: Option<DatetimeOption>,
    #[serde(default)]
    offset_amount: Option<Value>,
    #[serde(default)]
    offset_unit: Option<OffsetUnit>,
    #[serde(default)]
    datetime_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum ConstantValue {
    Literal(Value),
    Datetime {
        option: DatetimeOption,
        offset: TimeDelta,
        fixed: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct ConstantAction {
    value: ConstantValue,
}

impl ConstantAction {
    fn parse_offset(
        amount: Option<&Value>,
        unit: OffsetUnit,
    ) -> Result<TimeDelta> {
        let amount = match amount {
            None | Some(Value::Null) => 0,
            Some(Value::Number(n)) => n.as_f64().map(|f| f.trunc() as i64).unwrap_or(0),
            Some(Value::String(s)) if s.trim().is_empty() => 0,
            Some(Value::String(s)) => s.trim().parse::<f64>().map(|f| f.trunc() as i64).map_err(|_| FlowRunnerError::Validation(format!("Invalid offset amount '{}'", s)))?,
            Some(other) => return Err(FlowRunnerError::Validation(format!("Invalid offset amount '{}'", other))),
        };

        let delta = match unit {
            OffsetUnit::Minutes => TimeDelta::try_minutes(amount),
            OffsetUnit::Hours => TimeDelta::try_hours(amount),
            OffsetUnit::Days => TimeDelta::try_days(amount),
        };
        delta.ok_or_else(|| FlowRunnerError::Validation(format!("Offset amount {} is out of range", amount)))
    }

    fn parse_fixed(literal: &str) -> Result<NaiveDateTime> {
        let literal = literal.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(literal) {
            return Ok(dt.naive_local());
        }
        for format in [DATETIME_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(literal, format) {
                return Ok(dt);
            }
        }
        Err(FlowRunnerError::Validation(format!("Invalid fixed datetime '{}'", literal)))
    }

    /// Computes the timestamp for `option` relative to `now`.
    pub fn compute_datetime(
        option: DatetimeOption,
        offset: TimeDelta,
        fixed: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<NaiveDateTime> {
        let start_of_day = |d: NaiveDateTime| d.date().and_time(NaiveTime::MIN);
        let shift = |d: NaiveDateTime, delta: TimeDelta| d.checked_add_signed(delta).ok_or_else(|| FlowRunnerError::Validation("Computed datetime is out of range".to_string()));

        match option {
            DatetimeOption::Now => Ok(now),
            DatetimeOption::Today => Ok(start_of_day(now)),
            DatetimeOption::Tomorrow => shift(start_of_day(now), TimeDelta::days(1)),
            DatetimeOption::NextWeek => shift(now, TimeDelta::days(7)),
            DatetimeOption::NextMonth => shift(now, TimeDelta::days(30)),
            DatetimeOption::InOneHour => shift(now, TimeDelta::hours(1)),
            DatetimeOption::InTwoHours => shift(now, TimeDelta::hours(2)),
            DatetimeOption::InThirtyMinutes => shift(now, TimeDelta::minutes(30)),
            DatetimeOption::EndOfDay => shift(start_of_day(now), TimeDelta::hours(23) + TimeDelta::minutes(59)),
            DatetimeOption::CustomOffset => shift(now, offset),
            DatetimeOption::Fixed => {
                let literal = fixed.ok_or_else(|| FlowRunnerError::Validation("A fixed datetime value is required".to_string()))?;
                Self::parse_fixed(literal)
            }
        }
    }
}

#[async_trait]
impl Action for ConstantAction {
    fn create(config: &Vars) -> Result<Self> {
        validate_config(config, &Self::schema())?;
        let cfg: ConstantConfig = serde_json::from_value(config.clone().into()).map_err(|e| FlowRunnerError::Validation(format!("invalid constant config: {}", e)))?;

        let value = if cfg.value_type.as_deref() == Some(DATETIME_VALUE_TYPE) {
            let option = cfg.datetime_option.unwrap_or_default();
            let offset = if option == DatetimeOption::CustomOffset {
                Self::parse_offset(cfg.offset_amount.as_ref(), cfg.offset_unit.unwrap_or_default())?
            } else {
                TimeDelta::zero()
            };
            let fixed = cfg.datetime_value.filter(|v| !v.trim().is_empty()).or_else(|| text_value(cfg.value.as_ref()));

            ConstantValue::Datetime {
                option,
                offset,
                fixed,
            }
        } else {
            ConstantValue::Literal(cfg.value.unwrap_or(Value::Null))
        };

        Ok(ConstantAction {
            value,
        })
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "valueType": { "type": ["string", "null"] },
                "datetimeOption": {
                    "enum": ["now", "today", "tomorrow", "next_week", "next_month", "in_1_hour", "in_2_hours", "in_30_min", "end_of_day", "custom_offset", "fixed", null]
                },
                "offsetAmount": { "type": ["number", "string", "null"] },
                "offsetUnit": { "enum": ["minutes", "hours", "days", null] },
                "datetimeValue": { "type": ["string", "null"] }
            }
        })
    }

    fn action_type(&self) -> NodeKind {
        NodeKind::Constant
    }

    async fn run(
        &self,
        ctx: &ActionContext,
    ) -> Result<ActionOutput> {
        match &self.value {
            ConstantValue::Literal(value) => Ok(ActionOutput::success(value.clone())),
            ConstantValue::Datetime {
                option,
                offset,
                fixed,
            } => {
                let datetime = Self::compute_datetime(*option, *offset, fixed.as_deref(), ctx.now())?;
                Ok(ActionOutput::success(Value::String(datetime.format(DATETIME_FORMAT).to_string())))
            }
        }
    }
}
