/// Source handle followed when a condition evaluates to `true`.
pub const TRUE_SOURCE: &str = "true-source";
/// Source handle followed when a condition evaluates to `false`.
pub const FALSE_SOURCE: &str = "false-source";

pub const INPUT_A_HANDLE: &str = "input-a";
pub const INPUT_B_HANDLE: &str = "input-b";
pub const START_INPUT_HANDLE: &str = "start-input";
pub const END_INPUT_HANDLE: &str = "end-input";

pub const VALUE_A_KEY: &str = "valueA";
pub const VALUE_B_KEY: &str = "valueB";
pub const START_DATE_TIME_KEY: &str = "startDateTime";
pub const END_DATE_TIME_KEY: &str = "endDateTime";
pub const INPUT_KEY: &str = "input";

/// Upstream config key that routes a value into a named input of the downstream node.
pub const TARGET_FIELD_KEY: &str = "targetField";
/// Upstream config key holding a literal value.
pub const VALUE_KEY: &str = "value";
