mod action;
mod models;

pub use action::ConditionAction;
