pub mod time;

/// Generates a unique identifier for a run.
pub fn longid() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
