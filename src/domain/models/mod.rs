mod entity;
mod entity_record;
mod entity_type;
mod metadata;
mod persistence;
mod projection;

pub use entity::*;
pub use entity_record::*;
pub use entity_type::*;
pub use metadata::*;
pub use persistence::*;
pub use projection::*;

/// Current Unix time in seconds; the timestamp unit used across all stores.
pub fn current_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
