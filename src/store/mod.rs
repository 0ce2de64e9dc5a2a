pub mod memory;

pub use memory::MemoryStore;

/// Key holding the final score, serialized as decimal text.
pub const FINAL_SCORE_KEY: &str = "finalScore";
/// Key holding the capture log, serialized as a JSON array of `{image, label}`.
pub const CAPTURED_POSES_KEY: &str = "capturedPoses";

/// Key/value store scoped to one browsing session. The only channel across page transitions.
pub trait ResultStore: Send + Sync {
    /// Stores `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: String);
    fn get(&self, key: &str) -> Option<String>;
    fn clear(&self);
}
