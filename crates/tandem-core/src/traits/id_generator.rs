/// Identifier source injected into the engine.
pub trait IdGenerator: Send + Sync {
    /// A fresh, unique id. `prefix` names the entity kind (e.g. `"contrib"`).
    fn next_id(&self, prefix: &str) -> String;
}

/// UUID v4 ids of the form `<prefix>-<uuid>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", uuid::Uuid::new_v4())
    }
}
