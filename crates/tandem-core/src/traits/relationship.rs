use crate::models::ids::UserId;
use crate::models::permission::PermissionScope;

/// Source of truth for whether two users are connected and what they share.
///
/// The relationship handshake itself lives outside the engine; this trait
/// only exposes its outcome.
pub trait RelationshipProvider: Send + Sync {
    /// True when `a` and `b` have an active connection. Must be symmetric.
    fn is_active_connection(&self, a: &UserId, b: &UserId) -> bool;

    /// What `grantor` allows `grantee` to do, or `None` when there is no
    /// connection between them.
    fn permission_scope(&self, grantor: &UserId, grantee: &UserId) -> Option<PermissionScope>;

    /// Display name recorded on versions. Defaults to none, in which case the
    /// engine falls back to the raw user id.
    fn display_name(&self, _user: &UserId) -> Option<String> {
        None
    }
}
