//! Storage abstractions for the catalog service

pub mod models;

mod memory;
mod sqlite;

pub use memory::InMemoryStore;
pub use models::*;
pub use sqlite::SqliteStore;

use crate::error::ApiError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, ApiError>;

/// Trait for user accounts
pub trait UserStore: Send + Sync {
    /// Create a new user record
    fn create_user(&self, new: NewUser) -> StoreResult<User>;

    /// Get a user by ID
    fn get_user(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Get a user by exact username
    fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Get a user by exact email
    fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Get a user by username or email (login forms accept either)
    fn find_by_login(&self, login: &str) -> StoreResult<Option<User>>;

    /// List all users, newest first
    fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Apply a partial profile update and return the updated user
    fn update_profile(&self, id: UserId, update: ProfileUpdate) -> StoreResult<User>;

    /// Replace a user's role and return the updated user
    fn set_role(&self, id: UserId, role: Role) -> StoreResult<User>;

    /// Delete a user; cascades to their lists, their list entries, and the
    /// requests they authored, and nulls references they are a reviewer or
    /// title creator of
    fn delete_user(&self, id: UserId) -> StoreResult<()>;
}

/// Trait for the shared catalog of titles
pub trait TitleStore: Send + Sync {
    /// Create a title with the given creator recorded
    fn create_title(&self, new: NewTitle, creator: UserId) -> StoreResult<Title>;

    /// Get a title by ID
    fn get_title(&self, id: TitleId) -> StoreResult<Option<Title>>;

    /// List titles, optionally restricted to one kind, newest first
    fn list_titles(&self, kind: Option<TitleKind>) -> StoreResult<Vec<Title>>;

    /// List titles created by the given user, newest first
    fn list_titles_by_creator(&self, creator: UserId) -> StoreResult<Vec<Title>>;

    /// Merge a partial update into a title and return it
    fn update_title(&self, id: TitleId, patch: TitlePatch) -> StoreResult<Title>;

    /// Delete a title; cascades to every list entry referencing it
    fn delete_title(&self, id: TitleId) -> StoreResult<()>;
}

/// Trait for per-user personal lists and their memberships
pub trait ListStore: Send + Sync {
    /// Create any of the three fixed lists the user is missing; idempotent
    fn ensure_default_lists(&self, user: UserId) -> StoreResult<()>;

    /// All lists owned by the user, oldest first
    fn lists_for_user(&self, user: UserId) -> StoreResult<Vec<UserList>>;

    /// Resolve a list by its owner and kind
    fn find_list(&self, user: UserId, kind: ListKind) -> StoreResult<Option<UserList>>;

    /// Entries of a list in insertion order, titles loaded eagerly
    fn entries_for_list(&self, list: ListId) -> StoreResult<Vec<ListEntry>>;

    /// Add a title to a list; a duplicate (list, title) pair is a conflict
    fn add_entry(&self, list: ListId, title: TitleId) -> StoreResult<ListEntry>;

    /// Remove a title from a list; fails if the membership does not exist
    fn remove_entry(&self, list: ListId, title: TitleId) -> StoreResult<()>;
}

/// Trait for editor-elevation requests
pub trait RequestStore: Send + Sync {
    /// Insert a new pending request; fails if the user already has one pending
    fn create_request(&self, requester: UserId) -> StoreResult<EditorRequest>;

    /// Get a request by ID
    fn get_request(&self, id: RequestId) -> StoreResult<Option<EditorRequest>>;

    /// All requests authored by the user, newest first
    fn requests_by_user(&self, user: UserId) -> StoreResult<Vec<EditorRequest>>;

    /// All pending requests, oldest first (review order)
    fn pending_requests(&self) -> StoreResult<Vec<EditorRequest>>;

    /// Move a request from pending to the given terminal status, recording
    /// the reviewer and an optional reason. The transition is conditional on
    /// the request still being pending, so a raced or repeated call fails
    /// with `RequestNotPending` instead of double-processing.
    fn resolve_request(
        &self,
        id: RequestId,
        status: RequestStatus,
        reviewer: UserId,
        reason: Option<String>,
    ) -> StoreResult<EditorRequest>;
}

/// A backend providing every store the service needs
pub trait Store: UserStore + TitleStore + ListStore + RequestStore {}

impl<T: UserStore + TitleStore + ListStore + RequestStore> Store for T {}
