//! Data models for catalog, list, and request storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's role, from least to most privileged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Editor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Editor => "EDITOR",
            Role::Admin => "ADMIN",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "USER" => Some(Role::User),
            "EDITOR" => Some(Role::Editor),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Avatar tag shown next to a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Avatar {
    Male,
    Female,
}

impl Avatar {
    pub fn as_str(&self) -> &'static str {
        match self {
            Avatar::Male => "male",
            Avatar::Female => "female",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Avatar::Male),
            "female" => Some(Avatar::Female),
            _ => None,
        }
    }
}

/// What kind of catalog entry a title is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TitleKind {
    Movie,
    Series,
}

impl TitleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TitleKind::Movie => "MOVIE",
            TitleKind::Series => "SERIES",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "MOVIE" => Some(TitleKind::Movie),
            "SERIES" => Some(TitleKind::Series),
            _ => None,
        }
    }
}

/// The three fixed personal list kinds every user owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ListKind {
    Watched,
    Continue,
    Wishlist,
}

/// All list kinds, in the order they are created for a new user
pub const LIST_KINDS: [ListKind; 3] = [ListKind::Watched, ListKind::Continue, ListKind::Wishlist];

impl ListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Watched => "WATCHED",
            ListKind::Continue => "CONTINUE",
            ListKind::Wishlist => "WISHLIST",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "WATCHED" => Some(ListKind::Watched),
            "CONTINUE" => Some(ListKind::Continue),
            "WISHLIST" => Some(ListKind::Wishlist),
            _ => None,
        }
    }
}

/// Lifecycle state of an editor-elevation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Rejected => "REJECTED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(RequestStatus::Pending),
            "APPROVED" => Some(RequestStatus::Approved),
            "REJECTED" => Some(RequestStatus::Rejected),
            _ => None,
        }
    }
}

/// Unique user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Unique catalog-entry identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TitleId(pub u64);

/// Unique personal-list identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListId(pub u64);

/// Unique list-membership identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub u64);

/// Unique editor-request identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

/// A user account
///
/// Never serialized directly; the routes map it to a sanitized profile
/// so the password hash stays out of responses.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<Avatar>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<Avatar>,
    pub role: Role,
}

/// Partial profile update; only `Some` fields are applied
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<Avatar>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.avatar.is_none()
    }
}

/// A catalog entry (one movie or series)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    pub id: TitleId,
    pub name: String,
    pub kind: TitleKind,
    pub description: Option<String>,
    pub poster_url: Option<String>,
    /// The user who added the entry; nulled out if that user is deleted
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a title
#[derive(Debug, Clone)]
pub struct NewTitle {
    pub name: String,
    pub kind: TitleKind,
    pub description: Option<String>,
    pub poster_url: Option<String>,
}

/// Partial title update; only `Some` fields are merged
#[derive(Debug, Clone, Default)]
pub struct TitlePatch {
    pub name: Option<String>,
    pub kind: Option<TitleKind>,
    pub description: Option<String>,
    pub poster_url: Option<String>,
}

/// One of a user's three fixed personal lists
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserList {
    pub id: ListId,
    pub user_id: UserId,
    pub kind: ListKind,
    pub created_at: DateTime<Utc>,
}

/// Membership of a title in a list, with the title loaded eagerly
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEntry {
    pub id: EntryId,
    pub list_id: ListId,
    pub title: Title,
    pub created_at: DateTime<Utc>,
}

/// A user's request to be elevated to the editor role
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorRequest {
    pub id: RequestId,
    pub requested_by: UserId,
    /// The admin who decided the request; null while pending, and nulled
    /// out again if that admin is later deleted
    pub reviewed_by: Option<UserId>,
    pub status: RequestStatus,
    pub reject_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
