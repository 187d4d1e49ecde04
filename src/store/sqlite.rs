//! SQLite-based storage implementation

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{
    Avatar, EditorRequest, EntryId, ListEntry, ListId, ListKind, ListStore, NewTitle, NewUser,
    ProfileUpdate, RequestId, RequestStatus, RequestStore, Role, StoreResult, Title, TitleId,
    TitleKind, TitlePatch, TitleStore, User, UserId, UserList, UserStore, LIST_KINDS,
};
use crate::error::ApiError;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// SQLite-based store implementing all four store traits
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path
    pub fn open(path: &str) -> Result<Self, ApiError> {
        let conn = Connection::open(path).map_err(|e| ApiError::Internal(e.to_string()))?;

        // Cascades and SET NULL actions depend on this pragma
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Self::migrate(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run database migrations
    fn migrate(conn: &Connection) -> Result<(), ApiError> {
        let current_version = Self::get_schema_version(conn)?;

        if current_version < SCHEMA_VERSION {
            tracing::info!(
                current = current_version,
                target = SCHEMA_VERSION,
                "Running database migrations"
            );

            if current_version < 1 {
                Self::migrate_v1(conn)?;
            }

            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )
            .map_err(|e| ApiError::Internal(e.to_string()))?;

            tracing::info!("Database migrations complete");
        }

        Ok(())
    }

    /// Get current schema version (0 if no schema exists)
    fn get_schema_version(conn: &Connection) -> Result<i32, ApiError> {
        let table_exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
                [],
                |row| row.get(0),
            )
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        if !table_exists {
            return Ok(0);
        }

        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
            row.get::<_, Option<i32>>(0).map(|v| v.unwrap_or(0))
        })
        .map_err(|e| ApiError::Internal(e.to_string()))
    }

    /// Migration to version 1: initial schema
    fn migrate_v1(conn: &Connection) -> Result<(), ApiError> {
        conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- Users
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                first_name TEXT,
                last_name TEXT,
                avatar TEXT,
                role TEXT NOT NULL DEFAULT 'USER',
                created_at TEXT NOT NULL
            );

            -- Catalog entries; the creator reference survives user deletion as NULL
            CREATE TABLE IF NOT EXISTS titles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                kind TEXT NOT NULL,
                description TEXT,
                poster_url TEXT,
                created_by INTEGER REFERENCES users(id) ON DELETE SET NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Personal lists, one per (user, kind)
            CREATE TABLE IF NOT EXISTS user_lists (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                kind TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (user_id, kind)
            );

            -- List memberships, unique per (list, title)
            CREATE TABLE IF NOT EXISTS list_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                list_id INTEGER NOT NULL REFERENCES user_lists(id) ON DELETE CASCADE,
                title_id INTEGER NOT NULL REFERENCES titles(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL,
                UNIQUE (list_id, title_id)
            );
            CREATE INDEX IF NOT EXISTS idx_list_entries_list ON list_entries(list_id);

            -- Editor-elevation requests
            CREATE TABLE IF NOT EXISTS editor_requests (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                requested_by INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                reviewed_by INTEGER REFERENCES users(id) ON DELETE SET NULL,
                status TEXT NOT NULL DEFAULT 'PENDING',
                reject_reason TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            -- At most one pending request per user
            CREATE UNIQUE INDEX IF NOT EXISTS idx_requests_one_pending
                ON editor_requests(requested_by) WHERE status = 'PENDING';
            "#,
        )
        .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(())
    }
}

fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Map a row of `id, username, email, password_hash, first_name, last_name,
/// avatar, role, created_at` to a User
fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let id: i64 = row.get(0)?;
    let username: String = row.get(1)?;
    let email: String = row.get(2)?;
    let password_hash: String = row.get(3)?;
    let first_name: Option<String> = row.get(4)?;
    let last_name: Option<String> = row.get(5)?;
    let avatar: Option<String> = row.get(6)?;
    let role: String = row.get(7)?;
    let created_at: String = row.get(8)?;
    Ok(User {
        id: UserId(id as u64),
        username,
        email,
        password_hash,
        first_name,
        last_name,
        avatar: avatar.as_deref().and_then(Avatar::from_str),
        role: Role::from_str(&role).unwrap_or(Role::User),
        created_at: parse_ts(&created_at),
    })
}

/// Map columns starting at `base` in the order `id, name, kind, description,
/// poster_url, created_by, created_at, updated_at` to a Title
fn title_from_row(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<Title> {
    let id: i64 = row.get(base)?;
    let name: String = row.get(base + 1)?;
    let kind: String = row.get(base + 2)?;
    let description: Option<String> = row.get(base + 3)?;
    let poster_url: Option<String> = row.get(base + 4)?;
    let created_by: Option<i64> = row.get(base + 5)?;
    let created_at: String = row.get(base + 6)?;
    let updated_at: String = row.get(base + 7)?;
    Ok(Title {
        id: TitleId(id as u64),
        name,
        kind: TitleKind::from_str(&kind).unwrap_or(TitleKind::Movie),
        description,
        poster_url,
        created_by: created_by.map(|id| UserId(id as u64)),
        created_at: parse_ts(&created_at),
        updated_at: parse_ts(&updated_at),
    })
}

/// Map a row of `id, requested_by, reviewed_by, status, reject_reason,
/// created_at, updated_at` to an EditorRequest
fn request_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EditorRequest> {
    let id: i64 = row.get(0)?;
    let requested_by: i64 = row.get(1)?;
    let reviewed_by: Option<i64> = row.get(2)?;
    let status: String = row.get(3)?;
    let reject_reason: Option<String> = row.get(4)?;
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;
    Ok(EditorRequest {
        id: RequestId(id as u64),
        requested_by: UserId(requested_by as u64),
        reviewed_by: reviewed_by.map(|id| UserId(id as u64)),
        status: RequestStatus::from_str(&status).unwrap_or(RequestStatus::Pending),
        reject_reason,
        created_at: parse_ts(&created_at),
        updated_at: parse_ts(&updated_at),
    })
}

impl UserStore for SqliteStore {
    fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO users (username, email, password_hash, first_name, last_name, avatar, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                new.username,
                new.email,
                new.password_hash,
                new.first_name,
                new.last_name,
                new.avatar.map(|a| a.as_str()),
                new.role.as_str(),
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| {
            if let rusqlite::Error::SqliteFailure(ref err, ref msg) = e {
                if err.code == rusqlite::ErrorCode::ConstraintViolation {
                    let msg = msg.as_deref().unwrap_or("");
                    if msg.contains("users.username") {
                        return ApiError::UsernameTaken;
                    }
                    if msg.contains("users.email") {
                        return ApiError::EmailTaken;
                    }
                }
            }
            ApiError::Internal(e.to_string())
        })?;

        let id = UserId(conn.last_insert_rowid() as u64);
        Ok(User {
            id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            first_name: new.first_name,
            last_name: new.last_name,
            avatar: new.avatar,
            role: new.role,
            created_at: now,
        })
    }

    fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, username, email, password_hash, first_name, last_name, avatar, role, created_at
             FROM users WHERE id = ?1",
            params![id.0 as i64],
            user_from_row,
        )
        .optional()
        .map_err(|e| ApiError::Internal(e.to_string()))
    }

    fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, username, email, password_hash, first_name, last_name, avatar, role, created_at
             FROM users WHERE username = ?1",
            params![username],
            user_from_row,
        )
        .optional()
        .map_err(|e| ApiError::Internal(e.to_string()))
    }

    fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, username, email, password_hash, first_name, last_name, avatar, role, created_at
             FROM users WHERE email = ?1",
            params![email],
            user_from_row,
        )
        .optional()
        .map_err(|e| ApiError::Internal(e.to_string()))
    }

    fn find_by_login(&self, login: &str) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, username, email, password_hash, first_name, last_name, avatar, role, created_at
             FROM users WHERE username = ?1 OR email = ?1",
            params![login],
            user_from_row,
        )
        .optional()
        .map_err(|e| ApiError::Internal(e.to_string()))
    }

    fn list_users(&self) -> StoreResult<Vec<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, username, email, password_hash, first_name, last_name, avatar, role, created_at
                 FROM users ORDER BY created_at DESC, id DESC",
            )
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        let users = stmt
            .query_map([], user_from_row)
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(users)
    }

    fn update_profile(&self, id: UserId, update: ProfileUpdate) -> StoreResult<User> {
        {
            let conn = self.conn.lock().unwrap();
            let rows_affected = conn
                .execute(
                    "UPDATE users SET
                        first_name = COALESCE(?1, first_name),
                        last_name = COALESCE(?2, last_name),
                        avatar = COALESCE(?3, avatar)
                     WHERE id = ?4",
                    params![
                        update.first_name,
                        update.last_name,
                        update.avatar.map(|a| a.as_str()),
                        id.0 as i64,
                    ],
                )
                .map_err(|e| ApiError::Internal(e.to_string()))?;

            if rows_affected == 0 {
                return Err(ApiError::UserNotFound);
            }
        }

        self.get_user(id)?.ok_or(ApiError::UserNotFound)
    }

    fn set_role(&self, id: UserId, role: Role) -> StoreResult<User> {
        {
            let conn = self.conn.lock().unwrap();
            let rows_affected = conn
                .execute(
                    "UPDATE users SET role = ?1 WHERE id = ?2",
                    params![role.as_str(), id.0 as i64],
                )
                .map_err(|e| ApiError::Internal(e.to_string()))?;

            if rows_affected == 0 {
                return Err(ApiError::UserNotFound);
            }
        }

        self.get_user(id)?.ok_or(ApiError::UserNotFound)
    }

    fn delete_user(&self, id: UserId) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        // Foreign keys handle the rest: lists and authored requests cascade,
        // reviewed_by and titles.created_by become NULL
        let rows_affected = conn
            .execute("DELETE FROM users WHERE id = ?1", params![id.0 as i64])
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        if rows_affected == 0 {
            return Err(ApiError::UserNotFound);
        }

        Ok(())
    }
}

impl TitleStore for SqliteStore {
    fn create_title(&self, new: NewTitle, creator: UserId) -> StoreResult<Title> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO titles (name, kind, description, poster_url, created_by, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                new.name,
                new.kind.as_str(),
                new.description,
                new.poster_url,
                creator.0 as i64,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| ApiError::Internal(e.to_string()))?;

        let id = TitleId(conn.last_insert_rowid() as u64);
        Ok(Title {
            id,
            name: new.name,
            kind: new.kind,
            description: new.description,
            poster_url: new.poster_url,
            created_by: Some(creator),
            created_at: now,
            updated_at: now,
        })
    }

    fn get_title(&self, id: TitleId) -> StoreResult<Option<Title>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, name, kind, description, poster_url, created_by, created_at, updated_at
             FROM titles WHERE id = ?1",
            params![id.0 as i64],
            |row| title_from_row(row, 0),
        )
        .optional()
        .map_err(|e| ApiError::Internal(e.to_string()))
    }

    fn list_titles(&self, kind: Option<TitleKind>) -> StoreResult<Vec<Title>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, name, kind, description, poster_url, created_by, created_at, updated_at
                 FROM titles
                 WHERE ?1 IS NULL OR kind = ?1
                 ORDER BY created_at DESC, id DESC",
            )
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        let titles = stmt
            .query_map(params![kind.map(|k| k.as_str())], |row| {
                title_from_row(row, 0)
            })
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(titles)
    }

    fn list_titles_by_creator(&self, creator: UserId) -> StoreResult<Vec<Title>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, name, kind, description, poster_url, created_by, created_at, updated_at
                 FROM titles WHERE created_by = ?1
                 ORDER BY created_at DESC, id DESC",
            )
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        let titles = stmt
            .query_map(params![creator.0 as i64], |row| title_from_row(row, 0))
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(titles)
    }

    fn update_title(&self, id: TitleId, patch: TitlePatch) -> StoreResult<Title> {
        let conn = self.conn.lock().unwrap();

        let existing = conn
            .query_row(
                "SELECT id, name, kind, description, poster_url, created_by, created_at, updated_at
                 FROM titles WHERE id = ?1",
                params![id.0 as i64],
                |row| title_from_row(row, 0),
            )
            .optional()
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        let mut title = existing.ok_or(ApiError::TitleNotFound)?;
        if let Some(name) = patch.name {
            title.name = name;
        }
        if let Some(kind) = patch.kind {
            title.kind = kind;
        }
        if let Some(description) = patch.description {
            title.description = Some(description);
        }
        if let Some(poster_url) = patch.poster_url {
            title.poster_url = Some(poster_url);
        }
        title.updated_at = Utc::now();

        conn.execute(
            "UPDATE titles SET name = ?1, kind = ?2, description = ?3, poster_url = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                title.name,
                title.kind.as_str(),
                title.description,
                title.poster_url,
                title.updated_at.to_rfc3339(),
                id.0 as i64,
            ],
        )
        .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(title)
    }

    fn delete_title(&self, id: TitleId) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        // List entries referencing the title cascade away
        let rows_affected = conn
            .execute("DELETE FROM titles WHERE id = ?1", params![id.0 as i64])
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        if rows_affected == 0 {
            return Err(ApiError::TitleNotFound);
        }

        Ok(())
    }
}

impl ListStore for SqliteStore {
    fn ensure_default_lists(&self, user: UserId) -> StoreResult<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        // INSERT OR IGNORE against UNIQUE(user_id, kind) makes this a
        // constraint-backed top-up of whatever kinds are missing
        for kind in LIST_KINDS {
            tx.execute(
                "INSERT OR IGNORE INTO user_lists (user_id, kind, created_at) VALUES (?1, ?2, ?3)",
                params![user.0 as i64, kind.as_str(), Utc::now().to_rfc3339()],
            )
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        }

        tx.commit().map_err(|e| ApiError::Internal(e.to_string()))
    }

    fn lists_for_user(&self, user: UserId) -> StoreResult<Vec<UserList>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, kind, created_at FROM user_lists
                 WHERE user_id = ?1 ORDER BY created_at ASC, id ASC",
            )
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        let lists = stmt
            .query_map(params![user.0 as i64], |row| {
                let id: i64 = row.get(0)?;
                let user_id: i64 = row.get(1)?;
                let kind: String = row.get(2)?;
                let created_at: String = row.get(3)?;
                Ok(UserList {
                    id: ListId(id as u64),
                    user_id: UserId(user_id as u64),
                    kind: ListKind::from_str(&kind).unwrap_or(ListKind::Watched),
                    created_at: parse_ts(&created_at),
                })
            })
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(lists)
    }

    fn find_list(&self, user: UserId, kind: ListKind) -> StoreResult<Option<UserList>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, user_id, kind, created_at FROM user_lists
             WHERE user_id = ?1 AND kind = ?2",
            params![user.0 as i64, kind.as_str()],
            |row| {
                let id: i64 = row.get(0)?;
                let user_id: i64 = row.get(1)?;
                let kind: String = row.get(2)?;
                let created_at: String = row.get(3)?;
                Ok(UserList {
                    id: ListId(id as u64),
                    user_id: UserId(user_id as u64),
                    kind: ListKind::from_str(&kind).unwrap_or(ListKind::Watched),
                    created_at: parse_ts(&created_at),
                })
            },
        )
        .optional()
        .map_err(|e| ApiError::Internal(e.to_string()))
    }

    fn entries_for_list(&self, list: ListId) -> StoreResult<Vec<ListEntry>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT e.id, e.list_id, e.created_at,
                        t.id, t.name, t.kind, t.description, t.poster_url, t.created_by, t.created_at, t.updated_at
                 FROM list_entries e
                 JOIN titles t ON t.id = e.title_id
                 WHERE e.list_id = ?1
                 ORDER BY e.created_at ASC, e.id ASC",
            )
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        let entries = stmt
            .query_map(params![list.0 as i64], |row| {
                let id: i64 = row.get(0)?;
                let list_id: i64 = row.get(1)?;
                let created_at: String = row.get(2)?;
                Ok(ListEntry {
                    id: EntryId(id as u64),
                    list_id: ListId(list_id as u64),
                    title: title_from_row(row, 3)?,
                    created_at: parse_ts(&created_at),
                })
            })
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(entries)
    }

    fn add_entry(&self, list: ListId, title: TitleId) -> StoreResult<ListEntry> {
        let conn = self.conn.lock().unwrap();

        let title_record = conn
            .query_row(
                "SELECT id, name, kind, description, poster_url, created_by, created_at, updated_at
                 FROM titles WHERE id = ?1",
                params![title.0 as i64],
                |row| title_from_row(row, 0),
            )
            .optional()
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .ok_or(ApiError::TitleNotFound)?;

        let now = Utc::now();
        conn.execute(
            "INSERT INTO list_entries (list_id, title_id, created_at) VALUES (?1, ?2, ?3)",
            params![list.0 as i64, title.0 as i64, now.to_rfc3339()],
        )
        .map_err(|e| {
            if let rusqlite::Error::SqliteFailure(ref err, ref msg) = e {
                if err.code == rusqlite::ErrorCode::ConstraintViolation
                    && msg.as_deref().unwrap_or("").contains("UNIQUE")
                {
                    return ApiError::AlreadyInList;
                }
            }
            ApiError::Internal(e.to_string())
        })?;

        Ok(ListEntry {
            id: EntryId(conn.last_insert_rowid() as u64),
            list_id: list,
            title: title_record,
            created_at: now,
        })
    }

    fn remove_entry(&self, list: ListId, title: TitleId) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        let rows_affected = conn
            .execute(
                "DELETE FROM list_entries WHERE list_id = ?1 AND title_id = ?2",
                params![list.0 as i64, title.0 as i64],
            )
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        if rows_affected == 0 {
            return Err(ApiError::EntryNotFound);
        }

        Ok(())
    }
}

impl RequestStore for SqliteStore {
    fn create_request(&self, requester: UserId) -> StoreResult<EditorRequest> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO editor_requests (requested_by, status, created_at, updated_at)
             VALUES (?1, 'PENDING', ?2, ?3)",
            params![requester.0 as i64, now.to_rfc3339(), now.to_rfc3339()],
        )
        .map_err(|e| {
            if let rusqlite::Error::SqliteFailure(ref err, ref msg) = e {
                if err.code == rusqlite::ErrorCode::ConstraintViolation
                    && msg.as_deref().unwrap_or("").contains("UNIQUE")
                {
                    return ApiError::RequestAlreadyPending;
                }
            }
            ApiError::Internal(e.to_string())
        })?;

        Ok(EditorRequest {
            id: RequestId(conn.last_insert_rowid() as u64),
            requested_by: requester,
            reviewed_by: None,
            status: RequestStatus::Pending,
            reject_reason: None,
            created_at: now,
            updated_at: now,
        })
    }

    fn get_request(&self, id: RequestId) -> StoreResult<Option<EditorRequest>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, requested_by, reviewed_by, status, reject_reason, created_at, updated_at
             FROM editor_requests WHERE id = ?1",
            params![id.0 as i64],
            request_from_row,
        )
        .optional()
        .map_err(|e| ApiError::Internal(e.to_string()))
    }

    fn requests_by_user(&self, user: UserId) -> StoreResult<Vec<EditorRequest>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, requested_by, reviewed_by, status, reject_reason, created_at, updated_at
                 FROM editor_requests WHERE requested_by = ?1
                 ORDER BY created_at DESC, id DESC",
            )
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        let requests = stmt
            .query_map(params![user.0 as i64], request_from_row)
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(requests)
    }

    fn pending_requests(&self) -> StoreResult<Vec<EditorRequest>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, requested_by, reviewed_by, status, reject_reason, created_at, updated_at
                 FROM editor_requests WHERE status = 'PENDING'
                 ORDER BY created_at ASC, id ASC",
            )
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        let requests = stmt
            .query_map([], request_from_row)
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(requests)
    }

    fn resolve_request(
        &self,
        id: RequestId,
        status: RequestStatus,
        reviewer: UserId,
        reason: Option<String>,
    ) -> StoreResult<EditorRequest> {
        let conn = self.conn.lock().unwrap();

        // Conditional on the row still being pending, so only one of two
        // racing adjudications can win
        let rows_affected = conn
            .execute(
                "UPDATE editor_requests
                 SET status = ?1, reviewed_by = ?2, reject_reason = ?3, updated_at = ?4
                 WHERE id = ?5 AND status = 'PENDING'",
                params![
                    status.as_str(),
                    reviewer.0 as i64,
                    reason,
                    Utc::now().to_rfc3339(),
                    id.0 as i64,
                ],
            )
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        if rows_affected == 0 {
            let exists: bool = conn
                .query_row(
                    "SELECT EXISTS(SELECT 1 FROM editor_requests WHERE id = ?1)",
                    params![id.0 as i64],
                    |row| row.get(0),
                )
                .map_err(|e| ApiError::Internal(e.to_string()))?;
            return Err(if exists {
                ApiError::RequestNotPending
            } else {
                ApiError::RequestNotFound
            });
        }

        drop(conn);
        self.get_request(id)?.ok_or(ApiError::RequestNotFound)
    }
}
