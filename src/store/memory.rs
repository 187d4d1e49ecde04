//! In-memory storage implementation

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use super::{
    EditorRequest, EntryId, ListEntry, ListId, ListKind, ListStore, NewTitle, NewUser,
    ProfileUpdate, RequestId, RequestStatus, RequestStore, Role, StoreResult, Title, TitleId,
    TitleKind, TitlePatch, TitleStore, User, UserId, UserList, UserStore, LIST_KINDS,
};
use crate::error::ApiError;

/// A list membership as stored; the eager title is joined on read
#[derive(Debug, Clone)]
struct EntryRow {
    id: EntryId,
    list_id: ListId,
    title_id: TitleId,
    created_at: DateTime<Utc>,
}

/// In-memory store backing all four store traits
///
/// Ids are handed out in creation order, so ordering by id is ordering by
/// creation time.
pub struct InMemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    titles: RwLock<HashMap<TitleId, Title>>,
    lists: RwLock<HashMap<ListId, UserList>>,
    entries: RwLock<HashMap<EntryId, EntryRow>>,
    requests: RwLock<HashMap<RequestId, EditorRequest>>,
    next_user_id: AtomicU64,
    next_title_id: AtomicU64,
    next_list_id: AtomicU64,
    next_entry_id: AtomicU64,
    next_request_id: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            titles: RwLock::new(HashMap::new()),
            lists: RwLock::new(HashMap::new()),
            entries: RwLock::new(HashMap::new()),
            requests: RwLock::new(HashMap::new()),
            next_user_id: AtomicU64::new(1),
            next_title_id: AtomicU64::new(1),
            next_list_id: AtomicU64::new(1),
            next_entry_id: AtomicU64::new(1),
            next_request_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore for InMemoryStore {
    fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().unwrap();
        if users.values().any(|u| u.username == new.username) {
            return Err(ApiError::UsernameTaken);
        }
        if users.values().any(|u| u.email == new.email) {
            return Err(ApiError::EmailTaken);
        }

        let id = UserId(self.next_user_id.fetch_add(1, Ordering::SeqCst));
        let user = User {
            id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            first_name: new.first_name,
            last_name: new.last_name,
            avatar: new.avatar,
            role: new.role,
            created_at: Utc::now(),
        };
        users.insert(id, user.clone());
        Ok(user)
    }

    fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.users.read().unwrap().get(&id).cloned())
    }

    fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().unwrap();
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    fn find_by_login(&self, login: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().unwrap();
        Ok(users
            .values()
            .find(|u| u.username == login || u.email == login)
            .cloned())
    }

    fn list_users(&self) -> StoreResult<Vec<User>> {
        let users = self.users.read().unwrap();
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| b.id.0.cmp(&a.id.0));
        Ok(all)
    }

    fn update_profile(&self, id: UserId, update: ProfileUpdate) -> StoreResult<User> {
        let mut users = self.users.write().unwrap();
        let user = users.get_mut(&id).ok_or(ApiError::UserNotFound)?;
        if let Some(first_name) = update.first_name {
            user.first_name = Some(first_name);
        }
        if let Some(last_name) = update.last_name {
            user.last_name = Some(last_name);
        }
        if let Some(avatar) = update.avatar {
            user.avatar = Some(avatar);
        }
        Ok(user.clone())
    }

    fn set_role(&self, id: UserId, role: Role) -> StoreResult<User> {
        let mut users = self.users.write().unwrap();
        let user = users.get_mut(&id).ok_or(ApiError::UserNotFound)?;
        user.role = role;
        Ok(user.clone())
    }

    fn delete_user(&self, id: UserId) -> StoreResult<()> {
        if self.users.write().unwrap().remove(&id).is_none() {
            return Err(ApiError::UserNotFound);
        }

        // Titles survive with the creator reference nulled
        for title in self.titles.write().unwrap().values_mut() {
            if title.created_by == Some(id) {
                title.created_by = None;
            }
        }

        // Lists and their entries go with the user
        let removed_lists: HashSet<ListId> = {
            let mut lists = self.lists.write().unwrap();
            let ids: HashSet<ListId> = lists
                .values()
                .filter(|l| l.user_id == id)
                .map(|l| l.id)
                .collect();
            lists.retain(|_, l| l.user_id != id);
            ids
        };
        self.entries
            .write()
            .unwrap()
            .retain(|_, e| !removed_lists.contains(&e.list_id));

        // Authored requests go with the user; reviewed ones lose the reviewer
        let mut requests = self.requests.write().unwrap();
        requests.retain(|_, r| r.requested_by != id);
        for request in requests.values_mut() {
            if request.reviewed_by == Some(id) {
                request.reviewed_by = None;
            }
        }

        Ok(())
    }
}

impl TitleStore for InMemoryStore {
    fn create_title(&self, new: NewTitle, creator: UserId) -> StoreResult<Title> {
        let id = TitleId(self.next_title_id.fetch_add(1, Ordering::SeqCst));
        let now = Utc::now();
        let title = Title {
            id,
            name: new.name,
            kind: new.kind,
            description: new.description,
            poster_url: new.poster_url,
            created_by: Some(creator),
            created_at: now,
            updated_at: now,
        };
        self.titles.write().unwrap().insert(id, title.clone());
        Ok(title)
    }

    fn get_title(&self, id: TitleId) -> StoreResult<Option<Title>> {
        Ok(self.titles.read().unwrap().get(&id).cloned())
    }

    fn list_titles(&self, kind: Option<TitleKind>) -> StoreResult<Vec<Title>> {
        let titles = self.titles.read().unwrap();
        let mut all: Vec<Title> = titles
            .values()
            .filter(|t| kind.map_or(true, |k| t.kind == k))
            .cloned()
            .collect();
        all.sort_by(|a, b| b.id.0.cmp(&a.id.0));
        Ok(all)
    }

    fn list_titles_by_creator(&self, creator: UserId) -> StoreResult<Vec<Title>> {
        let titles = self.titles.read().unwrap();
        let mut all: Vec<Title> = titles
            .values()
            .filter(|t| t.created_by == Some(creator))
            .cloned()
            .collect();
        all.sort_by(|a, b| b.id.0.cmp(&a.id.0));
        Ok(all)
    }

    fn update_title(&self, id: TitleId, patch: TitlePatch) -> StoreResult<Title> {
        let mut titles = self.titles.write().unwrap();
        let title = titles.get_mut(&id).ok_or(ApiError::TitleNotFound)?;
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
        Ok(title.clone())
    }

    fn delete_title(&self, id: TitleId) -> StoreResult<()> {
        if self.titles.write().unwrap().remove(&id).is_none() {
            return Err(ApiError::TitleNotFound);
        }
        self.entries.write().unwrap().retain(|_, e| e.title_id != id);
        Ok(())
    }
}

impl ListStore for InMemoryStore {
    fn ensure_default_lists(&self, user: UserId) -> StoreResult<()> {
        let mut lists = self.lists.write().unwrap();
        let present: HashSet<ListKind> = lists
            .values()
            .filter(|l| l.user_id == user)
            .map(|l| l.kind)
            .collect();
        for kind in LIST_KINDS {
            if present.contains(&kind) {
                continue;
            }
            let id = ListId(self.next_list_id.fetch_add(1, Ordering::SeqCst));
            lists.insert(
                id,
                UserList {
                    id,
                    user_id: user,
                    kind,
                    created_at: Utc::now(),
                },
            );
        }
        Ok(())
    }

    fn lists_for_user(&self, user: UserId) -> StoreResult<Vec<UserList>> {
        let lists = self.lists.read().unwrap();
        let mut owned: Vec<UserList> = lists
            .values()
            .filter(|l| l.user_id == user)
            .cloned()
            .collect();
        owned.sort_by_key(|l| l.id.0);
        Ok(owned)
    }

    fn find_list(&self, user: UserId, kind: ListKind) -> StoreResult<Option<UserList>> {
        let lists = self.lists.read().unwrap();
        Ok(lists
            .values()
            .find(|l| l.user_id == user && l.kind == kind)
            .cloned())
    }

    fn entries_for_list(&self, list: ListId) -> StoreResult<Vec<ListEntry>> {
        let titles = self.titles.read().unwrap();
        let entries = self.entries.read().unwrap();
        let mut rows: Vec<&EntryRow> = entries.values().filter(|e| e.list_id == list).collect();
        rows.sort_by_key(|e| e.id.0);

        rows.into_iter()
            .map(|row| {
                let title = titles
                    .get(&row.title_id)
                    .cloned()
                    .ok_or_else(|| ApiError::Internal("entry references missing title".into()))?;
                Ok(ListEntry {
                    id: row.id,
                    list_id: row.list_id,
                    title,
                    created_at: row.created_at,
                })
            })
            .collect()
    }

    fn add_entry(&self, list: ListId, title: TitleId) -> StoreResult<ListEntry> {
        let titles = self.titles.read().unwrap();
        let title_record = titles
            .get(&title)
            .cloned()
            .ok_or(ApiError::TitleNotFound)?;
        drop(titles);

        // The duplicate check and the insert happen under one write lock,
        // so two concurrent adds cannot both pass the check
        let mut entries = self.entries.write().unwrap();
        if entries
            .values()
            .any(|e| e.list_id == list && e.title_id == title)
        {
            return Err(ApiError::AlreadyInList);
        }

        let id = EntryId(self.next_entry_id.fetch_add(1, Ordering::SeqCst));
        let row = EntryRow {
            id,
            list_id: list,
            title_id: title,
            created_at: Utc::now(),
        };
        entries.insert(id, row.clone());
        Ok(ListEntry {
            id: row.id,
            list_id: row.list_id,
            title: title_record,
            created_at: row.created_at,
        })
    }

    fn remove_entry(&self, list: ListId, title: TitleId) -> StoreResult<()> {
        let mut entries = self.entries.write().unwrap();
        let id = entries
            .values()
            .find(|e| e.list_id == list && e.title_id == title)
            .map(|e| e.id)
            .ok_or(ApiError::EntryNotFound)?;
        entries.remove(&id);
        Ok(())
    }
}

impl RequestStore for InMemoryStore {
    fn create_request(&self, requester: UserId) -> StoreResult<EditorRequest> {
        // Single-pending invariant: check and insert under one write lock
        let mut requests = self.requests.write().unwrap();
        if requests
            .values()
            .any(|r| r.requested_by == requester && r.status == RequestStatus::Pending)
        {
            return Err(ApiError::RequestAlreadyPending);
        }

        let id = RequestId(self.next_request_id.fetch_add(1, Ordering::SeqCst));
        let now = Utc::now();
        let request = EditorRequest {
            id,
            requested_by: requester,
            reviewed_by: None,
            status: RequestStatus::Pending,
            reject_reason: None,
            created_at: now,
            updated_at: now,
        };
        requests.insert(id, request.clone());
        Ok(request)
    }

    fn get_request(&self, id: RequestId) -> StoreResult<Option<EditorRequest>> {
        Ok(self.requests.read().unwrap().get(&id).cloned())
    }

    fn requests_by_user(&self, user: UserId) -> StoreResult<Vec<EditorRequest>> {
        let requests = self.requests.read().unwrap();
        let mut mine: Vec<EditorRequest> = requests
            .values()
            .filter(|r| r.requested_by == user)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.id.0.cmp(&a.id.0));
        Ok(mine)
    }

    fn pending_requests(&self) -> StoreResult<Vec<EditorRequest>> {
        let requests = self.requests.read().unwrap();
        let mut pending: Vec<EditorRequest> = requests
            .values()
            .filter(|r| r.status == RequestStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|r| r.id.0);
        Ok(pending)
    }

    fn resolve_request(
        &self,
        id: RequestId,
        status: RequestStatus,
        reviewer: UserId,
        reason: Option<String>,
    ) -> StoreResult<EditorRequest> {
        let mut requests = self.requests.write().unwrap();
        let request = requests.get_mut(&id).ok_or(ApiError::RequestNotFound)?;
        if request.status != RequestStatus::Pending {
            return Err(ApiError::RequestNotPending);
        }
        request.status = status;
        request.reviewed_by = Some(reviewer);
        request.reject_reason = reason;
        request.updated_at = Utc::now();
        Ok(request.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "hashed".to_string(),
            first_name: None,
            last_name: None,
            avatar: None,
            role: Role::User,
        }
    }

    fn new_title(name: &str, kind: TitleKind) -> NewTitle {
        NewTitle {
            name: name.to_string(),
            kind,
            description: None,
            poster_url: None,
        }
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let store = InMemoryStore::new();
        store.create_user(new_user("alice")).unwrap();

        let mut dup = new_user("alice");
        dup.email = "other@example.com".to_string();
        let result = store.create_user(dup);
        assert!(matches!(result, Err(ApiError::UsernameTaken)));
    }

    #[test]
    fn test_find_by_login_matches_username_or_email() {
        let store = InMemoryStore::new();
        let user = store.create_user(new_user("alice")).unwrap();

        assert_eq!(store.find_by_login("alice").unwrap().unwrap().id, user.id);
        assert_eq!(
            store
                .find_by_login("alice@example.com")
                .unwrap()
                .unwrap()
                .id,
            user.id
        );
        assert!(store.find_by_login("bob").unwrap().is_none());
    }

    #[test]
    fn test_ensure_default_lists_idempotent() {
        let store = InMemoryStore::new();
        let user = store.create_user(new_user("alice")).unwrap();

        store.ensure_default_lists(user.id).unwrap();
        store.ensure_default_lists(user.id).unwrap();

        let lists = store.lists_for_user(user.id).unwrap();
        assert_eq!(lists.len(), 3);
        let kinds: Vec<ListKind> = lists.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![ListKind::Watched, ListKind::Continue, ListKind::Wishlist]
        );
    }

    #[test]
    fn test_duplicate_entry_is_conflict() {
        let store = InMemoryStore::new();
        let user = store.create_user(new_user("alice")).unwrap();
        store.ensure_default_lists(user.id).unwrap();
        let list = store
            .find_list(user.id, ListKind::Wishlist)
            .unwrap()
            .unwrap();
        let title = store
            .create_title(new_title("Inception", TitleKind::Movie), user.id)
            .unwrap();

        store.add_entry(list.id, title.id).unwrap();
        let result = store.add_entry(list.id, title.id);
        assert!(matches!(result, Err(ApiError::AlreadyInList)));
        assert_eq!(store.entries_for_list(list.id).unwrap().len(), 1);
    }

    #[test]
    fn test_remove_then_add_again() {
        let store = InMemoryStore::new();
        let user = store.create_user(new_user("alice")).unwrap();
        store.ensure_default_lists(user.id).unwrap();
        let list = store
            .find_list(user.id, ListKind::Watched)
            .unwrap()
            .unwrap();
        let title = store
            .create_title(new_title("Inception", TitleKind::Movie), user.id)
            .unwrap();

        store.add_entry(list.id, title.id).unwrap();
        store.remove_entry(list.id, title.id).unwrap();
        assert!(matches!(
            store.remove_entry(list.id, title.id),
            Err(ApiError::EntryNotFound)
        ));
        store.add_entry(list.id, title.id).unwrap();
    }

    #[test]
    fn test_delete_title_cascades_entries() {
        let store = InMemoryStore::new();
        let alice = store.create_user(new_user("alice")).unwrap();
        let bob = store.create_user(new_user("bob")).unwrap();
        store.ensure_default_lists(alice.id).unwrap();
        store.ensure_default_lists(bob.id).unwrap();
        let title = store
            .create_title(new_title("Inception", TitleKind::Movie), alice.id)
            .unwrap();

        let alice_list = store
            .find_list(alice.id, ListKind::Wishlist)
            .unwrap()
            .unwrap();
        let bob_list = store
            .find_list(bob.id, ListKind::Watched)
            .unwrap()
            .unwrap();
        store.add_entry(alice_list.id, title.id).unwrap();
        store.add_entry(bob_list.id, title.id).unwrap();

        store.delete_title(title.id).unwrap();

        assert!(store.entries_for_list(alice_list.id).unwrap().is_empty());
        assert!(store.entries_for_list(bob_list.id).unwrap().is_empty());
    }

    #[test]
    fn test_delete_user_cascades() {
        let store = InMemoryStore::new();
        let alice = store.create_user(new_user("alice")).unwrap();
        let admin = {
            let mut new = new_user("boss");
            new.role = Role::Admin;
            store.create_user(new).unwrap()
        };
        store.ensure_default_lists(alice.id).unwrap();
        let title = store
            .create_title(new_title("Inception", TitleKind::Movie), alice.id)
            .unwrap();
        let request = store.create_request(alice.id).unwrap();
        store
            .resolve_request(request.id, RequestStatus::Rejected, admin.id, None)
            .unwrap();
        let second = store.create_request(alice.id).unwrap();

        store.delete_user(alice.id).unwrap();

        assert!(store.get_user(alice.id).unwrap().is_none());
        assert!(store.lists_for_user(alice.id).unwrap().is_empty());
        assert!(store.get_request(request.id).unwrap().is_none());
        assert!(store.get_request(second.id).unwrap().is_none());
        // The title survives with its creator nulled
        let title = store.get_title(title.id).unwrap().unwrap();
        assert_eq!(title.created_by, None);
    }

    #[test]
    fn test_delete_reviewer_nulls_reference() {
        let store = InMemoryStore::new();
        let alice = store.create_user(new_user("alice")).unwrap();
        let admin = {
            let mut new = new_user("boss");
            new.role = Role::Admin;
            store.create_user(new).unwrap()
        };
        let request = store.create_request(alice.id).unwrap();
        store
            .resolve_request(request.id, RequestStatus::Approved, admin.id, None)
            .unwrap();

        store.delete_user(admin.id).unwrap();

        let request = store.get_request(request.id).unwrap().unwrap();
        assert_eq!(request.reviewed_by, None);
        assert_eq!(request.status, RequestStatus::Approved);
    }

    #[test]
    fn test_single_pending_request() {
        let store = InMemoryStore::new();
        let alice = store.create_user(new_user("alice")).unwrap();

        store.create_request(alice.id).unwrap();
        let result = store.create_request(alice.id);
        assert!(matches!(result, Err(ApiError::RequestAlreadyPending)));
    }

    #[test]
    fn test_resolve_is_terminal() {
        let store = InMemoryStore::new();
        let alice = store.create_user(new_user("alice")).unwrap();
        let admin = {
            let mut new = new_user("boss");
            new.role = Role::Admin;
            store.create_user(new).unwrap()
        };

        let request = store.create_request(alice.id).unwrap();
        store
            .resolve_request(request.id, RequestStatus::Approved, admin.id, None)
            .unwrap();

        let again = store.resolve_request(request.id, RequestStatus::Approved, admin.id, None);
        assert!(matches!(again, Err(ApiError::RequestNotPending)));
    }
}
