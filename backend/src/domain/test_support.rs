//! In-memory port implementations shared by service unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};

use super::password::PasswordHash;
use super::ports::{
    DuplicateUserField, NewUser, PostPersistenceError, PostRepository, UserPersistenceError,
    UserRepository,
};
use super::post::{Post, PostDraft, PostId};
use super::user::{Profile, User, UserId};

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Convenience constructor for fixture users.
pub(crate) fn fixture_user(id: i32, username: &str, email: &str, password: &str) -> User {
    let profile =
        Profile::new("Fixture User", email, username, None, None).expect("valid fixture profile");
    let hash = PasswordHash::derive(password).expect("fixture hash derives");
    User::new(UserId::new(id), profile, hash, false, None, now())
}

#[derive(Default)]
struct UsersState {
    rows: Vec<User>,
    next_id: i32,
    fail_next: Option<UserPersistenceError>,
}

/// In-memory [`UserRepository`] with uniqueness enforcement and injectable
/// failures, standing in for the SQLite adapter.
#[derive(Default)]
pub(crate) struct InMemoryUsers {
    state: Mutex<UsersState>,
}

impl InMemoryUsers {
    pub(crate) fn with_users(users: Vec<User>) -> Self {
        let next_id = users.iter().map(|user| user.id().get()).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(UsersState {
                rows: users,
                next_id,
                fail_next: None,
            }),
        }
    }

    pub(crate) fn fail_next(&self, error: UserPersistenceError) {
        self.state.lock().expect("users lock").fail_next = Some(error);
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().expect("users lock").rows.len()
    }

    fn take_failure(state: &mut UsersState) -> Result<(), UserPersistenceError> {
        match state.fail_next.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn insert(&self, user: &NewUser) -> Result<UserId, UserPersistenceError> {
        let mut state = self.state.lock().expect("users lock");
        Self::take_failure(&mut state)?;
        if state
            .rows
            .iter()
            .any(|row| row.email() == user.profile.email())
        {
            return Err(UserPersistenceError::Duplicate {
                field: DuplicateUserField::Email,
            });
        }
        if state
            .rows
            .iter()
            .any(|row| row.username() == user.profile.username())
        {
            return Err(UserPersistenceError::Duplicate {
                field: DuplicateUserField::Username,
            });
        }
        let id = UserId::new(state.next_id);
        state.next_id += 1;
        state.rows.push(User::new(
            id,
            user.profile.clone(),
            user.password_hash.clone(),
            user.is_admin,
            None,
            now(),
        ));
        Ok(id)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut state = self.state.lock().expect("users lock");
        Self::take_failure(&mut state)?;
        Ok(state.rows.iter().find(|row| row.id() == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserPersistenceError> {
        let mut state = self.state.lock().expect("users lock");
        Self::take_failure(&mut state)?;
        Ok(state.rows.iter().find(|row| row.email() == email).cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut state = self.state.lock().expect("users lock");
        Self::take_failure(&mut state)?;
        Ok(state
            .rows
            .iter()
            .find(|row| row.username() == username)
            .cloned())
    }

    async fn update_profile(
        &self,
        id: UserId,
        profile: &Profile,
    ) -> Result<bool, UserPersistenceError> {
        let mut state = self.state.lock().expect("users lock");
        Self::take_failure(&mut state)?;
        let Some(index) = state.rows.iter().position(|row| row.id() == id) else {
            return Ok(false);
        };
        let old = state.rows[index].clone();
        state.rows[index] = User::new(
            id,
            profile.clone(),
            old.password_hash().clone(),
            old.is_admin(),
            old.profile_picture().map(ToOwned::to_owned),
            old.date_added(),
        );
        Ok(true)
    }

    async fn set_profile_picture(
        &self,
        id: UserId,
        stored_filename: &str,
    ) -> Result<bool, UserPersistenceError> {
        let mut state = self.state.lock().expect("users lock");
        Self::take_failure(&mut state)?;
        let Some(index) = state.rows.iter().position(|row| row.id() == id) else {
            return Ok(false);
        };
        let old = state.rows[index].clone();
        state.rows[index] = User::new(
            id,
            old.profile().clone(),
            old.password_hash().clone(),
            old.is_admin(),
            Some(stored_filename.to_owned()),
            old.date_added(),
        );
        Ok(true)
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut state = self.state.lock().expect("users lock");
        Self::take_failure(&mut state)?;
        let before = state.rows.len();
        state.rows.retain(|row| row.id() != id);
        Ok(state.rows.len() < before)
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut state = self.state.lock().expect("users lock");
        Self::take_failure(&mut state)?;
        let mut rows = state.rows.clone();
        rows.sort_by_key(User::date_added);
        Ok(rows)
    }

    async fn count(&self) -> Result<i64, UserPersistenceError> {
        let mut state = self.state.lock().expect("users lock");
        Self::take_failure(&mut state)?;
        Ok(state.rows.len() as i64)
    }
}

#[derive(Default)]
struct PostsState {
    rows: Vec<Post>,
    next_id: i32,
    fail_next: Option<PostPersistenceError>,
}

/// In-memory [`PostRepository`] mirroring the SQLite adapter's ordering and
/// uniqueness behavior.
#[derive(Default)]
pub(crate) struct InMemoryPosts {
    state: Mutex<PostsState>,
}

impl InMemoryPosts {
    pub(crate) fn fail_next(&self, error: PostPersistenceError) {
        self.state.lock().expect("posts lock").fail_next = Some(error);
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().expect("posts lock").rows.len()
    }

    fn take_failure(state: &mut PostsState) -> Result<(), PostPersistenceError> {
        match state.fail_next.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryPosts {
    async fn insert(
        &self,
        author: UserId,
        draft: &PostDraft,
    ) -> Result<PostId, PostPersistenceError> {
        let mut state = self.state.lock().expect("posts lock");
        Self::take_failure(&mut state)?;
        if state.rows.iter().any(|row| row.slug() == draft.slug()) {
            return Err(PostPersistenceError::DuplicateSlug);
        }
        state.next_id += 1;
        let id = PostId::new(state.next_id);
        state.rows.push(Post::new(id, draft.clone(), author, now()));
        Ok(id)
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, PostPersistenceError> {
        let mut state = self.state.lock().expect("posts lock");
        Self::take_failure(&mut state)?;
        Ok(state.rows.iter().find(|row| row.id() == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Post>, PostPersistenceError> {
        let mut state = self.state.lock().expect("posts lock");
        Self::take_failure(&mut state)?;
        let mut rows = state.rows.clone();
        rows.sort_by(|a, b| b.date_posted().cmp(&a.date_posted()));
        Ok(rows)
    }

    async fn update(&self, id: PostId, draft: &PostDraft) -> Result<bool, PostPersistenceError> {
        let mut state = self.state.lock().expect("posts lock");
        Self::take_failure(&mut state)?;
        if state
            .rows
            .iter()
            .any(|row| row.slug() == draft.slug() && row.id() != id)
        {
            return Err(PostPersistenceError::DuplicateSlug);
        }
        let Some(index) = state.rows.iter().position(|row| row.id() == id) else {
            return Ok(false);
        };
        let old = state.rows[index].clone();
        state.rows[index] = Post::new(id, draft.clone(), old.author(), old.date_posted());
        Ok(true)
    }

    async fn delete(&self, id: PostId) -> Result<bool, PostPersistenceError> {
        let mut state = self.state.lock().expect("posts lock");
        Self::take_failure(&mut state)?;
        let before = state.rows.len();
        state.rows.retain(|row| row.id() != id);
        Ok(state.rows.len() < before)
    }

    async fn search_content(&self, term: &str) -> Result<Vec<Post>, PostPersistenceError> {
        let mut state = self.state.lock().expect("posts lock");
        Self::take_failure(&mut state)?;
        let needle = term.to_lowercase();
        let mut rows: Vec<Post> = state
            .rows
            .iter()
            .filter(|row| row.content().to_lowercase().contains(&needle))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.title().cmp(b.title()));
        Ok(rows)
    }
}
