//! Credential store - Registration, password verification and user lookup.
//!
//! Passwords are stored as Argon2id PHC strings with a fresh random salt per
//! user. Hashing is deliberately slow, so it runs on the blocking thread pool
//! rather than on the async executor.

use crate::{
    entities::{Role, User, user},
    errors::{Error, Result},
};
use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use sea_orm::{Set, prelude::*, sea_query::OnConflict};
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Hash checked against when the username is unknown, so a miss costs the
/// same Argon2 work as a hit.
static DUMMY_HASH: OnceCell<String> = OnceCell::const_new();

async fn dummy_hash() -> Result<&'static str> {
    DUMMY_HASH
        .get_or_try_init(|| hash_password("not-a-real-account"))
        .await
        .map(String::as_str)
}

/// Fields needed to create an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub name: String,
}

/// Hashes `password` with Argon2id and a random salt.
pub async fn hash_password(password: &str) -> Result<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
    })
    .await?
    .map_err(Into::into)
}

/// Checks `password` against a stored PHC string.
///
/// A mismatch is `Ok(false)`; only a malformed stored hash is an error.
pub async fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let password = password.to_owned();
    let stored_hash = stored_hash.to_owned();
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&stored_hash)?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e),
        }
    })
    .await?
    .map_err(Into::into)
}

/// Finds a user by exact (case-sensitive) username.
pub async fn get_user_by_username<C>(db: &C, username: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates an active account.
///
/// The username's uniqueness is enforced by the store: the insert is a no-op
/// on conflict and a zero row count is reported as [`Error::UsernameTaken`].
pub async fn register(db: &DatabaseConnection, new_user: NewUser) -> Result<user::Model> {
    let NewUser {
        username,
        password,
        role,
        name,
    } = new_user;

    if username.trim().is_empty() {
        return Err(Error::invalid_input("username cannot be empty"));
    }
    if password.is_empty() {
        return Err(Error::invalid_input("password cannot be empty"));
    }

    let password_hash = hash_password(&password).await?;

    let account = user::ActiveModel {
        username: Set(username.clone()),
        password_hash: Set(password_hash),
        role: Set(role),
        name: Set(name),
        is_active: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let inserted = User::insert(account)
        .on_conflict(
            OnConflict::column(user::Column::Username)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    if inserted == 0 {
        debug!("Registration refused, username '{}' exists", username);
        return Err(Error::UsernameTaken { username });
    }

    let created = get_user_by_username(db, &username).await?.ok_or_else(|| {
        Error::Database(DbErr::RecordNotFound(format!(
            "user '{username}' missing after insert"
        )))
    })?;
    info!("Registered user {} as {}", created.username, created.role.as_str());
    Ok(created)
}

/// Checks a username/password pair.
///
/// Unknown user and wrong password both yield [`Error::InvalidCredentials`];
/// a correct password on a deactivated account yields
/// [`Error::InactiveAccount`].
pub async fn verify_credentials(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<user::Model> {
    let Some(account) = get_user_by_username(db, username).await? else {
        debug!("Login attempt for unknown user");
        verify_password(password, dummy_hash().await?).await?;
        return Err(Error::InvalidCredentials);
    };

    if !verify_password(password, &account.password_hash).await? {
        debug!("Login attempt with wrong password for user {}", account.id);
        return Err(Error::InvalidCredentials);
    }

    if !account.is_active {
        return Err(Error::InactiveAccount);
    }

    Ok(account)
}

/// Flips the active flag of an account.
pub async fn set_user_active(
    db: &DatabaseConnection,
    username: &str,
    is_active: bool,
) -> Result<user::Model> {
    let account = get_user_by_username(db, username)
        .await?
        .ok_or(Error::InvalidCredentials)?;

    let mut active: user::ActiveModel = account.into();
    active.is_active = Set(is_active);
    active.update(db).await.map_err(Into::into)
}
