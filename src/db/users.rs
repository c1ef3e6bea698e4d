//! User persistence.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};
use uuid::Uuid;

use crate::entity::user::{self, Entity as UserEntity};
use crate::error::{AppError, AppResult};
use crate::models::user::{Role, User};

fn model_to_user(m: user::Model) -> AppResult<User> {
    let role = Role::parse(&m.role)
        .ok_or_else(|| AppError::Database(format!("unknown role '{}' for user {}", m.role, m.id)))?;
    Ok(User {
        id: m.id,
        username: m.username,
        email: m.email,
        name: m.name,
        avatar_url: m.avatar_url,
        password_hash: m.password_hash,
        role,
        oauth_login: m.oauth_login,
        last_login_at: m.last_login_at,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

/// Inserts a locally-registered user with a hashed password.
pub async fn insert_local(
    db: &DatabaseConnection,
    username: &str,
    name: Option<&str>,
    password_hash: &str,
    role: Role,
) -> AppResult<User> {
    let now = Utc::now();
    let model = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(Some(username.to_owned())),
        email: Set(None),
        name: Set(name.map(str::to_owned)),
        avatar_url: Set(None),
        password_hash: Set(Some(password_hash.to_owned())),
        role: Set(role.as_str().to_owned()),
        oauth_login: Set(false),
        last_login_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };

    // A concurrent registration can slip past the handler's lookup;
    // the unique index is the authority
    let inserted = model.insert(db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("username already taken".into())
        }
        _ => e.into(),
    })?;
    model_to_user(inserted)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> AppResult<Option<User>> {
    UserEntity::find_by_id(id)
        .one(db)
        .await?
        .map(model_to_user)
        .transpose()
}

pub async fn find_by_username(db: &DatabaseConnection, username: &str) -> AppResult<Option<User>> {
    UserEntity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?
        .map(model_to_user)
        .transpose()
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> AppResult<Option<User>> {
    UserEntity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?
        .map(model_to_user)
        .transpose()
}

/// Stamps a successful login.
pub async fn touch_last_login(db: &DatabaseConnection, id: Uuid) -> AppResult<()> {
    let model = user::ActiveModel {
        id: Set(id),
        last_login_at: Set(Some(Utc::now())),
        ..Default::default()
    };
    model.update(db).await?;
    Ok(())
}

/// Finds or creates the account behind a Google profile, keyed by email.
/// Returns the user and whether the account was just created.
pub async fn upsert_from_google(
    db: &DatabaseConnection,
    email: &str,
    name: Option<&str>,
    avatar_url: Option<&str>,
) -> AppResult<(User, bool)> {
    if let Some(existing) = UserEntity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?
    {
        let mut model: user::ActiveModel = existing.into();
        if let Some(name) = name {
            model.name = Set(Some(name.to_owned()));
        }
        if let Some(avatar_url) = avatar_url {
            model.avatar_url = Set(Some(avatar_url.to_owned()));
        }
        model.last_login_at = Set(Some(Utc::now()));
        return Ok((model_to_user(model.update(db).await?)?, false));
    }

    let now = Utc::now();
    let model = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(None),
        email: Set(Some(email.to_owned())),
        name: Set(name.map(str::to_owned)),
        avatar_url: Set(avatar_url.map(str::to_owned)),
        password_hash: Set(None),
        role: Set(Role::User.as_str().to_owned()),
        oauth_login: Set(true),
        last_login_at: Set(Some(now)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok((model_to_user(model.insert(db).await?)?, true))
}

/// All accounts, newest first. Admin listing.
pub async fn list_all(db: &DatabaseConnection) -> AppResult<Vec<User>> {
    UserEntity::find()
        .order_by_desc(user::Column::CreatedAt)
        .all(db)
        .await?
        .into_iter()
        .map(model_to_user)
        .collect()
}

/// Applies an admin edit. `None` leaves a field unchanged.
pub async fn admin_update(
    db: &DatabaseConnection,
    id: Uuid,
    name: Option<String>,
    role: Option<Role>,
) -> AppResult<User> {
    let existing = UserEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("user".into()))?;

    let mut model: user::ActiveModel = existing.into();
    if let Some(name) = name {
        model.name = Set(Some(name));
    }
    if let Some(role) = role {
        model.role = Set(role.as_str().to_owned());
    }
    model_to_user(model.update(db).await?)
}

pub async fn set_role(db: &DatabaseConnection, id: Uuid, role: Role) -> AppResult<User> {
    let existing = UserEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("user".into()))?;

    let mut model: user::ActiveModel = existing.into();
    model.role = Set(role.as_str().to_owned());
    model_to_user(model.update(db).await?)
}

/// Deletes an account. Owned courses, cards, favorites, and history
/// follow via the foreign keys.
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> AppResult<()> {
    let result = UserEntity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("user".into()));
    }
    Ok(())
}

/// Creates the bootstrap admin account if no user with that username
/// exists yet. Called once at startup.
pub async fn ensure_admin(
    db: &DatabaseConnection,
    username: &str,
    password_hash: &str,
) -> AppResult<Option<User>> {
    if find_by_username(db, username).await?.is_some() {
        return Ok(None);
    }
    let created = insert_local(db, username, None, password_hash, Role::Admin).await?;
    Ok(Some(created))
}
