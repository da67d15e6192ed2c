//! User repository
//!
//! Email and username are looked up, never assumed unique: the `find_*`
//! methods return the oldest matching row.

use uuid::Uuid;

use crate::error::{DbError, Result};
use crate::models::{
    Book, NewUser, Paginated, Pagination, Review, User, UserChanges, UserDetails, DEFAULT_ROLE,
};
use crate::session::Session;

use super::{paginate, BookRepo, ReviewRepo};

macro_rules! user_columns {
    () => {
        "uid, username, email, first_name, last_name, role, is_verified, password_hash, created_at, update_at"
    };
}

/// User repository
pub struct UserRepo<'a> {
    session: &'a mut Session,
}

impl<'a> UserRepo<'a> {
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    /// Insert a user with a fresh random id.
    pub async fn create(&mut self, new: NewUser) -> Result<User> {
        let user: User = sqlx::query_as(concat!(
            "INSERT INTO users (uid, username, email, first_name, last_name, role, is_verified, password_hash, created_at, update_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, LOCALTIMESTAMP, LOCALTIMESTAMP) \
             RETURNING ",
            user_columns!()
        ))
        .bind(Uuid::new_v4())
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.role.as_deref().unwrap_or(DEFAULT_ROLE))
        .bind(new.is_verified)
        .bind(&new.password_hash)
        .fetch_one(self.session.conn().await?)
        .await?;

        Ok(user)
    }

    pub async fn get(&mut self, uid: Uuid) -> Result<User> {
        sqlx::query_as(concat!("SELECT ", user_columns!(), " FROM users WHERE uid = $1"))
            .bind(uid)
            .fetch_optional(self.session.conn().await?)
            .await?
            .ok_or_else(|| DbError::not_found("user", uid))
    }

    pub async fn find_by_email(&mut self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE email = $1 ORDER BY created_at, uid LIMIT 1"
        ))
        .bind(email)
        .fetch_optional(self.session.conn().await?)
        .await?;

        Ok(user)
    }

    pub async fn find_by_username(&mut self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE username = $1 ORDER BY created_at, uid LIMIT 1"
        ))
        .bind(username)
        .fetch_optional(self.session.conn().await?)
        .await?;

        Ok(user)
    }

    /// Users, newest first.
    pub async fn list(&mut self, page: Pagination) -> Result<Paginated<User>> {
        let rows = sqlx::query(concat!(
            "SELECT ",
            user_columns!(),
            ", COUNT(*) OVER() AS total \
             FROM users \
             ORDER BY created_at DESC, uid \
             LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.session.conn().await?)
        .await?;

        paginate(rows, page)
    }

    /// Apply the set fields and refresh `update_at`.
    pub async fn update(&mut self, uid: Uuid, changes: UserChanges) -> Result<User> {
        sqlx::query_as(concat!(
            "UPDATE users SET \
                username = COALESCE($2, username), \
                email = COALESCE($3, email), \
                first_name = COALESCE($4, first_name), \
                last_name = COALESCE($5, last_name), \
                role = COALESCE($6, role), \
                is_verified = COALESCE($7, is_verified), \
                password_hash = COALESCE($8, password_hash), \
                update_at = LOCALTIMESTAMP \
             WHERE uid = $1 \
             RETURNING ",
            user_columns!()
        ))
        .bind(uid)
        .bind(changes.username)
        .bind(changes.email)
        .bind(changes.first_name)
        .bind(changes.last_name)
        .bind(changes.role)
        .bind(changes.is_verified)
        .bind(changes.password_hash)
        .fetch_optional(self.session.conn().await?)
        .await?
        .ok_or_else(|| DbError::not_found("user", uid))
    }

    /// Delete a user. Their books and reviews stay, with the owner cleared.
    ///
    /// References are cleared here rather than left to the foreign keys, so
    /// tables whose FKs lack `ON DELETE SET NULL` behave the same.
    /// Returns false if no such user existed.
    pub async fn delete(&mut self, uid: Uuid) -> Result<bool> {
        let conn = self.session.conn().await?;

        sqlx::query("UPDATE books SET user_uid = NULL WHERE user_uid = $1")
            .bind(uid)
            .execute(&mut *conn)
            .await?;
        sqlx::query("UPDATE reviews SET user_uid = NULL WHERE user_uid = $1")
            .bind(uid)
            .execute(&mut *conn)
            .await?;
        let result = sqlx::query("DELETE FROM users WHERE uid = $1")
            .bind(uid)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Books owned by the user.
    pub async fn books(&mut self, uid: Uuid) -> Result<Vec<Book>> {
        BookRepo::new(&mut *self.session).all_for_user(uid).await
    }

    /// Reviews written by the user.
    pub async fn reviews(&mut self, uid: Uuid) -> Result<Vec<Review>> {
        ReviewRepo::new(&mut *self.session).all_for_user(uid).await
    }

    /// The user with their books and reviews (three queries, same transaction).
    pub async fn get_with_relations(&mut self, uid: Uuid) -> Result<UserDetails> {
        let user = self.get(uid).await?;
        let books = self.books(uid).await?;
        let reviews = self.reviews(uid).await?;

        Ok(UserDetails {
            user,
            books,
            reviews,
        })
    }
}
