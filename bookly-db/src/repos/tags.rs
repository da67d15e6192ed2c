//! Tag repository
//!
//! Tag names are not unique in storage. `find_by_name` and `get_or_create`
//! settle on the oldest tag with the name.

use uuid::Uuid;

use crate::error::{DbError, Result};
use crate::models::{Book, NewTag, Paginated, Pagination, Tag};
use crate::session::Session;

use super::{paginate, BookRepo};

/// Tag repository
pub struct TagRepo<'a> {
    session: &'a mut Session,
}

impl<'a> TagRepo<'a> {
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    pub async fn create(&mut self, new: NewTag) -> Result<Tag> {
        let tag: Tag = sqlx::query_as(
            r#"
            INSERT INTO tags (uid, name, created_at)
            VALUES ($1, $2, LOCALTIMESTAMP)
            RETURNING uid, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .fetch_one(self.session.conn().await?)
        .await?;

        Ok(tag)
    }

    pub async fn get(&mut self, uid: Uuid) -> Result<Tag> {
        sqlx::query_as("SELECT uid, name, created_at FROM tags WHERE uid = $1")
            .bind(uid)
            .fetch_optional(self.session.conn().await?)
            .await?
            .ok_or_else(|| DbError::not_found("tag", uid))
    }

    pub async fn find_by_name(&mut self, name: &str) -> Result<Option<Tag>> {
        let tag = sqlx::query_as(
            r#"
            SELECT uid, name, created_at
            FROM tags
            WHERE name = $1
            ORDER BY created_at, uid
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(self.session.conn().await?)
        .await?;

        Ok(tag)
    }

    /// Existing tag with this name, or a new one.
    ///
    /// Not atomic across sessions: two concurrent callers may both insert.
    pub async fn get_or_create(&mut self, name: &str) -> Result<Tag> {
        if let Some(tag) = self.find_by_name(name).await? {
            return Ok(tag);
        }
        self.create(NewTag::new(name)).await
    }

    /// Tags by name.
    pub async fn list(&mut self, page: Pagination) -> Result<Paginated<Tag>> {
        let rows = sqlx::query(
            r#"
            SELECT uid, name, created_at, COUNT(*) OVER() AS total
            FROM tags
            ORDER BY name, uid
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.session.conn().await?)
        .await?;

        paginate(rows, page)
    }

    pub async fn rename(&mut self, uid: Uuid, name: &str) -> Result<Tag> {
        sqlx::query_as(
            r#"
            UPDATE tags SET name = $2
            WHERE uid = $1
            RETURNING uid, name, created_at
            "#,
        )
        .bind(uid)
        .bind(name)
        .fetch_optional(self.session.conn().await?)
        .await?
        .ok_or_else(|| DbError::not_found("tag", uid))
    }

    /// Delete a tag and its book links. The books are untouched.
    pub async fn delete(&mut self, uid: Uuid) -> Result<bool> {
        let conn = self.session.conn().await?;

        sqlx::query("DELETE FROM book_tags WHERE tag_id = $1")
            .bind(uid)
            .execute(&mut *conn)
            .await?;
        let result = sqlx::query("DELETE FROM tags WHERE uid = $1")
            .bind(uid)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Books carrying the tag.
    pub async fn books(&mut self, uid: Uuid) -> Result<Vec<Book>> {
        BookRepo::new(&mut *self.session).all_for_tag(uid).await
    }
}
