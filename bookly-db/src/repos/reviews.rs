//! Review repository

use uuid::Uuid;

use crate::error::{DbError, Result};
use crate::models::{NewReview, Paginated, Pagination, Review, ReviewChanges};
use crate::session::Session;

use super::paginate;

macro_rules! review_columns {
    () => {
        "uid, rating, review_text, user_uid, book_uid, created_at, update_at"
    };
}

/// Review repository
pub struct ReviewRepo<'a> {
    session: &'a mut Session,
}

impl<'a> ReviewRepo<'a> {
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    /// Insert a review with a fresh random id. Both references may be `None`.
    pub async fn create(&mut self, new: NewReview) -> Result<Review> {
        let review: Review = sqlx::query_as(concat!(
            "INSERT INTO reviews (uid, rating, review_text, user_uid, book_uid, created_at, update_at) \
             VALUES ($1, $2, $3, $4, $5, LOCALTIMESTAMP, LOCALTIMESTAMP) \
             RETURNING ",
            review_columns!()
        ))
        .bind(Uuid::new_v4())
        .bind(new.rating)
        .bind(&new.review_text)
        .bind(new.user_uid)
        .bind(new.book_uid)
        .fetch_one(self.session.conn().await?)
        .await?;

        Ok(review)
    }

    pub async fn get(&mut self, uid: Uuid) -> Result<Review> {
        sqlx::query_as(concat!("SELECT ", review_columns!(), " FROM reviews WHERE uid = $1"))
            .bind(uid)
            .fetch_optional(self.session.conn().await?)
            .await?
            .ok_or_else(|| DbError::not_found("review", uid))
    }

    pub async fn list_for_book(
        &mut self,
        book_uid: Uuid,
        page: Pagination,
    ) -> Result<Paginated<Review>> {
        let rows = sqlx::query(concat!(
            "SELECT ",
            review_columns!(),
            ", COUNT(*) OVER() AS total \
             FROM reviews \
             WHERE book_uid = $1 \
             ORDER BY created_at DESC, uid \
             LIMIT $2 OFFSET $3"
        ))
        .bind(book_uid)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.session.conn().await?)
        .await?;

        paginate(rows, page)
    }

    pub async fn list_for_user(
        &mut self,
        user_uid: Uuid,
        page: Pagination,
    ) -> Result<Paginated<Review>> {
        let rows = sqlx::query(concat!(
            "SELECT ",
            review_columns!(),
            ", COUNT(*) OVER() AS total \
             FROM reviews \
             WHERE user_uid = $1 \
             ORDER BY created_at DESC, uid \
             LIMIT $2 OFFSET $3"
        ))
        .bind(user_uid)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.session.conn().await?)
        .await?;

        paginate(rows, page)
    }

    pub async fn all_for_book(&mut self, book_uid: Uuid) -> Result<Vec<Review>> {
        let reviews = sqlx::query_as(concat!(
            "SELECT ",
            review_columns!(),
            " FROM reviews WHERE book_uid = $1 ORDER BY created_at DESC, uid"
        ))
        .bind(book_uid)
        .fetch_all(self.session.conn().await?)
        .await?;

        Ok(reviews)
    }

    pub async fn all_for_user(&mut self, user_uid: Uuid) -> Result<Vec<Review>> {
        let reviews = sqlx::query_as(concat!(
            "SELECT ",
            review_columns!(),
            " FROM reviews WHERE user_uid = $1 ORDER BY created_at DESC, uid"
        ))
        .bind(user_uid)
        .fetch_all(self.session.conn().await?)
        .await?;

        Ok(reviews)
    }

    /// Apply the set fields and refresh `update_at`.
    pub async fn update(&mut self, uid: Uuid, changes: ReviewChanges) -> Result<Review> {
        sqlx::query_as(concat!(
            "UPDATE reviews SET \
                rating = COALESCE($2, rating), \
                review_text = COALESCE($3, review_text), \
                update_at = LOCALTIMESTAMP \
             WHERE uid = $1 \
             RETURNING ",
            review_columns!()
        ))
        .bind(uid)
        .bind(changes.rating)
        .bind(changes.review_text)
        .fetch_optional(self.session.conn().await?)
        .await?
        .ok_or_else(|| DbError::not_found("review", uid))
    }

    pub async fn delete(&mut self, uid: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE uid = $1")
            .bind(uid)
            .execute(self.session.conn().await?)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
