//! `reviews` table

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Row of `reviews`. Both references are nullable; a review outlives
/// the user and book it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub uid: Uuid,
    pub rating: i32,
    pub review_text: String,
    pub user_uid: Option<Uuid>,
    pub book_uid: Option<Uuid>,
    pub created_at: NaiveDateTime,
    #[sqlx(rename = "update_at")]
    pub updated_at: NaiveDateTime,
}

impl Review {
    pub fn is_orphaned(&self) -> bool {
        self.user_uid.is_none() && self.book_uid.is_none()
    }
}

impl fmt::Display for Review {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Review for book {} by user {}",
            display_ref(self.book_uid),
            display_ref(self.user_uid)
        )
    }
}

fn display_ref(id: Option<Uuid>) -> String {
    id.map_or_else(|| "none".to_owned(), |id| id.to_string())
}

/// Insert payload for `reviews`
#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub rating: i32,
    pub review_text: String,
    #[serde(default)]
    pub user_uid: Option<Uuid>,
    #[serde(default)]
    pub book_uid: Option<Uuid>,
}

impl NewReview {
    /// Review with no user or book attached.
    pub fn new(rating: i32, review_text: impl Into<String>) -> Self {
        Self {
            rating,
            review_text: review_text.into(),
            user_uid: None,
            book_uid: None,
        }
    }

    pub fn by(mut self, user_uid: Uuid) -> Self {
        self.user_uid = Some(user_uid);
        self
    }

    pub fn of(mut self, book_uid: Uuid) -> Self {
        self.book_uid = Some(book_uid);
        self
    }
}

/// Partial update for `reviews`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReviewChanges {
    pub rating: Option<i32>,
    pub review_text: Option<String>,
}
