//! `books` table and the `book_tags` association

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Review, Tag};

/// Row of `books`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub uid: Uuid,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub published_date: NaiveDate,
    pub page_count: i32,
    pub language: String,
    /// Owning user; cleared when that user is deleted
    pub user_uid: Option<Uuid>,
    pub created_at: NaiveDateTime,
    #[sqlx(rename = "update_at")]
    pub updated_at: NaiveDateTime,
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Book {}", self.title)
    }
}

/// Insert payload for `books`
#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub published_date: NaiveDate,
    pub page_count: i32,
    pub language: String,
    #[serde(default)]
    pub user_uid: Option<Uuid>,
}

impl NewBook {
    pub fn owned_by(mut self, user_uid: Uuid) -> Self {
        self.user_uid = Some(user_uid);
        self
    }
}

/// Partial update for `books`. Ownership changes go through
/// `BookRepo::set_owner` since `None` here means "unchanged".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookChanges {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub page_count: Option<i32>,
    pub language: Option<String>,
}

/// Row of `book_tags`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct BookTag {
    pub book_id: Uuid,
    pub tag_id: Uuid,
}

/// A book with its reviews and tags
#[derive(Debug, Clone, Serialize)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    pub reviews: Vec<Review>,
    pub tags: Vec<Tag>,
}
