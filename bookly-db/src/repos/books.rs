//! Book repository, including the `book_tags` association

use uuid::Uuid;

use crate::error::{DbError, Result};
use crate::models::{
    Book, BookChanges, BookDetails, BookTag, NewBook, Paginated, Pagination, Review, Tag,
};
use crate::session::Session;

use super::{paginate, ReviewRepo};

macro_rules! book_columns {
    () => {
        "uid, title, author, publisher, published_date, page_count, language, user_uid, created_at, update_at"
    };
}

/// Book repository
pub struct BookRepo<'a> {
    session: &'a mut Session,
}

impl<'a> BookRepo<'a> {
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    /// Insert a book with a fresh random id.
    ///
    /// A `user_uid` that matches no user fails with a foreign key violation.
    pub async fn create(&mut self, new: NewBook) -> Result<Book> {
        let book: Book = sqlx::query_as(concat!(
            "INSERT INTO books (uid, title, author, publisher, published_date, page_count, language, user_uid, created_at, update_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, LOCALTIMESTAMP, LOCALTIMESTAMP) \
             RETURNING ",
            book_columns!()
        ))
        .bind(Uuid::new_v4())
        .bind(&new.title)
        .bind(&new.author)
        .bind(&new.publisher)
        .bind(new.published_date)
        .bind(new.page_count)
        .bind(&new.language)
        .bind(new.user_uid)
        .fetch_one(self.session.conn().await?)
        .await?;

        Ok(book)
    }

    pub async fn get(&mut self, uid: Uuid) -> Result<Book> {
        sqlx::query_as(concat!("SELECT ", book_columns!(), " FROM books WHERE uid = $1"))
            .bind(uid)
            .fetch_optional(self.session.conn().await?)
            .await?
            .ok_or_else(|| DbError::not_found("book", uid))
    }

    /// Books, newest first.
    pub async fn list(&mut self, page: Pagination) -> Result<Paginated<Book>> {
        let rows = sqlx::query(concat!(
            "SELECT ",
            book_columns!(),
            ", COUNT(*) OVER() AS total \
             FROM books \
             ORDER BY created_at DESC, uid \
             LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.session.conn().await?)
        .await?;

        paginate(rows, page)
    }

    /// One page of the books owned by `user_uid`, newest first.
    pub async fn list_for_user(
        &mut self,
        user_uid: Uuid,
        page: Pagination,
    ) -> Result<Paginated<Book>> {
        let rows = sqlx::query(concat!(
            "SELECT ",
            book_columns!(),
            ", COUNT(*) OVER() AS total \
             FROM books \
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

    /// Every book owned by `user_uid`, newest first.
    pub async fn all_for_user(&mut self, user_uid: Uuid) -> Result<Vec<Book>> {
        let books = sqlx::query_as(concat!(
            "SELECT ",
            book_columns!(),
            " FROM books WHERE user_uid = $1 ORDER BY created_at DESC, uid"
        ))
        .bind(user_uid)
        .fetch_all(self.session.conn().await?)
        .await?;

        Ok(books)
    }

    /// Every book carrying the tag, by title.
    pub async fn all_for_tag(&mut self, tag_uid: Uuid) -> Result<Vec<Book>> {
        let books = sqlx::query_as(
            r#"
            SELECT b.uid, b.title, b.author, b.publisher, b.published_date, b.page_count,
                   b.language, b.user_uid, b.created_at, b.update_at
            FROM books b
            JOIN book_tags bt ON bt.book_id = b.uid
            WHERE bt.tag_id = $1
            ORDER BY b.title, b.uid
            "#,
        )
        .bind(tag_uid)
        .fetch_all(self.session.conn().await?)
        .await?;

        Ok(books)
    }

    /// Apply the set fields and refresh `update_at`.
    pub async fn update(&mut self, uid: Uuid, changes: BookChanges) -> Result<Book> {
        sqlx::query_as(concat!(
            "UPDATE books SET \
                title = COALESCE($2, title), \
                author = COALESCE($3, author), \
                publisher = COALESCE($4, publisher), \
                published_date = COALESCE($5, published_date), \
                page_count = COALESCE($6, page_count), \
                language = COALESCE($7, language), \
                update_at = LOCALTIMESTAMP \
             WHERE uid = $1 \
             RETURNING ",
            book_columns!()
        ))
        .bind(uid)
        .bind(changes.title)
        .bind(changes.author)
        .bind(changes.publisher)
        .bind(changes.published_date)
        .bind(changes.page_count)
        .bind(changes.language)
        .fetch_optional(self.session.conn().await?)
        .await?
        .ok_or_else(|| DbError::not_found("book", uid))
    }

    /// Assign or clear (`None`) the owning user.
    pub async fn set_owner(&mut self, uid: Uuid, user_uid: Option<Uuid>) -> Result<Book> {
        sqlx::query_as(concat!(
            "UPDATE books SET user_uid = $2, update_at = LOCALTIMESTAMP \
             WHERE uid = $1 \
             RETURNING ",
            book_columns!()
        ))
        .bind(uid)
        .bind(user_uid)
        .fetch_optional(self.session.conn().await?)
        .await?
        .ok_or_else(|| DbError::not_found("book", uid))
    }

    /// Delete a book. Its reviews stay with the book reference cleared;
    /// its tag links are removed. Tags themselves are untouched.
    pub async fn delete(&mut self, uid: Uuid) -> Result<bool> {
        let conn = self.session.conn().await?;

        sqlx::query("UPDATE reviews SET book_uid = NULL WHERE book_uid = $1")
            .bind(uid)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM book_tags WHERE book_id = $1")
            .bind(uid)
            .execute(&mut *conn)
            .await?;
        let result = sqlx::query("DELETE FROM books WHERE uid = $1")
            .bind(uid)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Reviews of the book.
    pub async fn reviews(&mut self, uid: Uuid) -> Result<Vec<Review>> {
        ReviewRepo::new(&mut *self.session).all_for_book(uid).await
    }

    /// Tags on the book, by name.
    pub async fn tags(&mut self, uid: Uuid) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as(
            r#"
            SELECT t.uid, t.name, t.created_at
            FROM tags t
            JOIN book_tags bt ON bt.tag_id = t.uid
            WHERE bt.book_id = $1
            ORDER BY t.name, t.uid
            "#,
        )
        .bind(uid)
        .fetch_all(self.session.conn().await?)
        .await?;

        Ok(tags)
    }

    /// Link a tag to the book. Returns false if the link already existed.
    pub async fn add_tag(&mut self, uid: Uuid, tag_uid: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO book_tags (book_id, tag_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(uid)
        .bind(tag_uid)
        .execute(self.session.conn().await?)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Unlink a tag from the book. Neither the book nor the tag is deleted.
    pub async fn remove_tag(&mut self, uid: Uuid, tag_uid: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM book_tags WHERE book_id = $1 AND tag_id = $2")
            .bind(uid)
            .bind(tag_uid)
            .execute(self.session.conn().await?)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All association rows of the book.
    pub async fn tag_links(&mut self, uid: Uuid) -> Result<Vec<BookTag>> {
        let links = sqlx::query_as("SELECT book_id, tag_id FROM book_tags WHERE book_id = $1")
            .bind(uid)
            .fetch_all(self.session.conn().await?)
            .await?;

        Ok(links)
    }

    /// The book with its reviews and tags (three queries, same transaction).
    pub async fn get_with_relations(&mut self, uid: Uuid) -> Result<BookDetails> {
        let book = self.get(uid).await?;
        let reviews = self.reviews(uid).await?;
        let tags = self.tags(uid).await?;

        Ok(BookDetails {
            book,
            reviews,
            tags,
        })
    }
}
