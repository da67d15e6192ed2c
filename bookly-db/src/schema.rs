//! Table definitions and storage initialization
//!
//! Every statement is `IF NOT EXISTS`, so initialization can run on every
//! startup against a store that already holds data.
//!
//! Delete policy:
//! - `books.user_uid`, `reviews.user_uid`, `reviews.book_uid` are set to NULL
//!   when the referenced row goes away (the dependent row survives)
//! - `book_tags` rows cascade with either endpoint; books and tags themselves
//!   never cascade
//!
//! Uniqueness is only enforced on primary keys. Email, username and tag name
//! get plain lookup indexes.

use sqlx::{PgConnection, PgPool};

use crate::error::{DbError, Result};
use crate::session::Session;

/// Tables in creation order (referenced tables first).
pub const TABLES: [&str; 5] = ["users", "books", "reviews", "tags", "book_tags"];

/// Named DDL statements, applied in order.
pub const STATEMENTS: &[(&str, &str)] = &[
    (
        "create users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            uid UUID PRIMARY KEY,
            username VARCHAR NOT NULL,
            email VARCHAR NOT NULL,
            first_name VARCHAR NOT NULL,
            last_name VARCHAR NOT NULL,
            role VARCHAR NOT NULL DEFAULT 'user',
            is_verified BOOLEAN NOT NULL DEFAULT FALSE,
            password_hash VARCHAR NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT LOCALTIMESTAMP,
            update_at TIMESTAMP NOT NULL DEFAULT LOCALTIMESTAMP
        )
        "#,
    ),
    (
        "create books",
        r#"
        CREATE TABLE IF NOT EXISTS books (
            uid UUID PRIMARY KEY,
            title VARCHAR NOT NULL,
            author VARCHAR NOT NULL,
            publisher VARCHAR NOT NULL,
            published_date DATE NOT NULL,
            page_count INTEGER NOT NULL,
            language VARCHAR NOT NULL,
            user_uid UUID REFERENCES users(uid) ON DELETE SET NULL,
            created_at TIMESTAMP NOT NULL DEFAULT LOCALTIMESTAMP,
            update_at TIMESTAMP NOT NULL DEFAULT LOCALTIMESTAMP
        )
        "#,
    ),
    (
        "create reviews",
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            uid UUID PRIMARY KEY,
            rating INTEGER NOT NULL,
            review_text VARCHAR NOT NULL,
            user_uid UUID REFERENCES users(uid) ON DELETE SET NULL,
            book_uid UUID REFERENCES books(uid) ON DELETE SET NULL,
            created_at TIMESTAMP NOT NULL DEFAULT LOCALTIMESTAMP,
            update_at TIMESTAMP NOT NULL DEFAULT LOCALTIMESTAMP
        )
        "#,
    ),
    (
        "create tags",
        r#"
        CREATE TABLE IF NOT EXISTS tags (
            uid UUID PRIMARY KEY,
            name VARCHAR NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT LOCALTIMESTAMP
        )
        "#,
    ),
    (
        "create book_tags",
        r#"
        CREATE TABLE IF NOT EXISTS book_tags (
            book_id UUID NOT NULL REFERENCES books(uid) ON DELETE CASCADE,
            tag_id UUID NOT NULL REFERENCES tags(uid) ON DELETE CASCADE,
            PRIMARY KEY (book_id, tag_id)
        )
        "#,
    ),
    (
        "index users.email",
        "CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)",
    ),
    (
        "index users.username",
        "CREATE INDEX IF NOT EXISTS idx_users_username ON users(username)",
    ),
    (
        "index books.user_uid",
        "CREATE INDEX IF NOT EXISTS idx_books_user ON books(user_uid)",
    ),
    (
        "index reviews.book_uid",
        "CREATE INDEX IF NOT EXISTS idx_reviews_book ON reviews(book_uid)",
    ),
    (
        "index reviews.user_uid",
        "CREATE INDEX IF NOT EXISTS idx_reviews_user ON reviews(user_uid)",
    ),
    (
        "index tags.name",
        "CREATE INDEX IF NOT EXISTS idx_tags_name ON tags(name)",
    ),
    // (book_id, tag_id) is covered by the primary key
    (
        "index book_tags.tag_id",
        "CREATE INDEX IF NOT EXISTS idx_book_tags_tag ON book_tags(tag_id)",
    ),
];

/// Create all tables and indexes in one transaction.
pub async fn create_all(pool: &PgPool) -> Result<()> {
    tracing::info!("Initializing storage schema...");

    let mut tx = pool.begin().await.map_err(DbError::Connect)?;
    for &(name, sql) in STATEMENTS {
        tracing::debug!(statement = name, "applying");
        sqlx::query(sql)
            .execute(&mut *tx)
            .await
            .map_err(|source| DbError::Schema {
                statement: name,
                source,
            })?;
    }
    tx.commit().await.map_err(|source| DbError::Schema {
        statement: "commit",
        source,
    })?;

    tracing::info!(tables = TABLES.len(), "Storage schema ready");
    Ok(())
}

/// Row count per table, in [`TABLES`] order.
pub async fn row_counts(session: &mut Session) -> Result<Vec<(&'static str, i64)>> {
    let mut counts = Vec::with_capacity(TABLES.len());
    for table in TABLES {
        counts.push((table, count_rows(session.conn().await?, table).await?));
    }
    Ok(counts)
}

async fn count_rows(conn: &mut PgConnection, table: &'static str) -> Result<i64> {
    // table names come from TABLES only
    let sql = format!("SELECT COUNT(*) FROM {}", table);
    let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(conn).await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_statement_is_idempotent() {
        for (name, sql) in STATEMENTS {
            assert!(
                sql.contains("IF NOT EXISTS"),
                "statement '{}' is not idempotent",
                name
            );
        }
    }

    #[test]
    fn tables_created_before_they_are_referenced() {
        let position = |table: &str| {
            STATEMENTS
                .iter()
                .position(|(_, sql)| sql.contains(&format!("CREATE TABLE IF NOT EXISTS {} (", table)))
                .unwrap_or_else(|| panic!("no CREATE TABLE for {}", table))
        };

        let order: Vec<usize> = TABLES.iter().map(|&t| position(t)).collect();
        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(order, sorted);
    }

    #[test]
    fn keeps_storage_column_names() {
        let users = STATEMENTS[0].1;
        assert!(users.contains("update_at TIMESTAMP"));
        assert!(users.contains("role VARCHAR NOT NULL DEFAULT 'user'"));
        assert!(users.contains("is_verified BOOLEAN NOT NULL DEFAULT FALSE"));

        let book_tags = STATEMENTS[4].1;
        assert!(book_tags.contains("PRIMARY KEY (book_id, tag_id)"));
    }

    #[test]
    fn no_unique_constraints_beyond_primary_keys() {
        for (_, sql) in STATEMENTS {
            assert!(!sql.to_uppercase().contains("UNIQUE"));
        }
    }

    #[test]
    fn association_cascades_but_entities_do_not() {
        let cascades = STATEMENTS
            .iter()
            .map(|(_, sql)| sql.matches("ON DELETE CASCADE").count())
            .sum::<usize>();
        assert_eq!(cascades, 2);
        assert!(STATEMENTS[4].1.contains("ON DELETE CASCADE"));
    }
}
