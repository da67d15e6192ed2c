//! Repositories over a session
//!
//! Each repository borrows a `&mut Session` and runs every statement inside
//! that session's transaction. Nothing here commits; the caller decides.
//!
//! Patterns:
//! - lookups by primary key return `DbError::NotFound` when the row is missing
//! - list queries use `COUNT(*) OVER()` for the total (one round trip per page)
//! - related rows are fetched by explicit methods (`books`, `reviews`, `tags`)

pub mod books;
pub mod reviews;
pub mod tags;
pub mod users;

pub use books::BookRepo;
pub use reviews::ReviewRepo;
pub use tags::TagRepo;
pub use users::UserRepo;

use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use crate::error::Result;
use crate::models::{Paginated, Pagination};

/// Build a page from rows that carry a `total` window column.
fn paginate<T>(rows: Vec<PgRow>, page: Pagination) -> Result<Paginated<T>>
where
    T: for<'r> FromRow<'r, PgRow>,
{
    let total = match rows.first() {
        Some(row) => row.try_get::<i64, _>("total")?,
        None => 0,
    };
    let items = rows
        .iter()
        .map(T::from_row)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Paginated {
        items,
        total,
        page: page.page,
        per_page: page.per_page,
    })
}
