//! Repositories against tables created by earlier deployments
//!
//! Those tables have nullable timestamps without server defaults and plain
//! foreign keys (no ON DELETE actions). `initialize` leaves them as they are,
//! so every write path has to work on them unchanged.
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p bookly-db -- --ignored
//!
//! Each test builds the tables in its own PostgreSQL schema and drops it at
//! the end.

use bookly_db::models::{NewBook, NewReview, NewTag, NewUser};
use bookly_db::{BookRepo, DatabaseConfig, ReviewRepo, Storage, TagRepo, UserRepo};
use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

const LEGACY_DDL: &[&str] = &[
    r#"
    CREATE TABLE users (
        uid UUID NOT NULL,
        username VARCHAR NOT NULL,
        email VARCHAR NOT NULL,
        first_name VARCHAR NOT NULL,
        last_name VARCHAR NOT NULL,
        role VARCHAR DEFAULT 'user' NOT NULL,
        is_verified BOOLEAN,
        password_hash VARCHAR NOT NULL,
        created_at TIMESTAMP WITHOUT TIME ZONE,
        update_at TIMESTAMP WITHOUT TIME ZONE,
        PRIMARY KEY (uid)
    )
    "#,
    r#"
    CREATE TABLE books (
        uid UUID NOT NULL,
        title VARCHAR NOT NULL,
        author VARCHAR NOT NULL,
        publisher VARCHAR NOT NULL,
        published_date DATE NOT NULL,
        page_count INTEGER NOT NULL,
        language VARCHAR NOT NULL,
        user_uid UUID,
        created_at TIMESTAMP WITHOUT TIME ZONE,
        update_at TIMESTAMP WITHOUT TIME ZONE,
        PRIMARY KEY (uid),
        FOREIGN KEY(user_uid) REFERENCES users (uid)
    )
    "#,
    r#"
    CREATE TABLE reviews (
        uid UUID NOT NULL,
        rating INTEGER NOT NULL,
        review_text VARCHAR NOT NULL,
        user_uid UUID,
        book_uid UUID,
        created_at TIMESTAMP WITHOUT TIME ZONE,
        update_at TIMESTAMP WITHOUT TIME ZONE,
        PRIMARY KEY (uid),
        FOREIGN KEY(user_uid) REFERENCES users (uid),
        FOREIGN KEY(book_uid) REFERENCES books (uid)
    )
    "#,
    r#"
    CREATE TABLE tags (
        uid UUID NOT NULL,
        name VARCHAR NOT NULL,
        created_at TIMESTAMP WITHOUT TIME ZONE,
        PRIMARY KEY (uid)
    )
    "#,
    r#"
    CREATE TABLE book_tags (
        book_id UUID NOT NULL,
        tag_id UUID NOT NULL,
        PRIMARY KEY (book_id, tag_id),
        FOREIGN KEY(book_id) REFERENCES books (uid),
        FOREIGN KEY(tag_id) REFERENCES tags (uid)
    )
    "#,
];

/// A storage whose connections resolve table names in a fresh schema
/// holding the legacy tables.
struct LegacyStore {
    admin: PgPool,
    schema: String,
    storage: Storage,
}

impl LegacyStore {
    async fn create() -> Self {
        let config = DatabaseConfig::new(
            std::env::var("DATABASE_URL").expect("DATABASE_URL required"),
        );
        let admin = PgPool::connect_with(config.connect_options().unwrap())
            .await
            .expect("connect failed");

        let schema = format!("legacy_{}", Uuid::new_v4().simple());
        sqlx::query(&format!("CREATE SCHEMA {}", schema))
            .execute(&admin)
            .await
            .unwrap();

        let options = config
            .connect_options()
            .unwrap()
            .options([("search_path", schema.as_str())]);
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await
            .expect("connect failed");
        for ddl in LEGACY_DDL {
            sqlx::query(ddl).execute(&pool).await.unwrap();
        }

        let storage = Storage::from_pool(pool);
        storage.initialize().await.expect("initialize on legacy tables failed");

        Self {
            admin,
            schema,
            storage,
        }
    }

    async fn teardown(self) {
        self.storage.close().await;
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&self.admin)
            .await
            .unwrap();
        self.admin.close().await;
    }
}

fn sample_book() -> NewBook {
    NewBook {
        title: "Kindred".into(),
        author: "Octavia E. Butler".into(),
        publisher: "Doubleday".into(),
        published_date: NaiveDate::from_ymd_opt(1979, 6, 1).unwrap(),
        page_count: 264,
        language: "en".into(),
        user_uid: None,
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn creates_round_trip_on_legacy_tables() {
    let store = LegacyStore::create().await;
    let mut session = store.storage.session().await.unwrap();

    let user = UserRepo::new(&mut session)
        .create(NewUser::new("dana", "dana@example.com", "Dana", "Franklin", "hash"))
        .await
        .expect("user create on legacy tables");
    let book = BookRepo::new(&mut session)
        .create(sample_book().owned_by(user.uid))
        .await
        .expect("book create on legacy tables");
    let review = ReviewRepo::new(&mut session)
        .create(NewReview::new(5, "unsettling").by(user.uid).of(book.uid))
        .await
        .expect("review create on legacy tables");
    let tag = TagRepo::new(&mut session)
        .create(NewTag::new("time-travel"))
        .await
        .expect("tag create on legacy tables");
    assert!(BookRepo::new(&mut session).add_tag(book.uid, tag.uid).await.unwrap());
    session.commit().await.unwrap();

    assert_eq!(user.created_at, user.updated_at);
    assert_eq!(UserRepo::new(&mut session).get(user.uid).await.unwrap(), user);
    assert_eq!(BookRepo::new(&mut session).get(book.uid).await.unwrap(), book);
    assert_eq!(ReviewRepo::new(&mut session).get(review.uid).await.unwrap(), review);
    assert_eq!(TagRepo::new(&mut session).get(tag.uid).await.unwrap(), tag);

    let details = BookRepo::new(&mut session)
        .get_with_relations(book.uid)
        .await
        .unwrap();
    assert_eq!(details.reviews, vec![review]);
    assert_eq!(details.tags, vec![tag]);

    session.close();
    store.teardown().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn deletes_keep_dependents_on_legacy_tables() {
    let store = LegacyStore::create().await;
    let mut session = store.storage.session().await.unwrap();

    let user = UserRepo::new(&mut session)
        .create(NewUser::new("lin", "lin@example.com", "Lin", "Reader", "hash"))
        .await
        .unwrap();
    let book = BookRepo::new(&mut session)
        .create(sample_book().owned_by(user.uid))
        .await
        .unwrap();
    let review = ReviewRepo::new(&mut session)
        .create(NewReview::new(4, "good").by(user.uid).of(book.uid))
        .await
        .unwrap();
    let tag = TagRepo::new(&mut session)
        .create(NewTag::new("classic"))
        .await
        .unwrap();
    let other = TagRepo::new(&mut session)
        .create(NewTag::new("novel"))
        .await
        .unwrap();
    BookRepo::new(&mut session).add_tag(book.uid, tag.uid).await.unwrap();
    BookRepo::new(&mut session).add_tag(book.uid, other.uid).await.unwrap();
    session.commit().await.unwrap();

    // user delete clears owner and author instead of failing on the plain FKs
    assert!(UserRepo::new(&mut session).delete(user.uid).await.unwrap());
    let kept = BookRepo::new(&mut session).get(book.uid).await.unwrap();
    assert_eq!(kept.user_uid, None);
    let kept = ReviewRepo::new(&mut session).get(review.uid).await.unwrap();
    assert_eq!(kept.user_uid, None);
    assert_eq!(kept.book_uid, Some(book.uid));

    // tag delete removes only its link
    assert!(TagRepo::new(&mut session).delete(tag.uid).await.unwrap());
    let tags = BookRepo::new(&mut session).tags(book.uid).await.unwrap();
    assert_eq!(tags, vec![other.clone()]);

    // book delete orphans the review and drops the remaining link
    assert!(BookRepo::new(&mut session).delete(book.uid).await.unwrap());
    let orphan = ReviewRepo::new(&mut session).get(review.uid).await.unwrap();
    assert!(orphan.is_orphaned());
    assert!(TagRepo::new(&mut session).books(other.uid).await.unwrap().is_empty());
    TagRepo::new(&mut session).get(other.uid).await.unwrap();

    session.commit().await.unwrap();
    session.close();
    store.teardown().await;
}
