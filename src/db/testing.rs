use std::cell::Cell;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rusqlite::{params, Connection};

use crate::db::apply_migrations;
use crate::extractors::CurrentUser;

/// Migrated in-memory database seeded with users `alice`, `bob` and `carol`.
pub(crate) struct Fixture {
    conn: Connection,
    clock: Cell<i64>,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        apply_migrations(&conn).unwrap();

        for id in ["alice", "bob", "carol"] {
            let name = format!("{}{}", id[..1].to_uppercase(), &id[1..]);
            conn.execute(
                "INSERT INTO users (id, email, name, image) VALUES (?1, ?2, ?3, ?4)",
                params![
                    id,
                    format!("{}@example.com", id),
                    name,
                    format!("https://img.example/{}.png", id)
                ],
            )
            .unwrap();
        }

        Fixture {
            conn,
            clock: Cell::new(0),
        }
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn viewer(&self, id: &str) -> CurrentUser {
        let (name, image) = self
            .conn
            .query_row(
                "SELECT name, image FROM users WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        CurrentUser {
            id: id.to_string(),
            name,
            image,
        }
    }

    /// Next timestamp, one minute after the previous one.
    pub(crate) fn tick(&self) -> DateTime<Utc> {
        let n = self.clock.get() + 1;
        self.clock.set(n);
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(n)
    }

    /// Insert a published post authored by `author_id`; returns its id.
    pub(crate) fn insert_post(&self, author_id: &str, anonymous: bool) -> String {
        let id = uuid::Uuid::now_v7().to_string();
        let at = self.tick();
        self.conn
            .execute(
                "INSERT INTO posts (id, title, content, content_html, anonymous, author_id, created_at, updated_at)
                 VALUES (?1, ?2, 'body', '<p>body</p>', ?3, ?4, ?5, ?5)",
                params![id, format!("post {}", self.clock.get()), anonymous, author_id, at],
            )
            .unwrap();
        id
    }

    pub(crate) fn insert_comment(&self, post_id: &str, author_id: &str) -> String {
        let id = uuid::Uuid::now_v7().to_string();
        self.conn
            .execute(
                "INSERT INTO comments (id, content, author_id, post_id, created_at)
                 VALUES (?1, 'reply', ?2, ?3, ?4)",
                params![id, author_id, post_id, self.tick()],
            )
            .unwrap();
        id
    }
}
