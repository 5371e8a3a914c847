// Test fixtures - a throw-away calibre-shaped database on disk
// Only the tables and columns the library core touches are created.

use crate::store::TagStore;
use rusqlite::{params, Connection, OptionalExtension};
use tempfile::TempDir;

const CALIBRE_SUBSET: &str = r#"
    CREATE TABLE books (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL DEFAULT 'Unknown',
        sort TEXT COLLATE NOCASE,
        author_sort TEXT COLLATE NOCASE,
        path TEXT NOT NULL DEFAULT ''
    );
    CREATE TABLE tags (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL COLLATE NOCASE,
        UNIQUE (name)
    );
    CREATE TABLE books_tags_link (
        id INTEGER PRIMARY KEY,
        book INTEGER NOT NULL,
        tag INTEGER NOT NULL,
        UNIQUE (book, tag)
    );
    CREATE TABLE series (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL COLLATE NOCASE,
        sort TEXT COLLATE NOCASE,
        UNIQUE (name)
    );
    CREATE TABLE books_series_link (
        id INTEGER PRIMARY KEY,
        book INTEGER NOT NULL,
        series INTEGER NOT NULL,
        UNIQUE (book)
    );
    CREATE TABLE data (
        id INTEGER PRIMARY KEY,
        book INTEGER NOT NULL,
        format TEXT NOT NULL COLLATE NOCASE,
        uncompressed_size INTEGER NOT NULL DEFAULT 0,
        name TEXT NOT NULL,
        UNIQUE (book, format)
    );
"#;

pub(crate) const MUSIC: &str = "music";
pub(crate) const PREFIX: &str = "musicList";

pub(crate) struct Fixture {
    pub dir: TempDir,
    pub store: TagStore,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("metadata.db");
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(CALIBRE_SUBSET).unwrap();
        Self {
            store: TagStore::new(&db_path),
            dir,
        }
    }

    pub fn conn(&self) -> Connection {
        Connection::open(self.store.path()).unwrap()
    }

    pub fn add_book(&self, id: i64, sort: &str, author: &str, formats: &[&str]) {
        let conn = self.conn();
        let path = format!("{}/{} ({})", author, sort, id);
        conn.execute(
            "INSERT INTO books (id, title, sort, author_sort, path) VALUES (?1, ?2, ?2, ?3, ?4)",
            params![id, sort, author, path],
        )
        .unwrap();
        for format in formats {
            conn.execute(
                "INSERT INTO data (book, format, name) VALUES (?1, ?2, ?3)",
                params![id, format, format!("{} - {}", sort, author)],
            )
            .unwrap();
        }
    }

    /// A music-tagged PDF score.
    pub fn add_score(&self, id: i64, sort: &str, author: &str) {
        self.add_book(id, sort, author, &["PDF"]);
        self.tag_book(id, MUSIC);
    }

    /// Link `book` to the tag called `name`, creating the tag if needed. Returns the tag id.
    pub fn tag_book(&self, book: i64, name: &str) -> i64 {
        let tag = self.ensure_tag(name);
        self.conn()
            .execute(
                "INSERT OR IGNORE INTO books_tags_link (book, tag) VALUES (?1, ?2)",
                params![book, tag],
            )
            .unwrap();
        tag
    }

    pub fn ensure_tag(&self, name: &str) -> i64 {
        let conn = self.conn();
        let existing: Option<i64> = conn
            .query_row("SELECT id FROM tags WHERE name = ?1", params![name], |row| row.get(0))
            .optional()
            .unwrap();
        match existing {
            Some(id) => id,
            None => {
                conn.execute("INSERT INTO tags (name) VALUES (?1)", params![name])
                    .unwrap();
                conn.last_insert_rowid()
            }
        }
    }

    pub fn set_series(&self, book: i64, name: &str) {
        let conn = self.conn();
        conn.execute("INSERT OR IGNORE INTO series (name, sort) VALUES (?1, ?1)", params![name])
            .unwrap();
        conn.execute(
            "INSERT INTO books_series_link (book, series)
             SELECT ?1, id FROM series WHERE name = ?2",
            params![book, name],
        )
        .unwrap();
    }

    pub fn tag_names(&self) -> Vec<String> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT name FROM tags ORDER BY name").unwrap();
        let names = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap();
        names
    }

    pub fn book_tag_names(&self, book: i64) -> Vec<String> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT t.name FROM tags t JOIN books_tags_link btl ON btl.tag = t.id
                 WHERE btl.book = ?1 ORDER BY t.name",
            )
            .unwrap();
        let names = stmt
            .query_map(params![book], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap();
        names
    }
}
