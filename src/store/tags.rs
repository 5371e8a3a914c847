use super::{starts_with_pattern, StoreSession};
use crate::error::StoreResult;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

impl StoreSession {
    /// All tags whose name starts with `prefix`, newest name first (descending).
    pub fn tags_starting_with(&self, prefix: &str) -> StoreResult<Vec<Tag>> {
        self.query(
            "SELECT id, name FROM tags WHERE name LIKE ?1 ESCAPE '\\' ORDER BY name DESC",
            params![starts_with_pattern(prefix)],
            |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
    }

    /// Tags starting with `prefix` that are linked to `book`, descending by name.
    pub fn book_tags_starting_with(&self, book: i64, prefix: &str) -> StoreResult<Vec<Tag>> {
        self.query(
            "SELECT t.id, t.name FROM tags t
             INNER JOIN books_tags_link btl ON btl.tag = t.id
             WHERE btl.book = ?1 AND t.name LIKE ?2 ESCAPE '\\'
             ORDER BY t.name DESC",
            params![book, starts_with_pattern(prefix)],
            |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
    }

    pub fn find_tag(&self, name: &str) -> StoreResult<Option<Tag>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name FROM tags WHERE name = ?1",
                params![name],
                |row| {
                    Ok(Tag {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?)
    }

    pub fn insert_tag(&self, name: &str) -> StoreResult<Tag> {
        let id = self.insert("INSERT INTO tags (name) VALUES (?1)", params![name])?;
        Ok(Tag {
            id,
            name: name.to_string(),
        })
    }

    pub fn delete_tag(&self, tag: i64) -> StoreResult<usize> {
        self.execute("DELETE FROM tags WHERE id = ?1", params![tag])
    }

    pub fn link_tag(&self, tag: i64, book: i64) -> StoreResult<()> {
        self.execute(
            "INSERT INTO books_tags_link (tag, book) VALUES (?1, ?2)",
            params![tag, book],
        )?;
        Ok(())
    }

    pub fn unlink_tag(&self, tag: i64, book: i64) -> StoreResult<usize> {
        self.execute(
            "DELETE FROM books_tags_link WHERE tag = ?1 AND book = ?2",
            params![tag, book],
        )
    }

    /// Number of items linked to `tag` anywhere in the store.
    pub fn tag_link_count(&self, tag: i64) -> StoreResult<i64> {
        Ok(self.conn.query_row(
            "SELECT count(1) FROM books_tags_link WHERE tag = ?1",
            params![tag],
            |row| row.get(0),
        )?)
    }

    pub fn book_has_tag(&self, book: i64, tag: i64) -> StoreResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT count(*) FROM books_tags_link WHERE book = ?1 AND tag = ?2",
            params![book, tag],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
