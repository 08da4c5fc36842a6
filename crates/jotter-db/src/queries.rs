use rusqlite::{Connection, OptionalExtension, Row, ffi};

use crate::error::constraint_code;
use crate::models::{OwnerCheck, PostRow, UserRow};
use crate::{Database, DbError, Result};

const POST_COLUMNS: &str = "p.id, p.title, p.content, p.user_id, u.username, p.created_at, p.updated_at";

impl Database {
    // -- Users --

    /// Insert a user. The password must already be hashed.
    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<UserRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, password) VALUES (?1, ?2)",
                (username, password_hash),
            )
            .map_err(|e| match constraint_code(&e) {
                Some(ffi::SQLITE_CONSTRAINT_UNIQUE) => DbError::UsernameTaken(username.to_string()),
                _ => e.into(),
            })?;

            let id = conn.last_insert_rowid();
            query_user(conn, "id = ?1", id)?.ok_or(DbError::UnknownUser(id))
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username = ?1", username))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id = ?1", id))
    }

    // -- Posts --

    pub fn create_post(&self, user_id: i64, title: &str, content: &str) -> Result<PostRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO posts (title, content, user_id) VALUES (?1, ?2, ?3)",
                (title, content, user_id),
            )
            .map_err(|e| match constraint_code(&e) {
                Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => DbError::UnknownUser(user_id),
                _ => e.into(),
            })?;

            let id = conn.last_insert_rowid();
            query_post(conn, id)?.ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
        })
    }

    /// Every post, oldest first, with its author's username.
    pub fn list_posts(&self) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {POST_COLUMNS}
                 FROM posts p
                 JOIN users u ON p.user_id = u.id
                 ORDER BY p.id"
            ))?;

            let rows = stmt
                .query_map([], post_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn get_post(&self, id: i64) -> Result<Option<PostRow>> {
        self.with_conn(|conn| query_post(conn, id))
    }

    /// Overwrite title and content, provided `user_id` owns the post.
    /// Ownership check and write share one transaction.
    pub fn update_post(
        &self,
        id: i64,
        user_id: i64,
        title: &str,
        content: &str,
    ) -> Result<OwnerCheck<PostRow>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            match owner_of(&tx, id)? {
                None => return Ok(OwnerCheck::NotFound),
                Some(owner) if owner != user_id => return Ok(OwnerCheck::NotOwner),
                Some(_) => {}
            }

            tx.execute(
                "UPDATE posts SET title = ?1, content = ?2, updated_at = datetime('now') WHERE id = ?3",
                (title, content, id),
            )?;
            let row = query_post(&tx, id)?;
            tx.commit()?;

            Ok(row.map_or(OwnerCheck::NotFound, OwnerCheck::Applied))
        })
    }

    /// Remove a post, provided `user_id` owns it.
    pub fn delete_post(&self, id: i64, user_id: i64) -> Result<OwnerCheck<()>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            match owner_of(&tx, id)? {
                None => return Ok(OwnerCheck::NotFound),
                Some(owner) if owner != user_id => return Ok(OwnerCheck::NotOwner),
                Some(_) => {}
            }

            tx.execute("DELETE FROM posts WHERE id = ?1", [id])?;
            tx.commit()?;

            Ok(OwnerCheck::Applied(()))
        })
    }
}

fn query_user<P: rusqlite::ToSql>(conn: &Connection, filter: &str, value: P) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, username, password, created_at FROM users WHERE {filter}"
    ))?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_post(conn: &Connection, id: i64) -> Result<Option<PostRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {POST_COLUMNS}
         FROM posts p
         JOIN users u ON p.user_id = u.id
         WHERE p.id = ?1"
    ))?;

    Ok(stmt.query_row([id], post_from_row).optional()?)
}

fn owner_of(conn: &Connection, post_id: i64) -> Result<Option<i64>> {
    Ok(conn
        .query_row("SELECT user_id FROM posts WHERE id = ?1", [post_id], |r| r.get(0))
        .optional()?)
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        user_id: row.get(3)?,
        author_username: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
