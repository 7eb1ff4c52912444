//! Post store contract and SQLite implementation.
//!
//! # Responsibility
//! - Add, delete and list posts on the borrowed connection.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - No field validation happens here; the schema constraints decide.
//! - `delete` never silently ignores a transient or unknown post.
//! - `find_all` is ordered by ascending id.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::post::{Post, PostId};
use log::{debug, info};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const POST_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    author,
    created_at
FROM posts";

const POST_COLUMNS: [&str; 5] = ["id", "title", "content", "author", "created_at"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from post store operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite error, including constraint violations.
    Db(DbError),
    /// The post has no identity, so the store does not track it.
    Transient,
    /// The post already carries a store identity.
    AlreadyPersisted(PostId),
    /// No row carries this id.
    NotFound(PostId),
    /// Persisted data cannot be converted to a `Post`.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Transient => write!(f, "post is not persisted"),
            Self::AlreadyPersisted(id) => write!(f, "post already persisted: {id}"),
            Self::NotFound(id) => write!(f, "post not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted post data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "post repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "post repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "post repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for post persistence.
pub trait PostRepository {
    /// Persists a transient post and returns it with store-assigned fields.
    fn add(&self, post: Post) -> RepoResult<Post>;
    /// Removes a managed post.
    fn delete(&self, post: &Post) -> RepoResult<()>;
    /// Returns every stored post, ordered by id.
    fn find_all(&self) -> RepoResult<Vec<Post>>;
    /// Returns one post by id.
    fn get(&self, id: PostId) -> RepoResult<Option<Post>>;
}

/// SQLite-backed post repository.
///
/// Build it over a `Transaction` to make every call join that transaction.
pub struct SqlitePostRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePostRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_post_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PostRepository for SqlitePostRepository<'_> {
    fn add(&self, mut post: Post) -> RepoResult<Post> {
        if let Some(id) = post.id {
            return Err(RepoError::AlreadyPersisted(id));
        }

        let (id, created_at) = self.conn.query_row(
            "INSERT INTO posts (title, content, author)
             VALUES (?1, ?2, ?3)
             RETURNING id, created_at;",
            params![post.title.as_str(), post.content.as_str(), post.author.as_deref()],
            |row| Ok((row.get::<_, PostId>(0)?, row.get::<_, i64>(1)?)),
        )?;

        post.id = Some(id);
        post.created_at = Some(created_at);
        info!("event=post_add module=repo status=ok post_id={id}");
        Ok(post)
    }

    fn delete(&self, post: &Post) -> RepoResult<()> {
        let id = post.id.ok_or(RepoError::Transient)?;

        let changed = self.conn.execute("DELETE FROM posts WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        info!("event=post_delete module=repo status=ok post_id={id}");
        Ok(())
    }

    fn find_all(&self) -> RepoResult<Vec<Post>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POST_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut posts = Vec::new();
        while let Some(row) = rows.next()? {
            posts.push(parse_post_row(row)?);
        }

        debug!(
            "event=post_find_all module=repo status=ok count={}",
            posts.len()
        );
        Ok(posts)
    }

    fn get(&self, id: PostId) -> RepoResult<Option<Post>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POST_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_post_row(row)?));
        }

        Ok(None)
    }
}

fn parse_post_row(row: &Row<'_>) -> RepoResult<Post> {
    let id: PostId = row.get("id")?;
    let created_at: Option<i64> = row.get("created_at")?;
    if created_at.is_none() {
        return Err(RepoError::InvalidData(format!(
            "missing created_at for post {id} in posts.created_at"
        )));
    }

    Ok(Post {
        id: Some(id),
        title: row.get("title")?,
        content: row.get("content")?,
        author: row.get("author")?,
        created_at,
    })
}

fn ensure_post_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "posts")? {
        return Err(RepoError::MissingRequiredTable("posts"));
    }

    for column in POST_COLUMNS {
        if !table_has_column(conn, "posts", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "posts",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
