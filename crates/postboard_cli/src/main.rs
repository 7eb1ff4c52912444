//! Command-line front end for the Postboard store.
//!
//! # Responsibility
//! - Map `add|delete|list|show` onto `PostService` calls.
//! - Run every command inside one store transaction; reads use a deferred one.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use postboard_core::config::{ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
use postboard_core::{
    init_logging, open_db, with_read_transaction, with_transaction, AppConfig, Post, PostId,
    PostService, RepoError, RepoResult, SqlitePostRepository,
};
use rusqlite::Connection;
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "postboard", version, about = "Add, delete and list posts")]
struct Cli {
    /// SQLite database file. Overrides POSTBOARD_DB.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log level. Overrides POSTBOARD_LOG_LEVEL.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute log directory. Overrides POSTBOARD_LOG_DIR.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Persist a new post and print it.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        author: Option<String>,
    },
    /// Delete the post with this id.
    Delete { id: PostId },
    /// Print every post as a JSON array.
    List,
    /// Print one post.
    Show { id: PostId },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli, |key| std::env::var_os(key))?;

    if let Some(log_dir) = config.log_dir.as_ref() {
        init_logging(config.log_level, log_dir).map_err(anyhow::Error::msg)?;
    }
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        config.db_path.display()
    );

    let mut conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open `{}`", config.db_path.display()))?;
    let stdout = std::io::stdout();
    run(&mut conn, cli.command, &mut stdout.lock())
}

/// Flags win over values found through `env`.
///
/// Path flags are handed over as `OsString`, so non-UTF-8 paths survive.
fn resolve_config<F>(cli: &Cli, env: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<OsString>,
{
    let config = AppConfig::from_lookup(|key| {
        let flag = match key {
            ENV_DB_PATH => cli.db.clone().map(PathBuf::into_os_string),
            ENV_LOG_LEVEL => cli.log_level.clone().map(OsString::from),
            ENV_LOG_DIR => cli.log_dir.clone().map(PathBuf::into_os_string),
            _ => None,
        };
        flag.or_else(|| env(key))
    })?;
    Ok(config)
}

/// Result of one command, rendered after the transaction ends.
#[derive(Debug)]
enum Outcome {
    Post(Post),
    Posts(Vec<Post>),
    Deleted(PostId),
}

fn run(conn: &mut Connection, command: Command, out: &mut impl Write) -> Result<()> {
    let outcome = match command {
        Command::Add {
            title,
            content,
            author,
        } => with_transaction(conn, |tx| {
            post_service(tx)?
                .add_post(title, content, author)
                .map(Outcome::Post)
        }),
        Command::Delete { id } => with_transaction(conn, |tx| {
            post_service(tx)?.delete_by_id(id).map(|_| Outcome::Deleted(id))
        }),
        Command::List => with_read_transaction(conn, |tx| {
            post_service(tx)?.find_all().map(Outcome::Posts)
        }),
        Command::Show { id } => with_read_transaction(conn, |tx| {
            post_service(tx)?
                .get(id)?
                .map(Outcome::Post)
                .ok_or(RepoError::NotFound(id))
        }),
    };

    let rendered = match outcome {
        Ok(Outcome::Post(post)) => serde_json::to_string_pretty(&post)?,
        Ok(Outcome::Posts(posts)) => serde_json::to_string_pretty(&posts)?,
        Ok(Outcome::Deleted(id)) => format!("deleted post {id}"),
        Err(RepoError::NotFound(id)) => bail!("post not found: {id}"),
        Err(err) => return Err(err.into()),
    };
    writeln!(out, "{rendered}")?;
    Ok(())
}

fn post_service(conn: &Connection) -> RepoResult<PostService<SqlitePostRepository<'_>>> {
    Ok(PostService::new(SqlitePostRepository::try_new(conn)?))
}

#[cfg(test)]
mod tests {
    use super::{resolve_config, run, Cli, Command};
    use clap::Parser;
    use postboard_core::config::{ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
    use postboard_core::open_db_in_memory;
    use std::ffi::OsString;
    use std::path::PathBuf;

    fn run_to_string(conn: &mut rusqlite::Connection, command: Command) -> anyhow::Result<String> {
        let mut out = Vec::new();
        run(conn, command, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn add_list_delete_flow() {
        let mut conn = open_db_in_memory().unwrap();

        let added = run_to_string(
            &mut conn,
            Command::Add {
                title: "cli".to_string(),
                content: "from the terminal".to_string(),
                author: None,
            },
        )
        .unwrap();
        let added: serde_json::Value = serde_json::from_str(&added).unwrap();
        let id = added["id"].as_i64().unwrap();

        let listed = run_to_string(&mut conn, Command::List).unwrap();
        let listed: serde_json::Value = serde_json::from_str(&listed).unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let deleted = run_to_string(&mut conn, Command::Delete { id }).unwrap();
        assert!(deleted.contains("deleted post"));

        let listed = run_to_string(&mut conn, Command::List).unwrap();
        assert_eq!(listed.trim(), "[]");
    }

    #[test]
    fn missing_post_is_an_error() {
        let mut conn = open_db_in_memory().unwrap();

        let err = run_to_string(&mut conn, Command::Show { id: 9 }).unwrap_err();
        assert!(err.to_string().contains("post not found: 9"));
        let err = run_to_string(&mut conn, Command::Delete { id: 9 }).unwrap_err();
        assert!(err.to_string().contains("post not found: 9"));
    }

    #[test]
    fn parses_global_db_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["postboard", "list", "--db", "/tmp/x.db"]).unwrap();
        assert!(matches!(cli.command, Command::List));
        assert_eq!(cli.db.unwrap().to_str(), Some("/tmp/x.db"));
    }

    #[test]
    fn flags_override_environment_values() {
        let cli = Cli::try_parse_from([
            "postboard",
            "--db",
            "/tmp/flag.db",
            "--log-level",
            "error",
            "list",
        ])
        .unwrap();
        let env = |key: &str| match key {
            ENV_DB_PATH => Some(OsString::from("/tmp/env.db")),
            ENV_LOG_LEVEL => Some(OsString::from("trace")),
            ENV_LOG_DIR => Some(OsString::from("/tmp/env-logs")),
            _ => None,
        };

        let config = resolve_config(&cli, env).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/flag.db"));
        assert_eq!(config.log_level, "error");
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/env-logs")));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_db_flag_is_kept_verbatim() {
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(b"/tmp/posts-\xff.db".to_vec());
        let cli = Cli::try_parse_from([
            OsString::from("postboard"),
            OsString::from("--db"),
            raw.clone(),
            OsString::from("list"),
        ])
        .unwrap();

        let config = resolve_config(&cli, |_| None).unwrap();
        assert_eq!(config.db_path.as_os_str(), raw.as_os_str());
    }

    #[test]
    fn show_prints_stored_post() {
        let mut conn = open_db_in_memory().unwrap();
        run_to_string(
            &mut conn,
            Command::Add {
                title: "quoted \"title\"".to_string(),
                content: "body".to_string(),
                author: Some("kay".to_string()),
            },
        )
        .unwrap();

        let shown = run_to_string(&mut conn, Command::Show { id: 1 }).unwrap();
        let shown: serde_json::Value = serde_json::from_str(&shown).unwrap();
        assert_eq!(shown["title"], "quoted \"title\"");
        assert_eq!(shown["author"], "kay");
    }
}
