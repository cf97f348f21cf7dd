use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use laneboard::db;
use laneboard_web::{router, AppState};

#[derive(Parser)]
#[command(name = "laneboard-server", about = "JSON REST server for laneboard")]
struct Args {
    /// Path to the SQLite database (default: ~/.laneboard/laneboard.db)
    #[arg(long, env = "LANEBOARD_DB")]
    db: Option<String>,

    /// Address to listen on
    #[arg(long, env = "LANEBOARD_LISTEN", default_value = "127.0.0.1:7171")]
    listen: String,
}

fn default_db_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".laneboard").join("laneboard.db"))
}

fn resolve_db_path(cli_db: Option<String>) -> Result<String> {
    match cli_db {
        Some(p) => Ok(p),
        None => {
            let path = default_db_path()?;
            Ok(path
                .to_str()
                .context("default DB path is not valid UTF-8")?
                .to_string())
        }
    }
}

fn ensure_db_dir(db_path: &str) -> Result<()> {
    if let Some(parent) = std::path::Path::new(db_path).parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let db_path = resolve_db_path(args.db)?;
    ensure_db_dir(&db_path)?;
    let conn = db::open(&db_path)?;
    db::init(&conn)?;

    let app = router(AppState::new(conn));
    let listener = tokio::net::TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;
    log::info!("listening on {} (db: {db_path})", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
