use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

const STORE_CRATE: &str = "crates/deeds-store-sqlite";

#[derive(Error, Debug)]
enum XtaskError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Environment variable not set: {0}")]
    VarError(#[from] std::env::VarError),
    #[error("Failed to read migrations directory: {0}")]
    ReadMigrations(String),
    #[error("No migration files found in {0}")]
    NoMigrations(String),
    #[error("Failed to read migration {0}: {1}")]
    ReadMigration(String, std::io::Error),
    #[error("Failed to run sqlite3. Is it installed?")]
    Sqlite3NotFound,
    #[error("Migration failed: {0}")]
    MigrationFailed(String),
    #[error("Invalid migration name {0:?}: use lowercase letters, digits and underscores")]
    InvalidMigrationName(String),
    #[error("Failed to get parent directory")]
    NoParentDir,
}

type Result<T> = std::result::Result<T, XtaskError>;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tasks for the deeds workspace")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recreate the SQLite development database from the migrations
    SetupDb,
    /// Create an empty, timestamped migration file
    NewMigration {
        /// Short snake_case description, e.g. add_round_notes
        name: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::SetupDb => setup_db(),
        Commands::NewMigration { name } => new_migration(&name),
    }
}

fn migration_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut migrations: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| XtaskError::ReadMigrations(e.to_string()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|ext| ext == "sql").unwrap_or(false))
        .collect();
    migrations.sort();
    Ok(migrations)
}

fn setup_db() -> Result<()> {
    println!("🔧 Setting up SQLite development database...");

    let project_root = project_root()?;
    let db_path = project_root.join(STORE_CRATE).join("dev.db");
    let migration_dir = project_root.join(STORE_CRATE).join("migrations");

    if db_path.exists() {
        std::fs::remove_file(&db_path)?;
    }

    let migrations = migration_files(&migration_dir)?;
    if migrations.is_empty() {
        return Err(XtaskError::NoMigrations(
            migration_dir.display().to_string(),
        ));
    }

    for path in migrations {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("  Applying: {}", file_name);

        let sql = std::fs::read_to_string(&path)
            .map_err(|e| XtaskError::ReadMigration(path.display().to_string(), e))?;

        let status = Command::new("sqlite3")
            .arg(&db_path)
            .arg(&sql)
            .status()
            .map_err(|_| XtaskError::Sqlite3NotFound)?;

        if !status.success() {
            return Err(XtaskError::MigrationFailed(path.display().to_string()));
        }
    }

    println!("✓ SQLite database created at: {}", db_path.display());
    println!();
    println!("Run the server against it with:");
    println!(
        "  DATABASE_URL=sqlite://{} cargo run -p deeds-server -- serve",
        db_path.display()
    );

    Ok(())
}

fn new_migration(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if !valid {
        return Err(XtaskError::InvalidMigrationName(name.to_string()));
    }

    let migration_dir = project_root()?.join(STORE_CRATE).join("migrations");
    let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S");
    let path = migration_dir.join(format!("{stamp}_{name}.sql"));
    std::fs::write(&path, format!("-- {name}\n"))?;

    println!("✓ Created {}", path.display());
    Ok(())
}

fn project_root() -> Result<PathBuf> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")?;
    let xtask_dir = PathBuf::from(manifest_dir);
    let parent = xtask_dir.parent().ok_or(XtaskError::NoParentDir)?;
    Ok(parent.to_path_buf())
}
