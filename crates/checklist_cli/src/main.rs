//! CLI probe for the checklist core.
//!
//! # Responsibility
//! - Open the configured database and print read-only views of it.
//! - Keep output deterministic for quick local sanity checks.

use checklist_core::{
    init_logging_from_config, open_db, Category, CategoryService, CoreConfig,
    SqliteCategoryRepository, SqliteObjectRepository, SqliteQuestRepository, StepService,
};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use uuid::Uuid;

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Parser, Debug)]
#[command(name = "checklist")]
#[command(about = "Inspect the checklist catalog database", version)]
struct Args {
    /// Database file; overrides CHECKLIST_DB_PATH
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print core linkage info
    Ping,
    /// List root categories
    Roots,
    /// List direct children of a category
    Children { id: Uuid },
    /// Print the ancestor chain of a category, nearest first
    Chain { id: Uuid },
    /// Print the ancestor chain of every category
    Tree,
    /// List the steps of a quest in order
    Steps { quest_id: Uuid },
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> CliResult {
    let mut config = CoreConfig::from_env()?;
    if let Some(db) = args.db {
        config.db_path = db;
    }
    init_logging_from_config(&config)?;
    log::info!("event=app_start module=cli status=ok");

    if let Command::Ping = args.command {
        println!("checklist_core ping={}", checklist_core::ping());
        println!("checklist_core version={}", checklist_core::core_version());
        return Ok(());
    }

    let conn = open_db(&config.db_path)?;
    match args.command {
        Command::Ping => Ok(()),
        Command::Roots => print_categories(&category_service(&conn)?.list_roots()?),
        Command::Children { id } => {
            print_categories(&category_service(&conn)?.list_children(id)?)
        }
        Command::Chain { id } => {
            let chain = category_service(&conn)?.ancestor_chain(id)?;
            println!("{}", format_chain(&chain));
            Ok(())
        }
        Command::Tree => {
            for path in category_service(&conn)?.category_tree()? {
                println!("{}\t{}", path.depth(), format_chain(&path.chain));
            }
            Ok(())
        }
        Command::Steps { quest_id } => {
            let service = StepService::new(SqliteQuestRepository::try_new(&conn)?);
            for (index, step) in service.list_steps(quest_id)?.iter().enumerate() {
                let mark = if step.status { 'x' } else { ' ' };
                println!("{:>3}. [{mark}] {}\t{}", index + 1, step.text, step.id);
            }
            Ok(())
        }
    }
}

fn category_service(
    conn: &Connection,
) -> Result<
    CategoryService<SqliteCategoryRepository<'_>, SqliteObjectRepository<'_>>,
    Box<dyn Error>,
> {
    Ok(CategoryService::new(
        SqliteCategoryRepository::try_new(conn)?,
        SqliteObjectRepository::try_new(conn)?,
    ))
}

fn print_categories(categories: &[Category]) -> CliResult {
    for category in categories {
        println!("{}\t{}", category.id, category.name);
    }
    Ok(())
}

fn format_chain(chain: &[Category]) -> String {
    chain
        .iter()
        .map(|category| category.name.as_str())
        .collect::<Vec<_>>()
        .join(" < ")
}
