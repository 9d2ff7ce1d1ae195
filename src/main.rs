// recents - quick-launch commands for whatever you opened last
//
// This is the main entry point. Parses CLI args and dispatches to handlers.

use recents_lib::{
    config::COMMAND_PREFIX,
    core::{Invocation, Refresher, Searcher},
    db::ItemRecord,
    inspect::{open_file, MacInspector},
    registry::SqliteRegistry,
    Config, Database, RecentsError,
};
use std::env;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

type App = Refresher<MacInspector, SqliteRegistry>;

const DEFAULT_RECENTS_LIMIT: usize = 30;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    let command = &args[1];

    let result = match command.as_str() {
        "refresh" => handle_refresh().await,
        "list" => handle_list(&args[2..]).await,
        "enable" => handle_toggle(&args[2..], true).await,
        "disable" => handle_toggle(&args[2..], false).await,
        "recents" => handle_recents(&args[2..]).await,
        "open" => handle_open(&args[2..]).await,
        "enter" => handle_enter(&args[2..]).await,
        "commands" => handle_commands().await,
        "status" => handle_status().await,
        "version" | "-v" | "--version" => {
            println!("recents v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "-h" | "--help" => {
            print_usage();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            Ok(())
        }
    };

    result.map_err(|e| anyhow::anyhow!(e.user_message()))
}

async fn handle_refresh() -> recents_lib::Result<()> {
    let app = build_app().await?;
    let outcome = app.refresh_apps().await?;

    if outcome.added.is_empty() && outcome.removed.is_empty() {
        println!("Nothing changed.");
    }
    for item in &outcome.added {
        println!("+ {} ({})", item.title, item.id);
    }
    for item in &outcome.removed {
        println!("- {} ({})", item.title, item.id);
    }
    if !outcome.sync.is_clean() {
        eprintln!(
            "Warning: {} command(s) could not be updated, run 'recents refresh' again later.",
            outcome.sync.failures.len()
        );
    }

    Ok(())
}

async fn handle_list(args: &[String]) -> recents_lib::Result<()> {
    let db = open_database().await?;
    let items = db.load_snapshot().await?;

    if args.iter().any(|arg| arg == "--json") {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    print_items(&items);
    Ok(())
}

async fn handle_toggle(args: &[String], enabled: bool) -> recents_lib::Result<()> {
    let Some(id) = args.first() else {
        eprintln!("Error: No item id provided");
        return Ok(());
    };

    let app = build_app().await?;
    let id = resolve_id(app.database(), id).await?;
    let item = app.set_enabled(&id, enabled).await?;

    println!(
        "{} {}",
        if enabled { "✓ Enabled" } else { "✗ Disabled" },
        item.title
    );
    Ok(())
}

async fn handle_recents(args: &[String]) -> recents_lib::Result<()> {
    let Some(id) = args.first() else {
        eprintln!("Error: No item id provided");
        return Ok(());
    };
    let query = args[1..].join(" ");

    show_recents(id, &query).await
}

async fn handle_open(args: &[String]) -> recents_lib::Result<()> {
    let mut file: Option<&str> = None;
    let mut app: Option<&str> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--app" => {
                i += 1;
                app = args.get(i).map(String::as_str);
            }
            arg => file = Some(arg),
        }
        i += 1;
    }

    let Some(file) = file else {
        eprintln!("Error: No file provided");
        return Ok(());
    };

    open_file(file, app).await
}

// What the host runs when the user picks one of our commands
async fn handle_enter(args: &[String]) -> recents_lib::Result<()> {
    let Some(code) = args.first() else {
        eprintln!("Error: No command code provided");
        return Ok(());
    };

    match Invocation::from_code(code) {
        Some(Invocation::Settings) => {
            let app = build_app().await?;
            app.refresh_apps().await?;
            print_items(&app.database().load_snapshot().await?);
            Ok(())
        }
        Some(Invocation::Search { item_id }) => show_recents(&item_id, "").await,
        None => Err(RecentsError::Generic(format!(
            "'{}' is not a {} command",
            code, COMMAND_PREFIX
        ))),
    }
}

async fn handle_commands() -> recents_lib::Result<()> {
    let db = Arc::new(open_database().await?);
    let registry = SqliteRegistry::new(db);
    let commands = registry.list(COMMAND_PREFIX).await?;

    if commands.is_empty() {
        println!("No commands registered. Run 'recents refresh' first.");
        return Ok(());
    }

    println!("\nRegistered commands:");
    println!("{}", "=".repeat(60));
    for command in &commands {
        println!("{}", command.code);
        println!("    {}", command.explanation);
    }
    println!("{}", "=".repeat(60));

    Ok(())
}

async fn handle_status() -> recents_lib::Result<()> {
    let config = Config::from_env()?;
    let db = Database::new(config.db_path()).await?;
    let stats = db.stats().await?;

    println!("\nrecents Status");
    println!("{}", "=".repeat(60));
    println!("\nDatabase:    {}", db.path().display());
    println!("Lists:       {}", config.shared_file_list_dir.display());
    println!("Schema:      v{}", db.schema_version().await?);
    println!("\nTracked items:       {}", stats.total_items);
    println!("Disabled items:      {}", stats.disabled_items);
    println!("Registered commands: {}", stats.registered_commands);
    println!(
        "Last refresh:        {}",
        stats.last_saved_at.as_deref().unwrap_or("never")
    );
    println!("{}", "=".repeat(60));

    Ok(())
}

async fn show_recents(id: &str, query: &str) -> recents_lib::Result<()> {
    let app = build_app().await?;
    let id = resolve_id(app.database(), id).await?;
    let item = app
        .database()
        .get_item(&id)
        .await?
        .ok_or(RecentsError::ItemNotFound(id))?;

    let searcher = Searcher::new(app.inspector());
    let documents = searcher.search(&item, query, DEFAULT_RECENTS_LIMIT).await;

    if documents.is_empty() {
        println!("No recent documents for {}.", item.title);
        return Ok(());
    }

    println!("\nRecent documents of {}:", item.title);
    println!("{}", "=".repeat(60));
    for (i, doc) in documents.iter().enumerate() {
        println!("{:3}. {}", i + 1, doc.file_name);
        println!("     {}", doc.path);
    }
    println!("{}", "=".repeat(60));

    Ok(())
}

fn print_items(items: &[ItemRecord]) {
    if items.is_empty() {
        println!("No items tracked yet. Run 'recents refresh'.");
        return;
    }

    println!("\nTracked items:");
    println!("{}", "=".repeat(60));
    for item in items {
        let status = if item.enabled { "✓" } else { "✗" };
        let kind = if item.is_bucket { " [finder]" } else { "" };
        println!("  {} {}{}", status, item.title, kind);
        println!("      {}", item.id);
    }
    println!("{}", "=".repeat(60));
}

async fn open_database() -> recents_lib::Result<Database> {
    let config = Config::from_env()?;
    Database::new(config.db_path()).await
}

async fn build_app() -> recents_lib::Result<App> {
    let config = Config::from_env()?;
    let db = Arc::new(Database::new(config.db_path()).await?);
    let registry = SqliteRegistry::new(Arc::clone(&db));

    Ok(Refresher::new(db, MacInspector::new(config), registry))
}

// App ids are stored lower-cased, bucket ids keep the list file's casing
async fn resolve_id(db: &Database, raw: &str) -> recents_lib::Result<String> {
    if db.get_item(raw).await?.is_some() {
        return Ok(raw.to_string());
    }
    Ok(raw.to_lowercase())
}

fn print_usage() {
    println!(
        r#"recents v{} - Quick-launch whatever you opened last

USAGE:
    recents <COMMAND> [OPTIONS]

COMMANDS:
    refresh                Rescan recent lists and update commands
    list [--json]          Show tracked items
    enable <id>            Register the command for an item again
    disable <id>           Drop an item's command and keep it off
    recents <id> [query]   Show an item's recent documents
    open <file> [--app A]  Open a file, optionally with a given app
    enter <code>           Run the entry point for a command code
    commands               Show registered commands
    status                 Show status and stats
    version                Show version
    help                   Show this help

EXAMPLES:
    recents refresh
    recents disable com.apple.safari
    recents recents com.apple.textedit notes
    recents enter recents-setting

Set RUST_LOG=debug for detailed logs.
"#,
        env!("CARGO_PKG_VERSION")
    );
}
