mod catalog;
mod cli;
mod config;
mod error;
mod launch;
mod menu;
mod platform;
mod probe;
mod scanner;
mod selection;
mod types;
mod version;


use anyhow::{anyhow, Context, Result};
use catalog::{discover, Catalog};
use chrono::Utc;
use clap::Parser;
use cli::{Cli, Commands, ConfigAction};
use config::{
    display_value, get_preferences_file_path, load_preferences, normalize_key, resolve_scan_root,
    save_preferences, shortcut_value, with_install_path, with_shortcut, without_install_path,
};
use menu::{Menu, MenuOutcome};
use std::path::{Path, PathBuf};
use types::{OutputFormat, Preferences};

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli)?;

    match cli.command {
        None => {
            let prefs = match load_preferences() {
                Ok(Some(prefs)) => prefs,
                Ok(None) => {
                    // First run: capture preferences so later runs find them
                    let prefs = Preferences {
                        last_updated: Some(Utc::now()),
                        ..Preferences::default()
                    };
                    save_preferences(&prefs)?;
                    tracing::info!("Created preferences file");
                    prefs
                }
                Err(e) => {
                    tracing::warn!("Ignoring saved preferences: {:#}", e);
                    Preferences::default()
                }
            };
            let root = resolve_scan_root(cli.path.as_deref(), Some(&prefs));
            let stdin = std::io::stdin();
            let mut menu = Menu::new(
                stdin.lock(),
                std::io::stdout(),
                prefs,
                get_preferences_file_path()?,
                root,
            );
            match menu.run()? {
                MenuOutcome::Launched(_) => {}
                MenuOutcome::Quit => tracing::debug!("Quit without launching"),
            }
        }

        Some(Commands::Version) => {
            println!("loxlaunch v{}", env!("CARGO_PKG_VERSION"));
        }

        Some(Commands::List { format }) => {
            let root = scan_root(cli.path.as_deref());
            let catalog = discover(&root)?;
            print_catalog(&catalog, &root, format)?;
        }

        Some(Commands::Launch {
            ordinal,
            wait,
            args,
        }) => {
            let root = scan_root(cli.path.as_deref());
            let catalog = discover(&root)?;
            if catalog.is_empty() {
                return Err(anyhow!(
                    "No Loxone Config installations found in {}",
                    root.display()
                ));
            }

            let ordinal = ordinal.unwrap_or(1);
            let record = catalog.get(ordinal).ok_or_else(|| {
                anyhow!(
                    "No installation number {}; choose 1-{}",
                    ordinal,
                    catalog.len()
                )
            })?;

            let mut child = launch::launch_with_args(record, &args)?;
            if wait {
                let status = child.wait()?;
                std::process::exit(status.code().unwrap_or(1));
            }
        }

        Some(Commands::Config { action }) => {
            // A file that fails to load must not be overwritten here
            handle_config(action, load_preferences()?.unwrap_or_default())?;
        }
    }

    Ok(())
}

/// Scan root for `list` and `launch`. Preferences are only read when
/// `--path` is absent, and a file that fails to load is ignored with a warning.
fn scan_root(cli_path: Option<&Path>) -> PathBuf {
    if cli_path.is_some() {
        return resolve_scan_root(cli_path, None);
    }
    let stored = load_preferences().unwrap_or_else(|e| {
        tracing::warn!("Ignoring saved preferences: {:#}", e);
        None
    });
    resolve_scan_root(None, stored.as_ref())
}

fn setup_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.quiet {
        "error"
    } else if cli.verbose == 0 {
        "warn"
    } else if cli.verbose == 1 {
        "info"
    } else {
        "debug"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn print_catalog(catalog: &Catalog, root: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(catalog)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(catalog)?),
        OutputFormat::Plain => {
            println!("--- Loxone Config installations in {} ---", root.display());
            if catalog.is_empty() {
                println!("  No installations found.");
                return Ok(());
            }
            for record in catalog.iter() {
                println!(
                    "  {}) {} [{}]",
                    record.ordinal(),
                    record.version_display(),
                    record.folder_name()
                );
                println!("     Path: {}", record.executable_path().display());
            }
        }
    }
    Ok(())
}

const SETTINGS: &str = "install_path, shortcut";

fn print_preferences(prefs: &Preferences) {
    println!("--- loxlaunch preferences ---");
    println!(
        "  install_path: {}",
        prefs.install_path.as_deref().unwrap_or_default()
    );
    println!(
        "  shortcut: {}",
        prefs.shortcut.as_ref().map(display_value).unwrap_or_default()
    );
    if let Some(updated) = prefs.last_updated {
        println!("  last_updated: {}", updated.to_rfc3339());
    }
    for (key, value) in &prefs.extra {
        println!("  {}: {}", key, display_value(value));
    }
}

fn handle_config(action: ConfigAction, prefs: Preferences) -> Result<()> {
    match action {
        ConfigAction::Get { key: Some(key) } => {
            let value = match normalize_key(&key).as_str() {
                "install_path" => prefs.install_path.unwrap_or_default(),
                "shortcut" => prefs.shortcut.as_ref().map(display_value).unwrap_or_default(),
                _ => return Err(anyhow!("Unknown setting '{}'. Valid settings: {}", key, SETTINGS)),
            };
            println!("{}", value);
        }
        ConfigAction::Get { key: None } => print_preferences(&prefs),
        ConfigAction::Set { key, value } => {
            let key = normalize_key(&key);
            let updated = match key.as_str() {
                "install_path" => with_install_path(prefs, Path::new(&value))?,
                "shortcut" => with_shortcut(prefs, Some(shortcut_value(&value))),
                _ => return Err(anyhow!("Unknown setting '{}'. Valid settings: {}", key, SETTINGS)),
            };
            save_preferences(&updated)?;
            tracing::info!("Setting '{}' updated to '{}'", key, value);
        }
        ConfigAction::Unset { key } => {
            let key = normalize_key(&key);
            let updated = match key.as_str() {
                "install_path" => without_install_path(prefs),
                "shortcut" => with_shortcut(prefs, None),
                _ => return Err(anyhow!("Unknown setting '{}'. Valid settings: {}", key, SETTINGS)),
            };
            save_preferences(&updated)?;
            tracing::info!("Setting '{}' unset", key);
        }
        ConfigAction::Show { format } => match format {
            OutputFormat::Plain => print_preferences(&prefs),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&prefs)?),
            OutputFormat::Yaml => print!(
                "{}",
                serde_yaml::to_string(&prefs).context("Could not render preferences as YAML")?
            ),
        },
    }
    Ok(())
}
