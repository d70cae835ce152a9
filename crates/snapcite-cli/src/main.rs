use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use snapcite_core::config_file;
use snapcite_core::{Config, SavedCitation, SavedCitations, SqliteStore};
use snapcite_format::Style;

mod output;
mod source;

use output::ColorMode;
use source::{Resolved, Resolver, Source};

/// SnapCite - Generate APA, MLA, Chicago and Harvard citations for web pages and PDFs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v for debug output on stderr)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a citation for a URL or a local .html/.pdf file
    Cite {
        /// http(s) URL or path to a saved page or PDF
        source: String,

        /// Citation style (APA, MLA, Chicago, Harvard)
        #[arg(short, long)]
        style: Option<String>,

        /// Add the citation to the saved list
        #[arg(long)]
        save: bool,

        /// Print the extracted record as JSON instead of a citation
        #[arg(long)]
        json: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Manage saved citations
    Saved {
        #[command(subcommand)]
        action: SavedAction,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// List the supported citation styles
    Styles,
}

#[derive(Subcommand, Debug)]
enum SavedAction {
    /// Show saved citations, newest first
    List,
    /// Remove the saved citation at INDEX (as shown by `list`)
    Delete { index: usize },
    /// Remove every saved citation
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Cite {
            source,
            style,
            save,
            json,
            no_color,
        } => cite(&source, style, save, json, no_color).await,
        Command::Saved { action, no_color } => {
            let config = resolve_config(None);
            saved(&config, action, color_mode(no_color))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Styles => {
            let config = resolve_config(None);
            let default = config.default_style.parse().unwrap_or(Style::Apa);
            output::print_styles(&mut std::io::stdout(), default)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = if verbose == 0 {
        "warn"
    } else {
        "warn,snapcite=debug,snapcite_core=debug,snapcite_extract=debug,snapcite_pdf=debug,snapcite_pdf_mupdf=debug,snapcite_format=debug"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn color_mode(no_color: bool) -> ColorMode {
    ColorMode(!no_color && std::io::stdout().is_terminal())
}

/// Resolve configuration: CLI flags > env vars > config file > defaults
fn resolve_config(style_flag: Option<String>) -> Config {
    let mut config = Config::from_file(&config_file::load_config());

    if let Ok(style) = std::env::var("SNAPCITE_STYLE") {
        config.default_style = style;
    }
    if let Ok(path) = std::env::var("SNAPCITE_STORE") {
        config.store_path = Some(PathBuf::from(path));
    }
    if let Some(secs) = std::env::var("SNAPCITE_TIMEOUT")
        .ok()
        .and_then(|v| v.parse().ok())
    {
        config.fetch_timeout_secs = secs;
    }
    if let Some(style) = style_flag {
        config.default_style = style;
    }
    config
}

fn open_saved(config: &Config) -> anyhow::Result<SavedCitations<SqliteStore>> {
    let path = config
        .resolved_store_path()
        .context("No data directory available; set SNAPCITE_STORE to a file path")?;
    let store = SqliteStore::open(&path)
        .with_context(|| format!("failed to open citation store at {}", path.display()))?;
    Ok(SavedCitations::new(store))
}

async fn cite(
    source: &str,
    style: Option<String>,
    save: bool,
    json: bool,
    no_color: bool,
) -> anyhow::Result<ExitCode> {
    let config = resolve_config(style);
    let color = color_mode(no_color);
    let style: Style = config.default_style.parse().with_context(|| {
        let names: Vec<&str> = Style::ALL.iter().map(|s| s.name()).collect();
        format!("Supported styles: {}", names.join(", "))
    })?;

    let source = Source::classify(source)?;
    let resolver = Resolver::new(config.clone())?;

    let record = match resolver.resolve(&source).await? {
        Resolved::Record(record) => record,
        Resolved::PdfFailed => {
            output::print_pdf_failure(&mut std::io::stderr(), color)?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let citation = snapcite_format::format(&record, style.name());
    let mut stdout = std::io::stdout();
    if json {
        output::print_record_json(&mut stdout, &record)?;
    } else {
        output::print_citation(&mut stdout, style, &citation, color)?;
    }

    if save {
        let entry = SavedCitation::new(record.title.clone(), citation, style.name());
        let saved = open_saved(&config).and_then(|list| Ok(list.save(entry)?));
        let mut stderr = std::io::stderr();
        match saved {
            Ok(()) => output::print_saved_confirmation(&mut stderr, color)?,
            Err(e) => {
                tracing::warn!(error = %e, "failed to save citation");
                output::print_warning(&mut stderr, &format!("Could not save citation: {:#}", e), color)?;
            }
        }
    }

    stdout.flush()?;
    Ok(ExitCode::SUCCESS)
}

fn saved(config: &Config, action: SavedAction, color: ColorMode) -> anyhow::Result<()> {
    let list = open_saved(config)?;
    let mut stdout = std::io::stdout();

    match action {
        SavedAction::List => output::print_saved_list(&mut stdout, &list.list()?, color)?,
        SavedAction::Delete { index } => match list.delete(index)? {
            Some(removed) => writeln!(stdout, "Deleted [{}] {}", index, removed.title)?,
            None => output::print_warning(
                &mut std::io::stderr(),
                &format!("No saved citation at index {}", index),
                color,
            )?,
        },
        SavedAction::Clear => {
            list.clear()?;
            writeln!(stdout, "Cleared saved citations.")?;
        }
    }
    Ok(())
}
