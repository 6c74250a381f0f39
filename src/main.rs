use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use sanad_validate::config::Config;
use sanad_validate::loader;
use sanad_validate::{ChainReport, Error, NarratorRepository, Resolver};

#[derive(Parser)]
#[command(name = "sanad", about = "Chronological sanad validator")]
struct Cli {
    /// Narrator dataset: a JSON file or a directory of JSON files
    #[arg(long, env = "SANAD_DATA", global = true)]
    data: Option<PathBuf>,

    /// Config file (default: ./sanad.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Maximum number of resolver matches
    #[arg(long, global = true)]
    limit: Option<usize>,

    /// Minimum fuzzy similarity, 0.0–1.0
    #[arg(long, global = true)]
    cutoff: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find narrators matching a partial name
    Resolve {
        /// Partial name, e.g. "malik" or "ibn shihab"
        query: Vec<String>,
    },
    /// Check every consecutive link of a chain (earliest narrator first)
    Validate {
        /// Canonical narrator names in chain order
        #[arg(required = true)]
        names: Vec<String>,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Print one narrator record
    Show { name: String },
    /// Print dataset load statistics
    Stats,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Table,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> sanad_validate::Result<()> {
    let config =
        Config::load(cli.config.as_deref())?.with_overrides(cli.data, cli.limit, cli.cutoff)?;
    let resolver = Resolver::new(config.resolver)?;
    let (repo, stats) = loader::load_path(config.data_path()?)?;

    match cli.command {
        Command::Resolve { query } => run_resolve(&repo, &resolver, &query.join(" ")),
        Command::Validate { names, format } => run_validate(&repo, &resolver, &names, format),
        Command::Show { name } => run_show(&repo, &resolver, &name),
        Command::Stats => print_json(&stats),
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  OUTPUT HELPERS
// ═══════════════════════════════════════════════════════════════════════

fn print_json<T: serde::Serialize>(data: &T) -> sanad_validate::Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    println!("{json}");
    Ok(())
}

/// On an unknown name, point the user at what the resolver finds for it.
fn suggest(repo: &NarratorRepository, resolver: &Resolver, name: &str) {
    let hits = resolver.resolve_in(repo, name);
    if !hits.is_empty() {
        eprintln!("  did you mean: {}", hits.join(", "));
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  COMMANDS
// ═══════════════════════════════════════════════════════════════════════

fn run_resolve(
    repo: &NarratorRepository,
    resolver: &Resolver,
    query: &str,
) -> sanad_validate::Result<()> {
    let hits = resolver.resolve_in(repo, query);
    if hits.is_empty() && !query.trim().is_empty() {
        eprintln!("No narrator matches: {query}");
    }
    print_json(&hits)
}

fn run_show(
    repo: &NarratorRepository,
    resolver: &Resolver,
    name: &str,
) -> sanad_validate::Result<()> {
    match repo.require(name) {
        Ok(record) => print_json(record),
        Err(e) => {
            suggest(repo, resolver, name);
            Err(e)
        }
    }
}

fn run_validate(
    repo: &NarratorRepository,
    resolver: &Resolver,
    names: &[String],
    format: Format,
) -> sanad_validate::Result<()> {
    let report = match ChainReport::build(names, repo) {
        Ok(r) => r,
        Err(Error::UnknownNarrator(name)) => {
            suggest(repo, resolver, &name);
            return Err(Error::UnknownNarrator(name));
        }
        Err(e) => return Err(e),
    };

    if report.links.is_empty() {
        eprintln!("Select at least two narrators to check overlap.");
    }

    match format {
        Format::Json => print_json(&report),
        Format::Table => {
            print_table(&report);
            Ok(())
        }
    }
}

// ── Table rendering ─────────────────────────────────────────────────

const TABLE_HEADERS: [&str; 7] = [
    "Narrator A",
    "Lifespan A",
    "Narrator B",
    "Lifespan B",
    "Overlap",
    "Shared cities",
    "Status",
];

fn print_table(report: &ChainReport) {
    let rows: Vec<[String; 7]> = report
        .links
        .iter()
        .map(|l| {
            [
                l.earlier.name.clone(),
                l.earlier.lifespan(),
                l.later.name.clone(),
                l.later.lifespan(),
                format!("{} yrs", l.overlap_years),
                l.shared_cities.iter().cloned().collect::<Vec<_>>().join(", "),
                format!("{} {}", l.icon(), l.label()),
            ]
        })
        .collect();

    // Column widths in chars, not bytes, so Arabic and en dashes line up.
    let mut widths = TABLE_HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let render = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(widths)
            .map(|(c, w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join(" │ ")
    };

    println!("{}", render(TABLE_HEADERS.to_vec()));
    println!("{}", widths.map(|w| "─".repeat(w)).join("─┼─"));
    for row in &rows {
        println!("{}", render(row.iter().map(String::as_str).collect()));
    }

    let s = &report.summary;
    eprintln!(
        "\n{} link(s), {} confirmed, {} without overlap",
        s.link_count, s.confirmed_links, s.unlinked_pairs
    );
}
