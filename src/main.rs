//! glossarion CLI: unified classical-language dictionary lookups.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use miette::IntoDiagnostic;

use glossarion::config::Config;
use glossarion::engine::{QueryEngine, Wiring};
use glossarion::error::{AdapterErrorKind, QueryError};
use glossarion::language::Language;
use glossarion::paths::GlossarionPaths;

#[derive(Parser)]
#[command(name = "glossarion", version, about = "Unified dictionary for Latin, Ancient Greek, and Sanskrit")]
struct Cli {
    /// Data directory for persistent storage (overrides the XDG path).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (default: $XDG_CONFIG_HOME/glossarion/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable the response cache for this invocation.
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a term.
    Query {
        /// Language code: lat, grc, or san.
        language: String,
        /// The term, in any supported encoding.
        term: String,

        /// Bypass cache and fact index; force live adapter fan-out.
        #[arg(long)]
        refresh: bool,

        /// Emit the full response as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Report component health.
    Health {
        #[arg(long)]
        json: bool,
    },

    /// Response-cache maintenance.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Fact-index maintenance.
    Facts {
        #[command(subcommand)]
        action: FactsAction,
    },

    /// Build the offline indexes.
    Index {
        #[command(subcommand)]
        action: IndexAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show row counts and byte totals by language.
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Delete cached responses, for one language or all.
    Clear {
        #[arg(long)]
        language: Option<String>,
    },
}

#[derive(Subcommand)]
enum FactsAction {
    /// Show stored facts for a subject.
    Lookup {
        language: String,
        term: String,
    },
    /// Delete stored facts for a subject.
    Forget {
        language: String,
        term: String,
        /// Restrict deletion to one source tag.
        #[arg(long)]
        source: Option<String>,
    },
}

#[derive(Subcommand)]
enum IndexAction {
    /// Build the CTS URN index from corpus CSVs.
    BuildCts {
        /// Canonical (Perseus-style) corpus CSV.
        #[arg(long)]
        canonical: PathBuf,
        /// Legacy corpus CSV; fills gaps only.
        #[arg(long)]
        legacy: Option<PathBuf>,
        /// Output path (default: the data dir's cts.redb).
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Build the CDSL index from a TSV export.
    BuildCdsl {
        /// TSV export: headword, source_ref, block text.
        #[arg(long)]
        tsv: PathBuf,
        /// Output path (default: the data dir's cdsl.redb).
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(report) => {
            eprintln!("{report:?}");
            ExitCode::from(3)
        }
    }
}

fn run(cli: Cli) -> miette::Result<ExitCode> {
    let paths = match &cli.data_dir {
        Some(root) => GlossarionPaths::rooted_at(root.clone()),
        None => GlossarionPaths::resolve().into_diagnostic()?,
    };
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| paths.config_file());
    let mut config = Config::load_or_default(&config_path).into_diagnostic()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = Some(data_dir);
    }
    if cli.no_cache {
        config.cache_enabled = false;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "glossarion={},ureq=warn,scraper=warn",
                    config.log_level.as_filter()
                ))
            }),
        )
        .init();

    match cli.command {
        Commands::Query {
            language,
            term,
            refresh,
            json,
        } => cmd_query(&config, &language, &term, refresh, json),
        Commands::Health { json } => cmd_health(&config, json),
        Commands::Cache { action } => cmd_cache(&config, action),
        Commands::Facts { action } => cmd_facts(&config, action),
        Commands::Index { action } => cmd_index(&config, &paths, action),
    }
}

fn open_engine(config: &Config) -> miette::Result<QueryEngine> {
    let wiring = Wiring::open(config)?;
    Ok(QueryEngine::new(wiring))
}

fn cmd_query(
    config: &Config,
    language: &str,
    term: &str,
    refresh: bool,
    json: bool,
) -> miette::Result<ExitCode> {
    let engine = open_engine(config)?;
    match engine.query_code(language, term, refresh) {
        Ok(response) => {
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&response).into_diagnostic()?
                );
            } else {
                print_response(&response);
            }
            // Empty answer with only transient upstream failures is its own
            // exit code so scripts can retry.
            let transient_only = response.entries.is_empty()
                && !response.errors.is_empty()
                && response.errors.values().all(|e| {
                    matches!(
                        e.kind,
                        AdapterErrorKind::Transport | AdapterErrorKind::Timeout
                    )
                });
            Ok(if transient_only {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            })
        }
        Err(err @ (QueryError::UnsupportedLanguage { .. } | QueryError::Normalization(_))) => {
            eprintln!("{:?}", miette::Report::new(err));
            Ok(ExitCode::from(1))
        }
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            Ok(ExitCode::from(3))
        }
    }
}

fn print_response(response: &glossarion::engine::response::QueryResponse) {
    let norm = &response.normalization;
    println!(
        "{} → {} [{} {:.2}]{}{}",
        norm.original,
        norm.canonical,
        norm.detected_encoding,
        norm.confidence,
        if response.from_cache { " (cached)" } else { "" },
        if response.from_facts {
            " (from facts)"
        } else {
            ""
        },
    );
    for entry in &response.entries {
        println!("\n== {} ({}) ==", entry.headword, entry.source);
        for definition in &entry.definitions {
            let mut line = format!("  • {}", definition.definition);
            if let Some(pos) = &definition.pos {
                line.push_str(&format!(" [{pos}]"));
            }
            if let Some(source_ref) = &definition.source_ref {
                line.push_str(&format!(" ({source_ref})"));
            }
            println!("{line}");
        }
        for citation in &entry.citations {
            match &citation.cts_urn {
                Some(urn) => println!("  ※ {} → {urn}", citation.text),
                None => println!("  ※ {}", citation.text),
            }
        }
        if let Some(morph) = &entry.morphology {
            let features: Vec<String> = morph
                .features
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            println!("  ⚙ {} {} {}", morph.lemma, morph.pos, features.join(" "));
        }
    }
    for (source, error) in &response.errors {
        eprintln!("! {source}: {} ({})", error.message, error.kind);
    }
}

fn cmd_health(config: &Config, json: bool) -> miette::Result<ExitCode> {
    let engine = open_engine(config)?;
    let report = engine.health();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).into_diagnostic()?
        );
    } else {
        for component in &report.components {
            use glossarion::engine::health::ComponentStatus;
            let (label, detail) = match &component.status {
                ComponentStatus::Healthy => ("healthy", None),
                ComponentStatus::Degraded { detail } => ("degraded", Some(detail)),
                ComponentStatus::Unavailable { detail } => ("unavailable", Some(detail)),
            };
            match detail {
                Some(detail) => println!("{:<16} {label} ({detail})", component.name),
                None => println!("{:<16} {label}", component.name),
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_cache(config: &Config, action: CacheAction) -> miette::Result<ExitCode> {
    let engine = open_engine(config)?;
    match action {
        CacheAction::Stats { json } => {
            let stats = engine.cache_stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats).into_diagnostic()?);
            } else {
                println!(
                    "{} entries, {} bytes",
                    stats.total_entries, stats.total_bytes
                );
                for row in &stats.by_language {
                    println!("  {:<4} {} entries, {} bytes", row.language, row.entries, row.bytes);
                }
            }
        }
        CacheAction::Clear { language } => {
            let language = match language.as_deref() {
                Some(code) => Some(parse_language(code)?),
                None => None,
            };
            let deleted = engine.cache_clear(language);
            println!("deleted {deleted} rows");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_facts(config: &Config, action: FactsAction) -> miette::Result<ExitCode> {
    let mut config = config.clone();
    config.fact_index_enabled = true;
    let engine = open_engine(&config)?;
    let Some(facts) = &engine.wiring().facts else {
        eprintln!("fact index unavailable");
        return Ok(ExitCode::from(3));
    };
    match action {
        FactsAction::Lookup { language, term } => {
            let language = parse_language(&language)?;
            let canonical = engine
                .wiring()
                .normalizer
                .normalize(language, &term)
                .into_diagnostic()?;
            let found = facts
                .lookup(
                    language,
                    &canonical.canonical,
                    &[
                        glossarion::fact::Predicate::HasGloss,
                        glossarion::fact::Predicate::HasMorphology,
                        glossarion::fact::Predicate::HasCitation,
                    ],
                )
                .into_diagnostic()?;
            println!(
                "{}",
                serde_json::to_string_pretty(&found).into_diagnostic()?
            );
        }
        FactsAction::Forget {
            language,
            term,
            source,
        } => {
            let language = parse_language(&language)?;
            let source = match source.as_deref() {
                Some(tag) => Some(glossarion::adapter::Source::from_tag(tag).ok_or_else(
                    || miette::miette!("unknown source tag: {tag}"),
                )?),
                None => None,
            };
            let canonical = engine
                .wiring()
                .normalizer
                .normalize(language, &term)
                .into_diagnostic()?;
            let deleted = facts
                .forget(language, &canonical.canonical, source)
                .into_diagnostic()?;
            println!("deleted {deleted} facts");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_index(
    config: &Config,
    paths: &GlossarionPaths,
    action: IndexAction,
) -> miette::Result<ExitCode> {
    let _ = config;
    paths.ensure_dirs().into_diagnostic()?;
    match action {
        IndexAction::BuildCts {
            canonical,
            legacy,
            out,
        } => {
            let out = out.unwrap_or_else(|| paths.cts_file());
            let report =
                glossarion::cts::build::build_index(&canonical, legacy.as_deref(), &out)?;
            println!(
                "built {}: {} authors, {} works, {} abbreviations ({} legacy fills)",
                out.display(),
                report.authors,
                report.works,
                report.abbreviations,
                report.legacy_fills
            );
        }
        IndexAction::BuildCdsl { tsv, out } => {
            let out = out.unwrap_or_else(|| paths.cdsl_file());
            let headwords = glossarion::adapter::cdsl::build_index(&tsv, &out)?;
            println!("built {}: {headwords} headwords", out.display());
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn parse_language(code: &str) -> miette::Result<Language> {
    Language::from_code(code)
        .ok_or_else(|| miette::miette!("unsupported language: {code} (expected lat, grc, or san)"))
}
