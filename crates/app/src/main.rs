use chrono::Utc;
use clap::{Parser, Subcommand};
use csi_review_core::display::{
    confidence_percent, format_created_at, format_parse_time, needs_expansion, section_label,
    showing_line, truncate_snippet,
};
use csi_review_core::{
    context_for, review_rows, CredentialSource, DocumentUpload, FileStore, HttpBackend,
    LoadEvent, MatchType, Reconciler, ResultCache, ResultSet, ReviewFilters, SortKey,
    StaticCredentials, StoredCredentials, ViewState, DEFAULT_API_BASE,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "csi-review", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Extraction service base URL
    #[arg(long, env = "CSI_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Directory for cached results and the stored token
    #[arg(long, env = "CSI_CACHE_DIR", default_value = ".csi-cache")]
    cache_dir: PathBuf,

    /// Bearer token; the stored token is used when omitted
    #[arg(long, env = "CSI_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a PDF and print the extracted matches.
    Parse {
        /// PDF to upload.
        #[arg(long)]
        file: PathBuf,
        /// Persist the result server-side so it can be reopened later.
        #[arg(long, default_value_t = false)]
        save: bool,
    },
    /// List saved parse results, newest first.
    List,
    /// Load a saved result and print its review table.
    Show {
        #[arg(long)]
        id: u64,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Delete a saved result and its cached copy.
    Delete {
        #[arg(long)]
        id: u64,
    },
    /// Manage the stored bearer token.
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    Set { value: String },
    Clear,
}

#[derive(clap::Args)]
struct ViewArgs {
    /// Only rows on this page.
    #[arg(long)]
    page: Option<String>,
    /// Only rows whose keyword or snippet contains this text.
    #[arg(long)]
    keyword: Option<String>,
    /// Only rows with this match type (exact, regex, fuzzy).
    #[arg(long)]
    match_type: Option<MatchType>,
    /// Sort column; repeating the same column flips to descending.
    #[arg(long = "sort")]
    sort: Vec<SortKey>,
    /// Expand a row (1-based, as numbered in the table).
    #[arg(long = "expand")]
    expand: Vec<usize>,
}

impl ViewArgs {
    fn into_view_state(self) -> ViewState {
        let mut view = ViewState {
            filters: ReviewFilters {
                page: self.page,
                keyword: self.keyword,
                match_type: self.match_type,
            },
            ..Default::default()
        };
        for key in self.sort {
            view.toggle_sort(key);
        }
        for row in self.expand.into_iter().filter(|row| *row > 0) {
            view.toggle_expanded(row - 1);
        }
        view
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let store = FileStore::open(&cli.cache_dir)
        .map_err(|error| anyhow::anyhow!(error.to_string()))?;

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        api_base = %cli.api_base,
        cache_dir = %cli.cache_dir.display(),
        "csi-review boot"
    );

    if let Command::Token { action } = &cli.command {
        let credentials = StoredCredentials::new(store);
        match action {
            TokenAction::Set { value } => {
                credentials
                    .set_token(value)
                    .map_err(|error| anyhow::anyhow!(error.to_string()))?;
                println!("token stored in {}", cli.cache_dir.display());
            }
            TokenAction::Clear => {
                credentials
                    .clear_token()
                    .map_err(|error| anyhow::anyhow!(error.to_string()))?;
                println!("token cleared");
            }
        }
        return Ok(());
    }

    let credentials: Box<dyn CredentialSource> = match cli.token.clone() {
        Some(token) => Box::new(StaticCredentials::new(Some(token))),
        None => Box::new(StoredCredentials::new(store.clone())),
    };
    let backend = HttpBackend::new(&cli.api_base, credentials)
        .map_err(|error| anyhow::anyhow!(error.to_string()))?;
    let reconciler = Reconciler::new(backend, ResultCache::new(store));

    match cli.command {
        Command::Parse { file, save } => {
            let bytes = tokio::fs::read(&file).await?;
            let file_name = file
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("document.pdf")
                .to_string();

            let result = reconciler
                .parse(DocumentUpload { file_name, bytes }, save)
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            render(&result, &ViewState::default());
            match result.result_id {
                Some(result_id) => println!("saved as result {result_id}"),
                None if save => warn!("backend did not return a result id"),
                None => {}
            }
        }
        Command::List => {
            let summaries = reconciler
                .list()
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            if summaries.is_empty() {
                println!("no saved results");
            }
            for summary in summaries {
                println!(
                    "[{}] {}  created={}  matches={}  matched_pages={}/{}  parse_time={}",
                    summary.id,
                    summary.filename,
                    format_created_at(&summary.created_at),
                    summary.total_matches,
                    summary.matched_pages,
                    summary.num_pages,
                    format_parse_time(summary.parse_time_ms),
                );
            }
        }
        Command::Show { id, view } => {
            let view = view.into_view_state();
            let mut provisional: Option<ResultSet> = None;

            let outcome = reconciler
                .load_with(id, |event| match event {
                    LoadEvent::Provisional(cached) => {
                        render(&cached, &view);
                        provisional = Some(cached);
                    }
                    LoadEvent::Authoritative(fresh) => {
                        if provisional.as_ref() == Some(&fresh) {
                            info!(result_id = id, "cached copy is current");
                        } else {
                            if provisional.is_some() {
                                println!("\n-- refreshed from server --\n");
                            }
                            render(&fresh, &view);
                        }
                    }
                })
                .await;

            if let Err(error) = outcome {
                eprintln!("Error loading result: {error}");
                eprintln!("  retry: csi-review show --id {id}");
                eprintln!("  back:  csi-review list");
                return Err(anyhow::anyhow!(error.to_string()));
            }
        }
        Command::Delete { id } => {
            reconciler
                .delete(id)
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;
            println!("deleted result {id}");
        }
        Command::Token { .. } => {}
    }

    Ok(())
}

fn render(result: &ResultSet, view: &ViewState) {
    println!("document: {}", result.document.filename);
    println!(
        "  pages={}  total_matches={}  matched_pages={}  parse_time={}",
        result.document.num_pages,
        result.total_matches(),
        result.matched_pages(),
        format_parse_time(result.document.parse_time_ms),
    );
    if let Some(created_at) = &result.created_at {
        println!("  created={}", format_created_at(created_at));
    }

    let rows = review_rows(result, view);
    println!("{}", showing_line(rows.rows.len(), rows.unique));
    if rows.unique < rows.total {
        println!(
            "({} matches on an already listed page/section were collapsed)",
            rows.total - rows.unique
        );
    }

    if rows.rows.is_empty() {
        println!("No results found");
        return;
    }

    for (index, record) in rows.rows.iter().enumerate() {
        let expanded = view.is_expanded(index);
        let snippet = if expanded {
            record.snippet.clone()
        } else {
            truncate_snippet(&record.snippet)
        };
        println!(
            "{:>3}. {}  page={}  section={}  confidence={}  type={}{}",
            index + 1,
            record.keyword,
            record.page,
            section_label(record),
            confidence_percent(record.confidence),
            record.match_type,
            if !expanded && needs_expansion(record) {
                "  [--expand]"
            } else {
                ""
            },
        );
        println!("     {snippet}");

        if expanded {
            println!("     context:");
            for (sentence, marked) in context_for(record).iter() {
                let marker = if marked { ">>" } else { "  " };
                println!("     {marker} {sentence}");
            }
            println!(
                "     section_hint={}  spec_section={}  positions={}",
                record.section_hint.as_deref().unwrap_or("-"),
                record.spec_section.as_deref().unwrap_or("-"),
                record.positions.len(),
            );
            if let Some(window) = record.proximity_window {
                println!("     proximity_window={window}");
            }
        }
    }
}
