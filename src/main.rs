use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use prettytable::{Cell, Row as PrettyRow, Table};
use std::path::PathBuf;
use tracing::info;

use metfall::dataset::remote::{check_connection, load_dataset, CONNECTIVITY_PROBE_URL};
use metfall::environment::Settings;
use metfall::logging::configure_logging;
use metfall::progress::EnrichmentProgress;
use metfall::report::Column;
use metfall::search::{validate_country, validate_name, validate_numeric_range, validate_type};
use metfall::{AllowLists, Boulder, ConcurrencyLimit, HttpPageSource, Meteorite, SearchQuery};

#[derive(Parser)]
#[clap(name = "metfall", about = "Select meteorite falls and enrich them from the catalog")]
struct Cli {
    /// Dataset path or URL (overrides METFALL_DATASET)
    #[clap(short, long, global = true)]
    dataset: Option<String>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select meteorites and list them
    Search {
        #[clap(flatten)]
        query: QueryArgs,

        /// Print the selection as JSON
        #[clap(long)]
        json: bool,
    },

    /// Select meteorites, fetch their detail pages and print a report
    Enrich {
        #[clap(flatten)]
        query: QueryArgs,

        /// Maximum number of detail pages requested at once
        #[clap(short, long)]
        concurrency: Option<String>,

        /// Report columns to leave out, comma separated
        #[clap(short, long, value_delimiter = ',')]
        omit: Vec<String>,

        /// Print the report as JSON
        #[clap(long)]
        json: bool,

        /// Also print every meteorite's labelled properties
        #[clap(short, long)]
        properties: bool,
    },

    /// Write the country and type allow-lists as JSON
    Uniques {
        /// Output directory
        #[clap(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Args)]
struct QueryArgs {
    /// Case-insensitive substring of the meteorite name
    #[clap(short, long)]
    name: Option<String>,

    /// One numeric id, or two separated by a comma
    #[clap(short, long)]
    range: Option<String>,

    /// Exact fall country
    #[clap(long)]
    country: Option<String>,

    /// Exact meteorite type
    #[clap(short = 't', long = "type")]
    kind: Option<String>,
}

impl QueryArgs {
    fn build(&self, allow_lists: &AllowLists) -> Result<SearchQuery> {
        let query = SearchQuery {
            name: self.name.as_deref().map(validate_name).transpose()?,
            id_range: self
                .range
                .as_deref()
                .map(validate_numeric_range)
                .transpose()?,
            country: match self.country.as_deref() {
                Some(country) => validate_country(country, allow_lists)?,
                None => None,
            },
            kind: match self.kind.as_deref() {
                Some(kind) => validate_type(kind, allow_lists)?,
                None => None,
            },
        };
        if query.is_empty() {
            bail!("Provide at least one of --name, --range, --country or --type");
        }
        Ok(query)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::from_env().context("Invalid METFALL_* setting")?;
    if let Some(dataset) = cli.dataset {
        settings.dataset = dataset;
    }

    configure_logging(&settings.log_dir);

    let source = HttpPageSource::new(&settings.user_agent, settings.request_timeout)
        .context("Failed to build HTTP client")?;
    let dataset = load_dataset(source.client(), &settings.dataset, settings.request_timeout)
        .await
        .with_context(|| format!("Failed to load dataset from {}", settings.dataset))?;
    info!("Loaded {} rows from {}", dataset.len(), settings.dataset);

    let mut boulder = Boulder::new(dataset);

    match cli.command {
        Commands::Search { query, json } => {
            let query = query.build(boulder.allow_lists())?;
            if select(&mut boulder, &query) {
                print_selection(boulder.selection(), json)?;
            }
        }
        Commands::Enrich {
            query,
            concurrency,
            omit,
            json,
            properties,
        } => {
            let query = query.build(boulder.allow_lists())?;
            let limit = match concurrency {
                Some(text) => ConcurrencyLimit::parse(&text)?,
                None => settings.max_concurrency,
            };
            let omit_names = if omit.is_empty() {
                settings.report_omit.clone()
            } else {
                omit
            };
            let omit = omit_names
                .iter()
                .map(|name| name.parse::<Column>())
                .collect::<Result<Vec<_>, _>>()?;

            if !select(&mut boulder, &query) {
                return Ok(());
            }
            if !check_connection(source.client(), CONNECTIVITY_PROBE_URL).await {
                bail!("No internet connection, cannot request detail pages");
            }

            enrich(&mut boulder, &source, limit).await?;

            let report = boulder.report(&omit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report.to_json())?);
            } else {
                report.to_table().printstd();
            }
            if properties {
                print_properties(boulder.selection());
            }
            if report.duds > 0 {
                eprintln!(
                    "{}",
                    format!("{} meteorites have no detail data", report.duds).yellow()
                );
            }
        }
        Commands::Uniques { out_dir } => {
            boulder
                .allow_lists()
                .write_json(&out_dir)
                .with_context(|| format!("Failed to write allow-lists to {}", out_dir.display()))?;
            println!(
                "Wrote {} countries and {} types to {}",
                boulder.allow_lists().countries().count(),
                boulder.allow_lists().types().count(),
                out_dir.display()
            );
        }
    }

    Ok(())
}

/// Returns false and prints the reason when nothing matched.
fn select(boulder: &mut Boulder, query: &SearchQuery) -> bool {
    match boulder.search(query) {
        Ok(count) => {
            eprintln!("{}", format!("{} meteorites selected", count).bright_green());
            true
        }
        Err(not_found) => {
            println!("{}", not_found.to_string().bright_yellow());
            false
        }
    }
}

async fn enrich(boulder: &mut Boulder, source: &HttpPageSource, limit: ConcurrencyLimit) -> Result<()> {
    let progress = EnrichmentProgress::new(boulder.selection().len());
    let batch = boulder
        .request_details(source, limit.get(), |p| progress.observe(p))
        .await?;
    progress.finish(batch);

    if batch.has_failures() {
        eprintln!(
            "\n{}",
            format!(
                "{} of {} detail pages could not be read",
                batch.failures.len(),
                batch.total
            )
            .bright_red()
        );
        for failure in &batch.failures {
            eprintln!("  {} {}: {}", failure.name.bright_yellow(), failure.url.dimmed(), failure.reason);
        }
    }
    Ok(())
}

fn print_properties(meteorites: &[Meteorite]) {
    for meteorite in meteorites {
        println!("\n{}", meteorite.name.bright_blue());
        for (label, value) in meteorite.properties() {
            match value {
                Some(value) => println!("  {}: {}", label, value),
                None => println!("  {}: {}", label, "-".dimmed()),
            }
        }
    }
}

fn print_selection(meteorites: &[Meteorite], json: bool) -> Result<()> {
    if json {
        let rows: Vec<_> = meteorites
            .iter()
            .map(|m| {
                serde_json::json!({
                    "name": m.name,
                    "numeric_id": m.numeric_id,
                    "year": m.fall_year,
                    "country": m.fall_country,
                    "type": m.kind,
                    "mass": m.mass,
                    "URL": m.detail_url,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_titles(PrettyRow::new(vec![
        Cell::new("name"),
        Cell::new("numeric_id"),
        Cell::new("year"),
        Cell::new("country"),
        Cell::new("type"),
        Cell::new("mass"),
    ]));
    for m in meteorites {
        table.add_row(PrettyRow::new(vec![
            Cell::new(&m.name),
            Cell::new(&m.numeric_id.to_string()),
            Cell::new(&m.fall_year.map(|y| y.to_string()).unwrap_or_default()),
            Cell::new(&m.fall_country),
            Cell::new(m.kind.as_deref().unwrap_or("")),
            Cell::new(m.mass.as_deref().unwrap_or("")),
        ]));
    }
    table.printstd();
    Ok(())
}
