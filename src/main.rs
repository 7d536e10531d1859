//! qrmagic command line client.
//!
//! ```text
//! qrmagic scan IMG_*.jpg > scans.ndjson       scan photos, one JSON line each
//! qrmagic sort --input scans.ndjson --autofill --script rename.sh
//! qrmagic labels list | sheet | pdf | range   label sheets and PDFs
//! qrmagic localities localities.json          locality map summary
//! ```
//!
//! Logs go to stderr; artifacts go to stdout unless an output path is given.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use qrmagic::capture::ndjson;
use qrmagic::config::loader::load_or_default;
use qrmagic::config::validation::validate_config;
use qrmagic::config::QrMagicConfig;
use qrmagic::imagesort::{scan_batch, ImageSortSession};
use qrmagic::labels::{self, LabelSheet, LABEL_TYPES};
use qrmagic::localities::{MapView, PanelLayout};
use qrmagic::observability::{logging, metrics};
use qrmagic::QrMagicClient;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "qrmagic")]
#[command(about = "Client for the qrmagic specimen photo and label service", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// API base URL, overrides the configuration file
    #[arg(short, long, global = true)]
    url: Option<String>,

    /// Maximum concurrent API requests, overrides the configuration file
    #[arg(long, global = true)]
    max_in_flight: Option<usize>,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan images for QR codes and print one JSON line per image
    Scan {
        /// Image files or directories of images
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Write NDJSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Order scanned images by capture time, fill missing IDs and write a rename script
    Sort(SortArgs),
    /// Label sheets and PDFs
    Labels {
        #[command(subcommand)]
        command: LabelCommands,
    },
    /// Summarise a localities file for the map viewer
    Localities {
        /// localities.json
        file: PathBuf,

        /// Select a locality and show its individuals
        #[arg(short, long)]
        select: Option<String>,

        /// Use the terrain basemap instead of OpenStreetMap
        #[arg(long)]
        terrain: bool,

        /// Hide the map and show only the table
        #[arg(long)]
        no_map: bool,

        /// Print the view state as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct SortArgs {
    /// NDJSON files written by `qrmagic scan`
    #[arg(short, long)]
    input: Vec<PathBuf>,

    /// Images to scan now, in addition to any inputs
    paths: Vec<PathBuf>,

    /// Fill empty IDs from temporally adjacent images
    #[arg(long)]
    autofill: bool,

    /// Set an ID by hand, as INDEX=ID (applied after autofill)
    #[arg(long = "set", value_name = "INDEX=ID")]
    set_ids: Vec<String>,

    /// Only list images that still lack an ID
    #[arg(long)]
    hide_filled: bool,

    /// Write the rename script here
    #[arg(short, long)]
    script: Option<PathBuf>,
}

#[derive(Args)]
struct SheetArgs {
    /// Label type, see `qrmagic labels list`
    #[arg(short = 't', long = "type")]
    label_type: String,

    /// Layout, defaults to the label type's default
    #[arg(short, long)]
    layout: Option<String>,
}

#[derive(Subcommand)]
enum LabelCommands {
    /// List label types and their layouts
    List,
    /// Fill a sheet from an ID file and write the label list
    Sheet {
        #[command(flatten)]
        sheet: SheetArgs,

        /// One ID per line
        #[arg(short, long)]
        id_file: Option<PathBuf>,

        /// Write the label list here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render a label PDF for the IDs in a file
    Pdf {
        #[command(flatten)]
        sheet: SheetArgs,

        /// One ID per line
        #[arg(short, long)]
        id_file: PathBuf,

        #[arg(short, long, default_value = labels::LABEL_PDF_NAME)]
        output: PathBuf,
    },
    /// Expand an ID format over a range, optionally rendering the PDF
    Range {
        #[command(flatten)]
        sheet: SheetArgs,

        /// ID format, e.g. "KDM{:04d}"
        #[arg(short, long)]
        format: String,

        #[arg(long)]
        start: i64,

        /// Last ID number, inclusive
        #[arg(long)]
        end: i64,

        /// Render the range as a PDF here
        #[arg(long)]
        pdf: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    logging::init_logging(&config.observability.log_level);

    if let Some(addr) = &config.observability.metrics_address {
        match addr.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(metrics_address = %addr, "Failed to parse metrics address"),
        }
    }

    tracing::debug!(
        base_url = %config.api.base_url,
        max_in_flight = config.throttle.max_in_flight,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Scan { paths, output } => run_scan(&config, &paths, output.as_deref()).await,
        Commands::Sort(args) => run_sort(&config, args).await,
        Commands::Labels { command } => run_labels(&config, command).await,
        Commands::Localities {
            file,
            select,
            terrain,
            no_map,
            json,
        } => run_localities(&file, select.as_deref(), terrain, no_map, json),
    }
}

fn load_config(cli: &Cli) -> CliResult<QrMagicConfig> {
    let mut config = load_or_default(cli.config.as_deref())?;
    if let Some(url) = &cli.url {
        config.api.base_url = url.clone();
    }
    if let Some(max) = cli.max_in_flight {
        config.throttle.max_in_flight = max;
    }
    if let Some(level) = &cli.log_level {
        config.observability.log_level = level.clone();
    }
    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            eprintln!("Error: {error}");
        }
        return Err(format!("{} configuration error(s)", errors.len()).into());
    }
    Ok(config)
}

/// Expand directories into their files, sorted by name.
fn collect_images(paths: &[PathBuf]) -> CliResult<Vec<PathBuf>> {
    let mut images = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries = fs::read_dir(path)?
                .map(|entry| entry.map(|e| e.path()))
                .collect::<Result<Vec<_>, _>>()?;
            entries.retain(|p| p.is_file());
            entries.sort();
            images.extend(entries);
        } else {
            images.push(path.clone());
        }
    }
    Ok(images)
}

fn output_writer(output: Option<&Path>) -> CliResult<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(io::BufWriter::new(fs::File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    })
}

async fn run_scan(config: &QrMagicConfig, paths: &[PathBuf], output: Option<&Path>) -> CliResult<()> {
    let client = QrMagicClient::new(config)?;
    let images = collect_images(paths)?;
    let mut out = output_writer(output)?;

    let mut write_error = None;
    let report = scan_batch(&client, &images, |response| {
        if write_error.is_none() {
            if let Err(e) = ndjson::write_ndjson_line(&mut out, &response) {
                write_error = Some(e);
            }
        }
    })
    .await;
    out.flush()?;
    if let Some(e) = write_error {
        return Err(e.into());
    }

    for failed in &report.failed {
        eprintln!("Failed: {}: {}", failed.path.display(), failed.error);
    }
    eprintln!(
        "Scanned {}/{} images ({} failed)",
        report.scanned,
        report.progress.total,
        report.failed.len()
    );
    Ok(())
}

async fn run_sort(config: &QrMagicConfig, args: SortArgs) -> CliResult<()> {
    let mut session = ImageSortSession::new(config.imagesort.clone());
    session.hide_filled = args.hide_filled;

    for input in &args.input {
        let count = session.import_ndjson(input)?;
        tracing::info!(path = %input.display(), count, "Imported scan results");
    }

    let images = collect_images(&args.paths)?;
    if !images.is_empty() {
        let client = QrMagicClient::new(config)?;
        let report = session.scan_files(&client, &images).await;
        for failed in &report.failed {
            eprintln!("Failed: {}: {}", failed.path.display(), failed.error);
        }
    }

    if args.autofill {
        let filled = session.autofill_all();
        tracing::info!(filled, "Autofilled IDs");
    }

    for assignment in &args.set_ids {
        let (index, id) = assignment
            .split_once('=')
            .ok_or_else(|| format!("expected INDEX=ID, got '{assignment}'"))?;
        session.set_id(index.trim().parse()?, id.trim())?;
    }

    println!("{:>4}  {:<20}  {:<19}  FILENAME", "#", "ID", "DATETIME");
    for (index, record) in session.visible() {
        println!(
            "{:>4}  {:<20}  {:<19}  {}",
            index,
            record.id,
            record.datestr(),
            record.filename
        );
    }
    eprintln!(
        "{} images, {} without an ID",
        session.records().len(),
        session.unlabelled_count()
    );

    if let Some(path) = &args.script {
        fs::write(path, session.renamer_script()? + "\n")?;
        tracing::info!(path = %path.display(), "Rename script written");
    }
    Ok(())
}

fn sheet_for(args: &SheetArgs) -> CliResult<LabelSheet> {
    let mut sheet = LabelSheet::new();
    sheet.select(&args.label_type)?;
    if let Some(layout) = &args.layout {
        sheet.set_layout(layout)?;
    }
    Ok(sheet)
}

async fn run_labels(config: &QrMagicConfig, command: LabelCommands) -> CliResult<()> {
    match command {
        LabelCommands::List => {
            for label_type in LABEL_TYPES {
                println!("{}", label_type.list_line());
            }
        }
        LabelCommands::Sheet {
            sheet,
            id_file,
            output,
        } => {
            let mut sheet = sheet_for(&sheet)?;
            if let Some(path) = &id_file {
                let overflow = sheet.fill(labels::read_id_file(path)?);
                if overflow > 0 {
                    eprintln!("{overflow} IDs did not fit on the sheet");
                }
            }

            for row in sheet.rows() {
                println!("{}", row.join("\t"));
            }
            let path = output.unwrap_or_else(|| PathBuf::from(labels::LABEL_LIST_NAME));
            fs::write(&path, sheet.label_list() + "\n")?;
            eprintln!("Wrote {}", path.display());
            if let Some(command) = sheet.command() {
                println!("{command}");
            }
        }
        LabelCommands::Pdf {
            sheet,
            id_file,
            output,
        } => {
            let sheet = sheet_for(&sheet)?;
            let ids = labels::read_id_file(&id_file)?;
            let request = sheet.ids_request(&ids)?;
            let client = QrMagicClient::new(config)?;
            let pdf = client.generate_labels(&request).await?;
            fs::write(&output, &pdf)?;
            eprintln!("Wrote {} ({} bytes)", output.display(), pdf.len());
        }
        LabelCommands::Range {
            sheet,
            format,
            start,
            end,
            pdf,
        } => {
            let sheet = sheet_for(&sheet)?;
            let mut out = io::BufWriter::new(io::stdout().lock());
            for id in labels::expand_id_range(&format, start, end)? {
                writeln!(out, "{id}")?;
            }
            out.flush()?;
            if let Some(path) = pdf {
                let request = sheet.range_request(&format, start, end)?;
                let client = QrMagicClient::new(config)?;
                let bytes = client.generate_labels(&request).await?;
                fs::write(&path, &bytes)?;
                eprintln!("Wrote {} ({} bytes)", path.display(), bytes.len());
            }
        }
    }
    Ok(())
}

fn run_localities(file: &Path, select: Option<&str>, terrain: bool, no_map: bool, json: bool) -> CliResult<()> {
    let mut view = MapView::from_file(file)?;
    if terrain {
        view.toggle_basemap();
    }
    if let Some(name) = select {
        view.select(name)?;
    }
    if no_map {
        view.set_panel(PanelLayout::None);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    if view.is_empty() {
        eprintln!("No localities in {}", file.display());
        return Ok(());
    }
    eprintln!("{} localities", view.len());

    for locality in view.localities() {
        println!(
            "{:<24}  {:>10.5}  {:>11.5}  {:>3} individuals  {}",
            locality.locality_name,
            locality.lat,
            locality.lon,
            locality.individuals.len(),
            locality.locality_description
        );
    }
    if let Some(bounds) = view.bounds() {
        println!(
            "bounds: SW {:.5},{:.5}  NE {:.5},{:.5}",
            bounds.south_west.0, bounds.south_west.1, bounds.north_east.0, bounds.north_east.1
        );
    }
    println!(
        "basemap: {} (subdomains {}, max zoom {})",
        view.basemap.tile_url(),
        view.basemap.subdomains(),
        view.basemap.max_zoom()
    );
    println!("tiles: {}", view.basemap.attribution());

    if let Some(current) = view.current() {
        let map = match view.panel {
            PanelLayout::None => "hidden".to_string(),
            panel => format!("{}%", panel.map_height().unwrap_or(0)),
        };
        println!("\n{} (map {map})", current.locality_name);
        for individual in &current.individuals {
            println!(
                "  {:<20}  {:<20}  {} images",
                individual.individual,
                individual.datetime,
                individual.images.len()
            );
        }
    }
    Ok(())
}
