use clap::{Parser, Subcommand};
use docsite::adapters::Adapters;
use docsite::config::{self, SiteConfig, SiteMetadata, Topology};
use docsite::export::{self, DirectoryPackager, ExportOptions, Packager};
use docsite::output;
use docsite::project::{self, FileStore, ProjectRecord};
use docsite::render::RenderContext;
use docsite::session::{self, ConversionSession};
use docsite::types::FileQueue;
use std::error::Error;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that write a site.
#[derive(clap::Args, Clone)]
struct ExportArgs {
    /// Output directory
    #[arg(long, short)]
    output: PathBuf,

    /// Site layout (overrides [export] topology)
    #[arg(long, value_enum)]
    topology: Option<Topology>,

    /// Add a web manifest, app icon and offline script
    #[arg(long)]
    pwa: bool,
}

#[derive(Parser)]
#[command(name = "docsite")]
#[command(about = "Turn a pile of documents into a small static site")]
#[command(long_about = "\
Turn a pile of documents into a small static site

Every input becomes one or more pages, in the order given:

  report.pdf      one page per PDF page (or just the first, see config)
  letter.docx     one page
  notes.md        one page, rendered markdown
  people.csv      one page with a table, first row is the header
  scan.png        one page with the image and its OCR text
  data.json       one page, pretty-printed
  anything else   one page of plain text

Directories are expanded recursively, in file name order.

Layouts:
  single   index.html with everything inline
  split    index.html + styles.css + script.js
  multi    index.html + pages/page-N.html + shared assets

PDF, DOCX and OCR need an external engine; without one those files are
reported as failed and the rest of the batch still converts.

Run 'docsite gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// Directory where the project is saved
    #[arg(long, default_value = ".docsite", global = true)]
    store: PathBuf,

    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert inputs into pages and report statistics
    Convert {
        /// Files or directories to convert
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Save the project for later export
        #[arg(long)]
        save: bool,
    },
    /// Convert inputs and export the site in one go
    Build {
        /// Files or directories to convert
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        export: ExportArgs,

        /// Save the project for later export
        #[arg(long)]
        save: bool,
    },
    /// Export the saved project
    Export(ExportArgs),
    /// Show statistics and a per-page word chart for the saved project
    Stats,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Convert { inputs, save } => {
            let site_config = config::load_config(&cli.config)?;
            let queue = FileQueue::from_paths(&inputs)?;
            let session = convert(&queue, &site_config)?;
            if save {
                save_project(&cli.store, &queue, &session, &site_config.site)?;
            }
        }
        Command::Build {
            inputs,
            export,
            save,
        } => {
            let site_config = config::load_config(&cli.config)?;
            let queue = FileQueue::from_paths(&inputs)?;
            let session = convert(&queue, &site_config)?;
            if save {
                save_project(&cli.store, &queue, &session, &site_config.site)?;
            }
            export_site(&session, &site_config.site, &site_config, &export)?;
        }
        Command::Export(export) => {
            let site_config = config::load_config(&cli.config)?;
            let record = project::load_project(&FileStore::new(&cli.store))?;
            export_site(&record.session(), &record.site, &site_config, &export)?;
        }
        Command::Stats => {
            let record = project::load_project(&FileStore::new(&cli.store))?;
            output::print_analytics(&record.session());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Run a conversion, printing events as they arrive.
fn convert(queue: &FileQueue, site_config: &SiteConfig) -> Result<ConversionSession, Box<dyn Error>> {
    let adapters = Adapters::builtin();
    let (tx, rx) = std::sync::mpsc::sync_channel(64);
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_convert_event(&event) {
                println!("{}", line);
            }
        }
    });
    let session = session::run(queue.files(), &site_config.conversion, &adapters, Some(&tx));
    drop(tx);
    printer.join().map_err(|_| "output thread panicked")?;
    Ok(session)
}

fn save_project(
    store: &std::path::Path,
    queue: &FileQueue,
    session: &ConversionSession,
    site: &SiteMetadata,
) -> Result<(), Box<dyn Error>> {
    let record = ProjectRecord::new(queue.files(), session, site);
    project::save_project(&mut FileStore::new(store), &record)?;
    println!("Saved project \u{2192} {}", store.display());
    Ok(())
}

fn export_site(
    session: &ConversionSession,
    site: &SiteMetadata,
    site_config: &SiteConfig,
    args: &ExportArgs,
) -> Result<(), Box<dyn Error>> {
    let options = ExportOptions {
        topology: args.topology.unwrap_or(site_config.export.topology),
        pwa: args.pwa || site_config.export.pwa,
    };
    let ctx = RenderContext {
        pages: session.pages(),
        settings: session.settings(),
        site,
        theme: &site_config.theme,
        pwa: options.pwa,
    };
    let bundle = export::assemble(&ctx, options)?;
    let dest = DirectoryPackager::new(&args.output).package(&bundle)?;
    output::print_bundle(&bundle, &dest);
    Ok(())
}
