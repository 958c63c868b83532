use clap::{Parser, Subcommand};
use photo_presets::acquire::LibrarySource;
use photo_presets::catalog::FilterCatalog;
use photo_presets::imaging::{
    EncodeParams, ExportFormat, ImageBackend, RustBackend, create_preview,
};
use photo_presets::session::Session;
use photo_presets::storage::{DirectoryStorage, slugify};
use photo_presets::{config, output};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "photo-presets")]
#[command(about = "Apply preset photo filters")]
#[command(long_about = "\
Apply preset photo filters

Open an image, pick one of ten preset filters, preview, save.

Filters (index, name, operation):

   0 Vivid      chrome
   1 Fade       fade
   2 Instant    instant
   3 Mono       mono
   4 Noir       noir
   5 Process    process
   6 Tonal      tonal
   7 Transfer   transfer
   8 Curve      linear-to-srgb
   9 Linear     srgb-to-linear

Filters can be named by index, name, or operation.

Run 'photo-presets gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the available filters
    Filters,
    /// Apply one filter to an image and write the result
    Apply {
        /// Source image
        input: PathBuf,
        /// Filter index, name, or operation
        #[arg(short, long)]
        filter: String,
        /// Output file (.jpg or .png)
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Render the thumbnail strip for an image
    Strip {
        /// Source image
        input: PathBuf,
        /// Directory for the thumbnails
        #[arg(long, default_value = "strip")]
        out: PathBuf,
    },
    /// Interactive editing session on stdin
    Edit,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::builder().format_timestamp_millis().init();
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let editor_config = config::load_config(&cli.config)?;
    init_thread_pool(&editor_config.processing);
    let backend = Arc::new(RustBackend::new());
    let catalog = FilterCatalog::stock();

    match cli.command {
        Command::Filters => output::print_catalog(&catalog),
        Command::Apply {
            input,
            filter,
            output: out_path,
        } => {
            let format = writable_format(&out_path)?;
            let mut session = Session::new(
                catalog,
                Arc::clone(&backend),
                editor_config.session_config(),
            );
            session.begin_acquisition(LibrarySource::new(&input, Arc::clone(&backend)))?;
            session.wait_acquisition()?;
            let index = resolve_filter(session.catalog(), &filter)?;
            session.select_filter(index)?;
            let image = session
                .current_display_image()?
                .ok_or("no image was opened")?;
            backend.encode(&image, &encode_params(&editor_config, format), &out_path)?;
            println!(
                "{} \u{2192} {} ({})",
                input.display(),
                out_path.display(),
                session.selected_name()
            );
        }
        Command::Strip { input, out } => {
            let image = backend.decode(&input)?;
            let preview = create_preview(
                backend.as_ref(),
                &image,
                &editor_config.thumbnail_config(),
            )?;
            let strip = catalog.render_strip(backend.as_ref(), &preview);

            std::fs::create_dir_all(&out)?;
            let params = EncodeParams {
                format: ExportFormat::Png,
                ..editor_config.encode_params()
            };
            let mut written = Vec::new();
            for entry in &strip.entries {
                if let Ok(thumb) = &entry.thumbnail {
                    let path = out.join(format!("{:02}-{}.png", entry.index, slugify(&entry.name)));
                    backend.encode(thumb, &params, &path)?;
                    written.push((entry.index, path));
                }
            }
            let written: Vec<(usize, &Path)> =
                written.iter().map(|(i, p)| (*i, p.as_path())).collect();
            for line in output::format_strip(&strip, &written) {
                println!("{}", line);
            }
        }
        Command::Edit => {
            let session = Session::new(
                catalog,
                Arc::clone(&backend),
                editor_config.session_config(),
            );
            let storage = DirectoryStorage::new(
                &editor_config.export.directory,
                editor_config.encode_params(),
                Arc::clone(&backend),
            );
            run_editor(session, storage, &editor_config)?;
        }
        Command::GenConfig => unreachable!("handled before config loading"),
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn writable_format(path: &Path) -> Result<ExportFormat, String> {
    ExportFormat::from_path(path)
        .ok_or_else(|| format!("cannot write {}: use .jpg or .png", path.display()))
}

fn encode_params(editor_config: &config::EditorConfig, format: ExportFormat) -> EncodeParams {
    EncodeParams {
        format,
        ..editor_config.encode_params()
    }
}

/// Filter by index, display name, or op key.
fn resolve_filter(catalog: &FilterCatalog, query: &str) -> Result<usize, String> {
    if let Ok(index) = query.parse::<usize>() {
        return Ok(index);
    }
    catalog
        .position(query)
        .ok_or_else(|| format!("unknown filter: {query} (see 'photo-presets filters')"))
}

/// REPL commands that need the session idle.
const BUSY_BLOCKED: &[&str] = &["select", "original", "show", "save"];

fn blocked_while_busy(command: &str) -> bool {
    BUSY_BLOCKED.contains(&command)
}

/// Line-oriented view layer: each command is forwarded into the session.
fn run_editor(
    mut session: Session<RustBackend>,
    mut storage: DirectoryStorage<RustBackend>,
    editor_config: &config::EditorConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Type 'help' for commands.");
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let (command, arg) = match line.trim().split_once(' ') {
            Some((c, a)) => (c, a.trim()),
            None => (line.trim(), ""),
        };

        let result: Result<(), Box<dyn std::error::Error>> = match command {
            "" => Ok(()),
            "help" => {
                output::format_edit_help()
                    .iter()
                    .for_each(|l| println!("{}", l));
                Ok(())
            }
            "quit" | "exit" => break,
            "filters" => {
                output::print_catalog(session.catalog());
                Ok(())
            }
            "open" if arg.is_empty() => Err("usage: open <path>".into()),
            "open" => session
                .begin_acquisition(LibrarySource::new(arg, Arc::clone(session.backend())))
                .map(|()| println!("Opening {} ...", arg))
                .map_err(Into::into),
            "wait" => {
                let description = session.pending_description().map(str::to_owned);
                match (session.wait_acquisition(), description) {
                    (Ok(Some(outcome)), Some(d)) => {
                        println!("{}", output::format_outcome(outcome, &d));
                        Ok(())
                    }
                    (Ok(_), _) => Ok(()),
                    (Err(e), _) => Err(e.into()),
                }
            }
            "cancel" => {
                if !session.cancel_acquisition() {
                    println!("Nothing to cancel");
                }
                Ok(())
            }
            "status" => {
                output::format_status(&session)
                    .iter()
                    .for_each(|l| println!("{}", l));
                Ok(())
            }
            _ if session.is_busy() && blocked_while_busy(command) => {
                Err("busy opening an image; 'wait' or 'cancel'".into())
            }
            "select" => resolve_filter(session.catalog(), arg)
                .map_err(Into::into)
                .and_then(|i| session.select_filter(i).map_err(Into::into))
                .map(|()| println!("Filter: {}", session.selected_name())),
            "original" => session
                .clear_filter()
                .map(|()| println!("Filter: Original"))
                .map_err(Into::into),
            "show" => show(&session, editor_config, Path::new(arg)),
            "save" => session
                .save(&mut storage)
                .map(|stored| println!("Saved {}", stored.location.display()))
                .map_err(Into::into),
            other => Err(format!("unknown command: {other} (try 'help')").into()),
        };

        if let Err(e) = result {
            println!("error: {}", e);
        }

        // Pick up an acquisition that finished while we were reading input
        let description = session.pending_description().map(str::to_owned);
        match (session.poll_acquisition(), description) {
            (Ok(Some(outcome)), Some(d)) => println!("{}", output::format_outcome(outcome, &d)),
            (Err(e), _) => println!("error: {}", e),
            _ => {}
        }
    }
    Ok(())
}

/// Write whatever the view would show, falling back to the original.
fn show(
    session: &Session<RustBackend>,
    editor_config: &config::EditorConfig,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = writable_format(path)?;
    let display = session.display();
    if let Some(failure) = &display.failure {
        println!("warning: {} (showing original)", failure);
    }
    let image = display.image.ok_or("no image open")?;
    session
        .backend()
        .encode(&image, &encode_params(editor_config, format), path)?;
    println!("Wrote {}", path.display());
    Ok(())
}
