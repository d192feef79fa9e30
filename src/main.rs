// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use annodoc::app_config::{self, Config};
use annodoc::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export annotations and their images to a PDF report (default command)
    Export(ExportArgs),

    /// Check that every annotation's image exists in the image folder
    Check(SourceArgs),

    /// Create an empty annotation file if it does not exist yet
    Init(SourceArgs),

    /// Generate shell completions for annodoc
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Where annotations and images come from
#[derive(Args, Debug, Clone)]
struct SourceArgs {
    /// Annotation JSON file (overrides the config file)
    #[arg(value_name = "ANNOTATION_FILE")]
    annotation_file: Option<PathBuf>,

    /// Folder with the annotated images
    #[arg(short, long)]
    image_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Args, Debug, Clone)]
struct ExportArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output PDF path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum number of annotations to export, from the start of the list
    #[arg(short = 'n', long)]
    max_images: Option<usize>,

    /// Images wider than this many pixels are downsampled
    #[arg(short = 'w', long)]
    max_width: Option<u32>,

    /// JPEG quality for embedded images (1-100)
    #[arg(short = 'q', long)]
    jpeg_quality: Option<u8>,

    /// Embed image files as-is: no bounding boxes, no resizing, no recompression
    #[arg(long)]
    raw_images: bool,
}

/// annodoc - annotation report exporter
///
/// Renders a JSON list of image annotations, with their bounding boxes drawn
/// onto the images, into a paginated PDF report.
#[derive(Parser, Debug)]
#[command(name = "annodoc")]
#[command(version)]
#[command(about = "Export image annotations to a PDF report")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "annodoc renders a JSON list of image annotations into a PDF report:
one page block per annotation with the image (bounding boxes drawn) followed
by the pretty-printed annotation.

EXAMPLES:
    annodoc                                       # Export using conf.json
    annodoc annotations/annotations.json          # Export a specific annotation file
    annodoc -i images/ -o report.pdf data.json    # Choose image folder and output
    annodoc -n 20 -q 60 data.json                 # First 20 annotations, smaller images
    annodoc --raw-images data.json                # Embed images unmodified
    annodoc check -i images/ data.json            # Report missing and unused images
    annodoc init data.json                        # Start an empty annotation file
    annodoc completions bash > annodoc.bash       # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    export: ExportArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger itself lets everything through; log::max_level does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour escape for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "annodoc", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Export(args)) => run_export(args),
        Some(Commands::Check(args)) => run_check(args),
        Some(Commands::Init(args)) => run_init(args),
        None => run_export(cli.export),
    }
}

// Load the config file and apply source overrides and the log level
fn load_config(args: &SourceArgs) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(level) = args.log_level {
        let level: app_config::LogLevel = level.into();
        log::set_max_level(level.into());
    }

    let mut config = Config::load_or_create(&args.config_path)?;

    if let Some(annotation_file) = &args.annotation_file {
        config.annotation_file = annotation_file.clone();
    }

    if let Some(image_dir) = &args.image_dir {
        config.image_dir = image_dir.clone();
    }

    match args.log_level {
        Some(level) => config.log_level = level.into(),
        // Just update the max level without reinitializing the logger
        None => log::set_max_level(config.log_level.into()),
    }

    Ok(config)
}

fn run_export(args: ExportArgs) -> Result<()> {
    let mut config = load_config(&args.source)?;

    if let Some(output) = args.output {
        config.output_file = output;
    }

    if let Some(max_images) = args.max_images {
        config.max_images = max_images;
    }

    if let Some(max_width) = args.max_width {
        config.image.max_pixel_width = max_width;
    }

    if let Some(jpeg_quality) = args.jpeg_quality {
        config.image.jpeg_quality = jpeg_quality;
    }

    if args.raw_images {
        config.image.processing = false;
    }

    let controller = Controller::with_config(config)?;
    let report = controller.run_export_interactive().inspect_err(|e| error!("{:#}", e))?;

    if !report.skipped.is_empty() {
        info!("{} of {} annotations were skipped", report.skipped.len(), report.selected);
    }

    Ok(())
}

fn run_check(args: SourceArgs) -> Result<()> {
    let config = load_config(&args)?;
    let controller = Controller::with_config(config)?;
    controller.check().inspect_err(|e| error!("{:#}", e))?;
    Ok(())
}

fn run_init(args: SourceArgs) -> Result<()> {
    let config = load_config(&args)?;
    let controller = Controller::with_config(config)?;
    controller.init_annotation_file()?;
    Ok(())
}
