//! swlevel - Swadge level converter
//!
//! Exports editor documents (JSON) to the binary level formats and imports
//! the formats that can be read back.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use swlevel_config::{ExportConfig, DEFAULT_CONFIG_FILE};
use swlevel_levels::{Document, FormatOptions, MapFormat};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Swadge level converter")]
struct Cli {
    /// Options file (defaults to ./exportoptions.txt when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a level document to a binary level file.
    Export {
        document: PathBuf,
        #[arg(short, long)]
        format: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Read a binary level file back into a level document.
    Import {
        level: PathBuf,
        #[arg(short, long)]
        format: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the registered formats.
    Formats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // subscriber goes up before the options are parsed so their warnings show
    let content = read_config(cli.config.as_deref())?;
    let log_level = content
        .as_deref()
        .and_then(ExportConfig::log_level_hint)
        .unwrap_or_else(|| ExportConfig::default().log_level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = load_config(content.as_deref())?;
    config.display();

    let options = config.format_options();
    match cli.command {
        Command::Export {
            document,
            format,
            output,
        } => {
            let format = resolve_format(format.as_deref(), &config)?;
            let output = output.unwrap_or_else(|| document.with_extension(format.extension()));
            export_level(&document, format, &output, &options)
        }
        Command::Import {
            level,
            format,
            output,
        } => {
            let format = resolve_format(format.as_deref(), &config)?;
            let output = output.unwrap_or_else(|| level.with_extension("json"));
            import_level(&level, format, &output, &options)
        }
        Command::Formats => {
            list_formats();
            Ok(())
        }
    }
}

/// Named options file, else the default one when it exists
fn read_config(path: Option<&Path>) -> Result<Option<String>> {
    match path {
        Some(path) => fs::read_to_string(path)
            .map(Some)
            .with_context(|| format!("load {}", path.display())),
        None => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            if !path.exists() {
                return Ok(None);
            }
            fs::read_to_string(path)
                .map(Some)
                .with_context(|| format!("load {}", path.display()))
        }
    }
}

fn load_config(content: Option<&str>) -> Result<ExportConfig> {
    match content {
        Some(content) => ExportConfig::load_from_str(content).map_err(|e| anyhow!("{}", e)),
        None => {
            debug!("No options file, using defaults");
            Ok(ExportConfig::default())
        }
    }
}

/// Format from the command line, else the configured default
fn resolve_format(name: Option<&str>, config: &ExportConfig) -> Result<MapFormat> {
    match name {
        Some(name) => Ok(name.parse::<MapFormat>()?),
        None => config
            .format
            .ok_or_else(|| anyhow!("no format given; pass --format or set format in the options file")),
    }
}

fn export_level(
    document: &Path,
    format: MapFormat,
    output: &Path,
    options: &FormatOptions,
) -> Result<()> {
    let doc = Document::load_file(document)
        .with_context(|| format!("read {}", document.display()))?;
    debug!("Loaded {} ({} layers)", document.display(), doc.layers.len());

    let bytes = format
        .write(&doc, options)
        .with_context(|| format!("export {} as {}", document.display(), format))?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(output, &bytes).with_context(|| format!("write {}", output.display()))?;

    info!("Exported {} -> {} ({} bytes)", document.display(), output.display(), bytes.len());
    Ok(())
}

fn import_level(
    level: &Path,
    format: MapFormat,
    output: &Path,
    options: &FormatOptions,
) -> Result<()> {
    if !format.can_read() {
        bail!("{} levels cannot be imported", format);
    }

    let bytes = fs::read(level).with_context(|| format!("read {}", level.display()))?;
    let doc = format
        .read(&bytes, options)
        .with_context(|| format!("import {} as {}", level.display(), format))?;
    doc.save_file(output)
        .with_context(|| format!("write {}", output.display()))?;

    info!("Imported {} -> {}", level.display(), output.display());
    Ok(())
}

fn list_formats() {
    for format in MapFormat::ALL {
        let access = if format.can_read() { "read/write" } else { "write" };
        println!(
            "{:<14} {:<14} *.{}  {:<10} {}",
            format.key(),
            format.name(),
            format.extension(),
            access,
            format.description()
        );
    }
}
