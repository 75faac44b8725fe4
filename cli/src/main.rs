//! aiready CLI - convert documents into AI-ready Markdown or JSON

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use aiready::vision::{ProviderKind, VisionConfig, DEFAULT_PROVIDER, PROVIDER_VAR};
use aiready::{AiReady, OutputFormat, ReverseRegistry};

#[derive(Parser)]
#[command(name = "aiready")]
#[command(version)]
#[command(about = "Convert documents into AI-ready Markdown or JSON, and Markdown back into Word", long_about = None)]
struct Cli {
    /// Never call a vision provider for images
    #[arg(long, global = true)]
    no_vision: bool,

    /// Vision provider for images (openai, anthropic, gemini)
    #[arg(long, global = true, value_name = "NAME")]
    vision_provider: Option<String>,

    /// Skip OCR on images
    #[arg(long, global = true)]
    no_ocr: bool,

    /// Output compact JSON
    #[arg(long, global = true)]
    compact: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one or more files, writing one output file each
    Convert {
        /// Input files
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output format (defaults to JSON for spreadsheets and images, Markdown otherwise)
        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Convert a file to Markdown
    #[command(alias = "md")]
    Markdown {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Convert a file to JSON
    Json {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Convert Markdown back into a Word document
    Reverse {
        /// Input Markdown file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// List supported file extensions
    Formats,

    /// List vision providers and their credential variables
    Providers,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Markdown with a provenance header
    Md,
    /// JSON envelope
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Md => OutputFormat::Markdown,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let builder = builder_for(&cli);
    let result = match cli.command {
        Commands::Convert {
            inputs,
            format,
            output,
        } => cmd_convert(&builder, &inputs, format.map(Into::into), output.as_deref()),
        Commands::Markdown { input, output } => {
            cmd_single(&builder, &input, OutputFormat::Markdown, output.as_deref())
        }
        Commands::Json { input, output } => {
            cmd_single(&builder, &input, OutputFormat::Json, output.as_deref())
        }
        Commands::Reverse { input, output } => cmd_reverse(&input, output.as_deref()),
        Commands::Formats => {
            cmd_formats(&builder);
            Ok(())
        }
        Commands::Providers => {
            cmd_providers(builder.options().vision.clone());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn builder_for(cli: &Cli) -> AiReady {
    let mut builder = AiReady::new();
    if let Some(provider) = &cli.vision_provider {
        builder = builder.with_vision_provider(provider.as_str());
    }
    if cli.no_vision {
        builder = builder.without_vision();
    }
    if cli.no_ocr {
        builder = builder.without_ocr();
    }
    if cli.compact {
        builder = builder.compact_json();
    }
    builder
}

fn cmd_convert(
    builder: &AiReady,
    inputs: &[PathBuf],
    format: Option<OutputFormat>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;

    let registry = builder.registry();
    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut written = Vec::new();
    let mut failed = 0usize;
    for input in inputs {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.display().to_string());
        pb.set_message(name.clone());

        match registry.convert(input, format) {
            Ok(result) => {
                let path = output_dir.join(&result.filename);
                fs::write(&path, &result.content)?;
                written.push(path);
            }
            Err(e) => {
                pb.println(format!("{} {}: {}", "Failed".red(), name, e));
                failed += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if !written.is_empty() {
        println!("{}", "Output files:".green().bold());
        for (i, path) in written.iter().enumerate() {
            let branch = if i + 1 == written.len() { "└─" } else { "├─" };
            println!("  {} {}", branch.dimmed(), path.display());
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} files failed", failed, inputs.len()).into());
    }
    Ok(())
}

fn cmd_single(
    builder: &AiReady,
    input: &Path,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = builder.convert(input, Some(format))?;

    if let Some(path) = output {
        fs::write(path, &result.content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", result.content);
    }
    Ok(())
}

fn cmd_reverse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let registry = ReverseRegistry::with_defaults();
    let result = registry.convert(input)?;

    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;

    let path = output_dir.join(&result.filename);
    fs::write(&path, &result.content)?;
    println!("{} {}", "Saved to".green(), path.display());
    Ok(())
}

fn cmd_formats(builder: &AiReady) {
    let registry = builder.registry();
    println!("{}", "Forward (to Markdown / JSON)".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for ext in registry.supported_extensions() {
        let extractor = registry.get_by_extension(ext).map(|e| e.name().to_string());
        println!("  .{:<8} {}", ext, extractor.unwrap_or_default().dimmed());
    }

    let reverse = ReverseRegistry::with_defaults();
    println!();
    println!("{}", "Reverse (to Word)".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for ext in reverse.supported_extensions() {
        let target = reverse
            .get_by_extension(ext)
            .map(|c| format!(".{}", c.target_extension()));
        println!("  .{:<8} {}", ext, target.unwrap_or_default().dimmed());
    }
}

fn cmd_providers(config: VisionConfig) {
    println!("{}", "Vision Providers".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for kind in ProviderKind::ALL {
        let has_key = std::env::var(kind.credential_var())
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false);
        let status = if has_key {
            "key set".green()
        } else {
            "no key".yellow()
        };
        let marker = if kind.name() == config.provider { "*" } else { " " };
        println!(
            "{} {:<10} {:<20} {:<24} {}",
            marker,
            kind.name().bold(),
            kind.credential_var(),
            kind.default_model().dimmed(),
            status
        );
    }

    println!();
    println!(
        "{}: {} (set with --vision-provider or {}, default {})",
        "Selected".bold(),
        config.provider,
        PROVIDER_VAR,
        DEFAULT_PROVIDER
    );
    if !config.enabled {
        println!("{}", "Vision analysis is disabled".yellow());
    }
}
