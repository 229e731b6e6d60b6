//! onto-release - versioned ontology documentation CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};

use onto_release::competency::CompetencyOutcome;
use onto_release::config::DEFAULT_CONFIG_FILE;
use onto_release::ontology::{iri_table, OntologyGraph};
use onto_release::{Pipeline, PipelineConfig, RunSummary};

#[derive(Parser)]
#[command(name = "onto-release")]
#[command(version)]
#[command(about = "Build versioned ontology documentation from git release tags", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: onto-release.yaml in the repository)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Git repository holding the version tags
    #[arg(long, global = true)]
    repo: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Build documentation for every version tag
    Build {
        /// Output root
        #[arg(long)]
        out: Option<PathBuf>,
        /// WIDOCO jar, run with `java -jar`
        #[arg(long)]
        generator_jar: Option<PathBuf>,
        /// Summary format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List version tags in release order
    Tags,
    /// Print the IRI table of an ontology file
    Iris {
        /// Ontology file
        #[arg(long)]
        file: PathBuf,
        /// Label language
        #[arg(long, default_value = "en")]
        lang: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match cli.verbose {
        0 => "onto_release=info",
        1 => "onto_release=debug",
        _ => "onto_release=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).with_writer(std::io::stderr).init();
        }
    }
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => {
            let repo = cli.repo.clone().unwrap_or_else(|| PathBuf::from("."));
            PipelineConfig::load_from_repository(&repo)
                .with_context(|| format!("loading {}", repo.join(DEFAULT_CONFIG_FILE).display()))?
        }
    };

    if let Some(repo) = &cli.repo {
        config.repository = repo.clone();
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    match &cli.command {
        Commands::Build {
            out,
            generator_jar,
            format,
        } => {
            let mut config = load_config(&cli)?;
            if let Some(out) = out {
                config.output_dir = out.clone();
            }
            if let Some(jar) = generator_jar {
                config.generator.program = "java".to_string();
                config.generator.args = vec!["-jar".to_string(), jar.to_string_lossy().to_string()];
            }
            config.validate()?;

            let summary = Pipeline::new(config).run().context("release build failed")?;
            print_summary(&summary, *format)?;
        }

        Commands::Tags => {
            let config = load_config(&cli)?;
            let tags = Pipeline::new(config).version_tags()?;
            if tags.is_empty() {
                eprintln!("{} no version tags", "info:".yellow().bold());
            }
            for tag in tags {
                println!("{}\t{}", tag.name(), tag.version());
            }
        }

        Commands::Iris { file, lang } => {
            print!("{}", render_iris(file, lang)?);
        }
    }

    Ok(())
}

fn render_iris(file: &Path, lang: &str) -> Result<String> {
    let graph = OntologyGraph::load(file).with_context(|| format!("loading {}", file.display()))?;
    Ok(iri_table(&graph, lang)?)
}

fn print_summary(summary: &RunSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(summary)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(summary)?),
        OutputFormat::Text => {
            if summary.is_empty() {
                println!("{} no version tags, nothing built", "info:".yellow().bold());
                return Ok(());
            }
            for report in &summary.tags {
                let status = if report.generation.success {
                    "ok".green().bold()
                } else {
                    "generator failed".yellow().bold()
                };
                println!("{} {} -> {}", status, report.tag.bold(), report.output_dir.display());
                println!("  {} {}", "→".yellow(), report.metadata.version_iri);
                if let Some(prior) = &report.metadata.prior_version {
                    println!("  {} prior {}", "→".yellow(), prior);
                }
                match &report.competency {
                    CompetencyOutcome::Answered(cq) => {
                        println!("  {} {} competency questions answered", "→".yellow(), cq.answers.len())
                    }
                    CompetencyOutcome::Skipped { reason } => {
                        println!("  {} competency questions skipped: {}", "→".yellow(), reason)
                    }
                }
            }
            if let Some(latest) = summary.latest() {
                println!(
                    "{} {} mirrored into {}",
                    "latest".green().bold(),
                    latest.version,
                    summary.output_root.display()
                );
            }
        }
    }
    Ok(())
}
