use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::block::BlockKeyword;
use crate::channels::{get_channel_info, BlockSummary};
use crate::config::{Loader, NfscopeConfig};
use crate::include::{find_functions, find_processes};
use crate::index::{conda, containers, CommandSource, CondaPackage, ContainerImage, IndexCache};
use crate::labels::config_labels;
use crate::params::params_list;
use crate::section::SectionKind;
use crate::workspace::Workspace;

#[derive(Parser)]
#[command(name = "nfscope")]
#[command(about = "Inspect processes, workflows and channels in Nextflow sources", long_about = None)]
pub struct Cli {
    /// Path to config file (layered over the workspace's nfscope.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Workspace root (default: current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the channels of one section of a process or workflow
    Channels {
        /// File containing the block
        file: PathBuf,

        /// Process or workflow name
        name: String,

        /// Section to extract
        #[arg(short = 's', long = "section", value_enum, default_value = "output")]
        section: SectionKind,

        /// Block keyword (default: the one the section belongs to)
        #[arg(short = 'k', long = "keyword", value_enum)]
        keyword: Option<BlockKeyword>,
    },

    /// Show inputs and outputs of a process, or takes and emits of a workflow
    Summary {
        /// File containing the block
        file: PathBuf,

        /// Process or workflow name
        name: String,
    },

    /// Find the file defining a name used by a script
    Locate {
        /// Script referring to the name
        script: PathBuf,

        /// Name as used in the script (aliases are resolved)
        name: String,
    },

    /// List includable processes and functions of a file
    Declarations {
        /// Workflow script
        file: PathBuf,
    },

    /// List withLabel selectors from every config file in the workspace
    Labels,

    /// List params and their defaults from the workspace's params config
    Params,

    /// Fetch an index and store it in the cache directory
    FetchIndex {
        #[arg(value_enum)]
        index: IndexKind,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum IndexKind {
    Conda,
    Containers,
}

/// Run the CLI by parsing process arguments
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run_cli_with_args(cli)
}

/// Run the CLI with provided arguments
pub fn run_cli_from_args(args: Vec<String>) -> Result<()> {
    let cli = Cli::parse_from(args);
    run_cli_with_args(cli)
}

fn load_config(cli: &Cli, root: &Path) -> Result<NfscopeConfig> {
    let mut loader = Loader::new().with_workspace(root);
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    loader.with_env().build().context("Failed to load configuration")
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}

fn run_cli_with_args(cli: Cli) -> Result<()> {
    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let config = load_config(&cli, &root)?;
    let workspace = Workspace::new(&root, config.workspace.clone());

    match &cli.command {
        Commands::Channels {
            file,
            name,
            section,
            keyword,
        } => {
            let keyword = keyword.unwrap_or_else(|| section.block_keyword());
            let entries = get_channel_info(file, keyword, name, *section)?;
            emit(cli.json, &entries, || {
                entries
                    .iter()
                    .enumerate()
                    .map(|(i, e)| {
                        if section.is_output() {
                            format!("{}: {}\n", e.label(i), e.expression)
                        } else {
                            format!("{}\n", e.expression)
                        }
                    })
                    .collect()
            })?;
        }

        Commands::Summary { file, name } => {
            let summary = BlockSummary::from_path(file, name)?;
            emit(cli.json, &summary, || match &summary {
                Some(summary) => render_summary(summary),
                None => format!("{name} not found in {}\n", file.display()),
            })?;
        }

        Commands::Locate { script, name } => {
            let text = fs::read_to_string(script)
                .with_context(|| format!("Failed to read {}", script.display()))?;
            let located = workspace.locate_block(script, &text, name)?;
            let found = located
                .as_ref()
                .map(|l| (workspace.display_path(&l.path), &l.summary));
            emit(cli.json, &found, || match &found {
                Some((path, summary)) => format!("{path}\n{}", render_summary(summary)),
                None => format!("{name} not found\n"),
            })?;
        }

        Commands::Declarations { file } => {
            let text = fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let processes = find_processes(&text);
            let functions = find_functions(&text);
            let value = serde_json::json!({ "processes": processes, "functions": functions });
            emit(cli.json, &value, || {
                let mut out = String::new();
                for p in &processes {
                    out.push_str(&format!("process {p}\n"));
                }
                for f in &functions {
                    out.push_str(&format!("def {f}\n"));
                }
                out
            })?;
        }

        Commands::Labels => {
            let mut labels = Vec::new();
            for path in workspace.config_files() {
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                labels.extend(config_labels(&file_name, &text));
            }
            emit(cli.json, &labels, || {
                labels
                    .iter()
                    .map(|l| format!("{}: {}\n", l.config, l.label))
                    .collect()
            })?;
        }

        Commands::Params => {
            let path = workspace.params_config_path();
            let text = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let params = params_list(&text).unwrap_or_default();
            emit(cli.json, &params, || {
                params
                    .iter()
                    .map(|p| format!("params.{} = {}\n", p.name, p.default))
                    .collect()
            })?;
        }

        Commands::FetchIndex { index } => {
            let cache_dir = config.cache.resolve_dir(&root);
            let count = match index {
                IndexKind::Conda => IndexCache::<CondaPackage>::new(&cache_dir, conda::CACHE_NAME)
                    .fetch_and_cache(&CommandSource::new(
                        config.indexes.conda_command.clone(),
                        conda::parse_search_output,
                    ))?,
                IndexKind::Containers => IndexCache::<ContainerImage>::new(&cache_dir, containers::CACHE_NAME)
                    .fetch_and_cache(&CommandSource::new(
                        config.indexes.container_listing_command.clone(),
                        containers::parse_listing,
                    ))?,
            };
            println!("Cached {count} records in {}", cache_dir.display());
        }
    }

    Ok(())
}

fn render_summary(summary: &BlockSummary) -> String {
    let (input_title, output_title) = if summary.is_process() {
        ("Input", "Output")
    } else {
        ("Take", "Emit")
    };
    let mut out = format!("{} {}\n", summary.keyword, summary.name);
    out.push_str(&format!("{input_title} channels:\n"));
    for entry in &summary.inputs {
        out.push_str(&format!("  {}\n", entry.expression));
    }
    out.push_str(&format!("{output_title} channels:\n"));
    for (i, entry) in summary.outputs.iter().enumerate() {
        out.push_str(&format!("  {}: {}\n", entry.label(i), entry.expression));
    }
    out
}
