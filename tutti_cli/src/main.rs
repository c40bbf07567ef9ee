use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tutti_schema::CompiledScore;

#[derive(Debug, Parser)]
#[command(name = "tutti")]
#[command(about = "Score compiler CLI", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile a score into per-instance parts (JSON).
    Compile {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the instrument instances a score resolves to.
    Instances { input: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::Level::Warn,
        1 => log::Level::Info,
        2 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    simple_logger::init_with_level(level).context("failed to initialize logger")?;

    match cli.command {
        Command::Compile { input, output } => {
            let score = compile(&input)?;

            let json = serde_json::to_string_pretty(&score).context("failed to serialize parts")?;
            let out_path = output.unwrap_or_else(|| default_output_path(&input));
            fs::write(&out_path, json)
                .with_context(|| format!("failed to write: {}", out_path.display()))?;
            log::info!(
                "wrote {} part(s) to {}",
                score.parts.len(),
                out_path.display()
            );
        }
        Command::Instances { input } => {
            let score = compile(&input)?;
            for part in &score.parts {
                println!("{}: {} events", part.instance(), part.events.len());
            }
        }
    }

    Ok(())
}

fn compile(input: &Path) -> anyhow::Result<CompiledScore> {
    tutti_compiler::compile_file(input)
        .map_err(|e| anyhow::anyhow!(e.to_string()))
        .with_context(|| format!("compile failed: {}", input.display()))
}

fn default_output_path(input: &Path) -> PathBuf {
    let mut out = input.to_path_buf();
    out.set_extension("parts.json");
    out
}
