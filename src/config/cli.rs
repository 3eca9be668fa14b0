use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "formfill")]
#[command(about = "Fill PDF legal forms from source documents via LLM extraction")]
pub struct Cli {
    #[arg(long, default_value = "config.yaml", help = "Path to the YAML configuration")]
    pub config: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON-formatted logs (for batch/scheduled runs)")]
    pub log_json: bool,

    #[arg(long, help = "Enable system monitoring")]
    pub monitor: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fill one target form from source documents
    FillForm {
        /// Blank PDF form to fill
        target_form: String,
        /// Where to write the filled PDF
        output: String,
        #[arg(long, value_delimiter = ',', required = true, help = "Source documents (PDF or text)")]
        sources: Vec<String>,
    },
    /// Run several fill jobs described by a JSON job file
    Batch {
        /// JSON file with a top-level "jobs" array
        jobs: String,
    },
    /// Dump the fillable fields of a target form
    Analyze {
        target_form: String,
    },
    /// Report which extraction providers are usable in this environment
    CheckProviders,
}
