mod platform;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use monitor_engine::{Source, StartRequest, DEFAULT_API_URL};

#[derive(Debug, Parser)]
#[command(
    name = "scrape-monitor",
    version,
    about = "Start, stop and follow remote scraping jobs"
)]
pub struct Cli {
    /// Root url of the scraping backend.
    #[arg(
        long,
        global = true,
        env = "SCRAPE_MONITOR_API_URL",
        default_value = DEFAULT_API_URL
    )]
    pub api_url: String,

    /// Fail a stream that stays silent for this many seconds.
    #[arg(long, global = true)]
    pub idle_timeout_secs: Option<u64>,

    /// Also write diagnostics to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Increase diagnostic verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start a job and follow its progress.
    Start(StartArgs),
    /// Follow an already running job.
    Watch { task_id: String },
    /// Ask the backend to stop a job.
    Stop { task_id: String },
}

#[derive(Debug, Args)]
pub struct StartArgs {
    #[arg(long, value_enum, default_value_t = SourceArg::Maps)]
    pub source: SourceArg,
    /// Keyword or business sector.
    #[arg(long, default_value = "Coiffeur")]
    pub sector: String,
    /// City to search in (maps only).
    #[arg(long, default_value = "Paris")]
    pub city: String,
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub limit: u32,
    /// Print the task id and exit instead of following the stream.
    #[arg(long)]
    pub no_watch: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SourceArg {
    Maps,
    Linkedin,
}

impl StartArgs {
    pub fn to_request(&self) -> StartRequest {
        let source = match self.source {
            SourceArg::Maps => Source::Maps,
            SourceArg::Linkedin => Source::Linkedin,
        };
        StartRequest {
            source,
            sector: self.sector.clone(),
            city: matches!(source, Source::Maps).then(|| self.city.clone()),
            limit: self.limit,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    platform::logging::initialize(cli.log_file.clone(), cli.verbose);

    match platform::run_app(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
