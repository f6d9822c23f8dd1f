//! `linkpost` binary: run, resume and inspect link → post pipelines.

mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use linkpost::{Collaborators, PipelineConfig, PipelineSettings};

#[derive(Parser, Debug)]
#[command(name = "linkpost")]
#[command(about = "Turn links into a reviewed social media post")]
struct Args {
    #[command(subcommand)]
    cmd: Command,

    /// SQLite file for checkpoints and the link cache (default: LINKPOST_DB or the data dir)
    #[arg(long, value_name = "PATH", global = true)]
    db: Option<PathBuf>,

    /// Pretty-print JSON output (multi-line)
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a run; prints the review payload when it pauses
    Run(RunArgs),
    /// Resume a paused run with a reviewer response (JSON or plain text, e.g. "accept")
    Resume {
        run_id: String,
        response: String,
    },
    /// Show the latest checkpoint of a run
    Status { run_id: String },
    /// Inspect or clear the used-links cache
    Cache {
        #[command(subcommand)]
        sub: CacheCommand,
    },
    /// Print the pipeline graph
    Graph {
        /// Graphviz DOT instead of text
        #[arg(long)]
        dot: bool,
    },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Links to turn into a post
    #[arg(required = true)]
    links: Vec<String>,
    /// Do not filter links already used by earlier posts
    #[arg(long)]
    skip_dedup: bool,
    /// Treat every fetched link as relevant
    #[arg(long)]
    skip_relevancy: bool,
    /// Publish without an image
    #[arg(long)]
    text_only: bool,
    /// Post from the organization account
    #[arg(long)]
    org: bool,
    /// Run id (default: random)
    #[arg(long, value_name = "ID")]
    run_id: Option<String>,
}

#[derive(Subcommand, Debug)]
enum CacheCommand {
    /// Print the stored links
    Show,
    /// Remove every stored link
    Clear,
}

fn print_json(value: &serde_json::Value, pretty: bool) -> Result<(), Box<dyn std::error::Error>> {
    let s = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", s);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    config::load_and_apply(cli::APP_NAME, None::<&std::path::Path>).ok();
    logging::init()?;

    let args = Args::parse();
    let db = args.db.clone().unwrap_or_else(cli::default_db_path);
    let pipeline = cli::open_pipeline(&db, Collaborators::from_env(), PipelineSettings::from_env())?;

    match args.cmd {
        Command::Run(run) => {
            let config = PipelineConfig {
                skip_dedup_check: run.skip_dedup,
                skip_relevancy_check: run.skip_relevancy,
                text_only_mode: run.text_only,
                post_to_organization_account: run.org,
            };
            let out = cli::run(&pipeline, run.links, config, run.run_id).await?;
            print_json(&out, args.pretty)?;
        }
        Command::Resume { run_id, response } => {
            let out = cli::resume(&pipeline, &run_id, &response).await?;
            print_json(&out, args.pretty)?;
        }
        Command::Status { run_id } => {
            let out = cli::status(&pipeline, &run_id).await?;
            print_json(&out, args.pretty)?;
        }
        Command::Cache { sub } => {
            let out = match sub {
                CacheCommand::Show => cli::cache_show(&pipeline).await,
                CacheCommand::Clear => cli::cache_clear(&pipeline).await?,
            };
            print_json(&out, args.pretty)?;
        }
        Command::Graph { dot } => {
            println!("{}", cli::graph(&pipeline, dot));
        }
    }
    Ok(())
}
