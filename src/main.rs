//! sql-reward - scores generated SQL against reference queries.

use sql_reward::batch::score_batch;
use sql_reward::cli::{Cli, Command};
use sql_reward::config::Config;
use sql_reward::error::{RewardError, Result};
use sql_reward::logging;
use sql_reward::reward::RewardScorer;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    logging::init_stderr_logging();

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    cli.apply_overrides(&mut config)?;
    config.validate()?;

    let scorer = RewardScorer::new(config);

    match cli.command {
        Command::Score {
            db,
            candidate,
            solution,
            json,
        } => {
            let reward = scorer.score_detailed(&db, &candidate, &solution).await?;
            if json {
                let text = serde_json::to_string_pretty(&reward)
                    .map_err(|e| RewardError::internal(format!("Failed to encode reward: {e}")))?;
                println!("{text}");
            } else {
                println!("{}", reward.value);
            }
        }
        Command::Batch {
            input,
            output,
            jobs,
        } => {
            let reader: Box<dyn io::BufRead> = if input == "-" {
                Box::new(io::stdin().lock())
            } else {
                let file = File::open(&input).map_err(|e| {
                    RewardError::config(format!("Failed to open input {input}: {e}"))
                })?;
                Box::new(BufReader::new(file))
            };

            let writer: Box<dyn Write> = match &output {
                Some(path) => {
                    let file = File::create(path).map_err(|e| {
                        RewardError::config(format!(
                            "Failed to create output {}: {e}",
                            path.display()
                        ))
                    })?;
                    Box::new(BufWriter::new(file))
                }
                None => Box::new(BufWriter::new(io::stdout().lock())),
            };

            score_batch(&scorer, reader, writer, jobs).await?;
        }
    }

    Ok(())
}
