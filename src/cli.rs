use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{
    self, AppendOptions, DumpFormat, DumpOptions, ImportOptions, MergeOptions,
};
use crate::error::Result;
use crate::history::{PruneConfig, Pruner};
use crate::interop::ListingOptions;

#[derive(Parser, Debug)]
#[command(
    name = "histrionic",
    version,
    about = "Record shell history per session and merge it into one file"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Append one command, read from stdin, to a session file
    Append {
        /// Session file
        #[arg(short = 'o')]
        output: PathBuf,
        /// Hostname to record
        #[arg(long, env = "HOSTNAME", default_value = "")]
        hostname: String,
        /// Shell session id
        #[arg(long, default_value = "")]
        session: String,
        /// Exit code of the command
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        exit_code: i64,
        /// Unix seconds to record instead of now
        #[arg(long)]
        timestamp: Option<i64>,
    },

    /// Print the merged view of one or more history files
    Dump {
        /// Terminate entries with NUL
        #[arg(long, default_value_t = false)]
        print0: bool,
        /// Restrict output to commands run on this host
        #[arg(long = "x-hostname")]
        x_hostname: Option<String>,
        /// Coalesce duplicates and failing commands
        #[arg(long, default_value_t = false)]
        coalesce: bool,
        /// Prune low-value commands
        #[arg(long, default_value_t = false)]
        prune: bool,
        /// Do not print line numbers
        #[arg(short = 'n', default_value_t = false)]
        no_line_numbers: bool,
        /// Write bash history format
        #[arg(long, default_value_t = false)]
        history_fmt: bool,
        #[arg(short = 'o', default_value = "/dev/stdout")]
        output: PathBuf,
        inputs: Vec<PathBuf>,
    },

    /// Convert a timestamped bash history file to records
    Import {
        #[arg(long = "bash-histfile")]
        bash_histfile: PathBuf,
        #[arg(short = 'o', default_value = "/dev/stdout")]
        output: PathBuf,
        /// Hostname attached to every entry
        #[arg(long, env = "HOSTNAME", default_value = "")]
        hostname: String,
    },

    /// Merge history files into one, under an exclusive lock
    Merge {
        #[arg(short = 'o', default_value = "/dev/stdout")]
        output: PathBuf,
        #[arg(long, default_value_t = false)]
        coalesce: bool,
        #[arg(long, default_value_t = false)]
        prune: bool,
        inputs: Vec<PathBuf>,
    },
}

fn pruner(enabled: bool) -> Result<Option<Pruner>> {
    if !enabled {
        return Ok(None);
    }
    Ok(Some(Pruner::new(PruneConfig::from_env()?)?))
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Append {
            output,
            hostname,
            session,
            exit_code,
            timestamp,
        } => {
            let options = AppendOptions {
                output,
                hostname,
                session_id: session,
                exit_code,
                timestamp,
            };
            commands::append(&options, std::io::stdin().lock())?;
        }
        Commands::Dump {
            print0,
            x_hostname,
            coalesce,
            prune,
            no_line_numbers,
            history_fmt,
            output,
            inputs,
        } => {
            let format = if history_fmt {
                DumpFormat::BashHistory
            } else {
                DumpFormat::Listing(ListingOptions {
                    line_numbers: !no_line_numbers,
                    print0,
                })
            };
            commands::dump(&DumpOptions {
                inputs,
                output,
                coalesce,
                prune: pruner(prune)?,
                hostname: x_hostname,
                format,
            })?;
        }
        Commands::Import {
            bash_histfile,
            output,
            hostname,
        } => {
            commands::import(&ImportOptions {
                history_file: bash_histfile,
                output,
                hostname,
            })?;
        }
        Commands::Merge {
            output,
            coalesce,
            prune,
            inputs,
        } => {
            commands::merge(&MergeOptions {
                output,
                inputs,
                coalesce,
                prune: pruner(prune)?,
            })?;
        }
    }
    Ok(())
}
