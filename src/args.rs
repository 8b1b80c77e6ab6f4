use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::config::Backend;

#[derive(Debug, Parser)]
#[clap(
    version,
    about = "Reverse DNS lookups for the IP addresses in a CSV file"
)]
pub struct RevlookArgs {
    /// input file name (csv, ip address in the first column)
    #[clap(long = "in", short = 'i', value_name = "PATH")]
    pub input: Option<PathBuf>,
    /// output file name [default: stdout]
    #[clap(long, short, value_name = "PATH")]
    pub out: Option<PathBuf>,
    /// only report hostnames containing this substring
    #[clap(long, short, value_name = "SUBSTRING")]
    pub domain: Option<String>,
    /// maximum parallelism (number of lookup workers) [default: 1]
    #[clap(long, short, value_name = "N")]
    pub parall: Option<usize>,
    /// per-lookup timeout in milliseconds, 0 for none
    #[clap(long = "timeout-ms", short, value_name = "MS")]
    pub timeout_ms: Option<u64>,
    /// lookup backend [default: hickory]
    #[clap(long, short, value_enum)]
    pub resolver: Option<Backend>,
    /// config file [default: ~/.revlook/config.toml]
    #[clap(long, short, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// log verbosity, repeat for more
    #[clap(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
