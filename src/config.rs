// * settings come from three layers: cli flags, then ~/.revlook/config.toml, then defaults
use anyhow::{bail, Context};
use clap::ValueEnum;
use config_file::FromConfigFile;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::args::RevlookArgs;
use crate::pipeline::MAX_PARALLELISM;

pub const DEFAULT_CONFIG_PATH: &str = "~/.revlook/config.toml";
pub const DEFAULT_PARALLELISM: usize = 1;

/// Which resolver performs the PTR lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// hickory-resolver, configured from the system resolv.conf
    #[default]
    Hickory,
    /// the platform's getnameinfo
    System,
}

/// Contents of the optional config file. Every key may be left out.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub parall: Option<usize>,
    pub domain: Option<String>,
    pub timeout_ms: Option<u64>,
    pub resolver: Option<Backend>,
}

/// Fully resolved run settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub domain: String,
    pub parallelism: usize,
    pub lookup_timeout: Option<Duration>,
    pub backend: Backend,
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

fn read_config(path: &Path, explicit: bool) -> anyhow::Result<FileConfig> {
    if !explicit && !path.exists() {
        return Ok(FileConfig::default());
    }
    FileConfig::from_config_file(path).context("Error reading config file")
}

impl Settings {
    pub fn load(args: &RevlookArgs) -> anyhow::Result<Settings> {
        let input = match &args.input {
            Some(path) => path.clone(),
            None => bail!("Input filename is required"),
        };

        let (path, explicit) = match &args.config {
            Some(path) => (expand(&path.to_string_lossy()), true),
            None => (expand(DEFAULT_CONFIG_PATH), false),
        };
        let file = read_config(&path, explicit)?;
        Settings::merge(input, args, file)
    }

    fn merge(input: PathBuf, args: &RevlookArgs, file: FileConfig) -> anyhow::Result<Settings> {
        let parallelism = args
            .parall
            .or(file.parall)
            .unwrap_or(DEFAULT_PARALLELISM);
        if parallelism == 0 {
            bail!("Maximum parallelism must be at least 1");
        }
        if parallelism > MAX_PARALLELISM {
            bail!("Maximum parallelism must be at most {MAX_PARALLELISM}");
        }
        let lookup_timeout = args
            .timeout_ms
            .or(file.timeout_ms)
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);

        Ok(Settings {
            input,
            output: args.out.clone(),
            domain: args.domain.clone().or(file.domain).unwrap_or_default(),
            parallelism,
            lookup_timeout,
            backend: args.resolver.or(file.resolver).unwrap_or_default(),
        })
    }
}
