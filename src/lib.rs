use console::style;
use std::sync::Arc;

pub mod args;
pub mod config;
pub mod lkup;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod records;

use crate::args::RevlookArgs;
use crate::config::{Backend, Settings};
use crate::lkup::{DomainFilter, HickoryLookup, SystemLookup};
use crate::pipeline::{run_pipeline, PipelineOptions, Summary};

pub async fn run(args: &RevlookArgs) -> anyhow::Result<Summary> {
    /* Strategy: settings, then read every csv row up front,
    then open the output and fan the addresses out over the worker pool.
    Nothing is resolved unless all of the setup succeeded.
     */
    let settings = Settings::load(args)?;

    // * input stage
    let records = records::load_records(&settings.input)?;
    let ips: Vec<String> = records.into_iter().map(|record| record.ip).collect();

    let out = output::open_output(settings.output.as_deref()).await?;
    let opts = PipelineOptions {
        parallelism: settings.parallelism,
        filter: DomainFilter::new(settings.domain.as_str()),
        lookup_timeout: settings.lookup_timeout,
        ..Default::default()
    };

    let mut summary = match settings.backend {
        Backend::Hickory => {
            let lookup = Arc::new(HickoryLookup::from_system_conf()?);
            run_pipeline(ips, lookup, out, opts).await
        }
        Backend::System => run_pipeline(ips, Arc::new(SystemLookup), out, opts).await,
    };

    println!(
        "Total IP addresses processed: {}",
        style(summary.processed).bold()
    );
    match summary.write_error.take() {
        Some(e) => Err(e),
        None => Ok(summary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args(argv: &[&str]) -> RevlookArgs {
        RevlookArgs::parse_from(std::iter::once("revlook").chain(argv.iter().copied()))
    }

    #[tokio::test]
    async fn unresolvable_rows_are_all_counted() {
        let mut input = NamedTempFile::new().unwrap();
        write!(input, "not-an-ip\nalso bad\n").unwrap();
        let out = NamedTempFile::new().unwrap();
        let config = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let (input_path, out_path, config_path) = (
            input.path().to_str().unwrap(),
            out.path().to_str().unwrap(),
            config.path().to_str().unwrap(),
        );

        let summary = run(&args(&[
            "--in", input_path, "--out", out_path, "--config", config_path, "--resolver",
            "system", "--parall", "3",
        ]))
        .await
        .unwrap();
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.matched, 0);
        assert_eq!(std::fs::read_to_string(out.path()).unwrap(), "");
    }

    #[tokio::test]
    async fn setup_failure_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let err = run(&args(&[
            "--in",
            "/nonexistent/ips.csv",
            "--out",
            out.to_str().unwrap(),
        ]))
        .await
        .unwrap_err();
        assert!(format!("{err:#}").starts_with("Error opening file"));
        assert!(!out.exists());
    }
}
