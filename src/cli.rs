use anyhow::{bail, Context, Result};
use chrono::{FixedOffset, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, OutputFormat};
use crate::output::{bright_yellow, export_report, print_summary, BuildProgress};
use crate::providers::gitlab::{build_with_deadline, GitLabClient, ReportBuilder, ReportWindow};
use crate::report::Report;

const NO_ACTIVITY_MESSAGE: &str =
    "No pushes or merge requests found for this day, there is nothing to report.";

#[derive(Parser)]
#[command(name = "timesheet")]
#[command(author, version, about = "Daily timesheets from GitLab activity", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./timesheet.{toml,json,yaml,yml})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,

    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the timesheet of one day
    Day {
        #[arg(short, long, env = "GITLAB_TOKEN")]
        token: Option<String>,

        #[arg(short, long)]
        url: Option<String>,

        /// GitLab user id whose activity is reported
        #[arg(short, long)]
        gitlab_id: Option<u64>,

        /// Minutes east of UTC
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<i32>,

        /// Day to report (YYYY-MM-DD), today in the user's offset by default
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Seconds before the build is abandoned
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Write a default configuration file
    Init {
        /// Target file (defaults to the user config directory)
        path: Option<PathBuf>,
    },
}

impl Cli {
    #[allow(clippy::too_many_arguments)]
    async fn execute_day(
        &self,
        token: Option<&str>,
        url: Option<&str>,
        gitlab_id: Option<u64>,
        offset: Option<i32>,
        date: Option<NaiveDate>,
        timeout: Option<u64>,
    ) -> Result<()> {
        let mut config = Config::load(self.config.as_deref())?;

        if let Some(token) = token {
            config.gitlab.token = Some(token.to_owned());
        }
        if let Some(url) = url {
            config.gitlab.base_url = url.to_owned();
        }
        if gitlab_id.is_some() {
            config.user.gitlab_id = gitlab_id;
        }
        if let Some(offset) = offset {
            config.user.timezone_offset = offset;
        }
        if let Some(timeout) = timeout {
            config.report.timeout_secs = timeout;
        }

        let user = config.to_user()?;
        let user_offset = user.offset()?;
        let window = match date {
            Some(date) => ReportWindow::for_day(date, user_offset),
            None => ReportWindow::today(Utc::now(), user_offset),
        };

        info!(
            "Building timesheet for GitLab user {} on {}",
            user.gitlab_id, window.date
        );

        let client = GitLabClient::new(
            &config.gitlab.base_url,
            &config.gitlab.api_path,
            config.gitlab.client_options(),
        )?;
        debug!("Using GitLab API at {}", client.api_url());

        let builder = Arc::new(ReportBuilder::new(
            Arc::new(client),
            config.report.build_options(),
        ));

        let cancel = CancellationToken::new();
        let interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling report build");
                interrupt.cancel();
            }
        });

        let progress = BuildProgress::start(window.date);
        let result =
            build_with_deadline(&builder, user, window, config.report.timeout(), &cancel).await;

        match result {
            Ok(report) => {
                progress.finish(report.rows.len());
                self.write_report(&report, &config, user_offset)
            }
            Err(e) if e.is_no_activity() => {
                progress.finish_empty();
                println!("{}", bright_yellow(NO_ACTIVITY_MESSAGE));
                Ok(())
            }
            Err(e) => {
                progress.fail();
                Err(e).context("Failed to build timesheet")
            }
        }
    }

    fn write_report(&self, report: &Report, config: &Config, offset: FixedOffset) -> Result<()> {
        let pretty = self.pretty || config.output.pretty;
        let format = self.format.unwrap_or(config.output.format);

        if let Some(output_path) = &self.output {
            // Files get structured data; the summary is terminal only
            let format = match format {
                OutputFormat::Summary => OutputFormat::Json,
                other => other,
            };
            let mut file = std::fs::File::create(output_path)
                .with_context(|| format!("Failed to create {}", output_path.display()))?;
            export_report(report, format, pretty, &mut file)?;
            info!("Timesheet written to: {}", output_path.display());
            return Ok(());
        }

        match format {
            OutputFormat::Summary => {
                print_summary(report, offset, config.report.workday_hours);
                Ok(())
            }
            other => export_report(report, other, pretty, &mut std::io::stdout().lock()),
        }
    }

    fn execute_init(path: Option<&Path>) -> Result<()> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Config::user_config_path().unwrap_or_else(|| PathBuf::from("timesheet.toml")),
        };

        if path.exists() {
            bail!("Config file already exists: {}", path.display());
        }

        Config::default().save(&path)?;
        info!("Default configuration written to: {}", path.display());
        eprintln!("Wrote {}", path.display());

        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Day {
                token,
                url,
                gitlab_id,
                offset,
                date,
                timeout,
            } => {
                self.execute_day(
                    token.as_deref(),
                    url.as_deref(),
                    *gitlab_id,
                    *offset,
                    *date,
                    *timeout,
                )
                .await
            }
            Commands::Init { path } => Self::execute_init(path.as_deref()),
        }
    }
}
