//! CLI entrypoint: one refresh cycle, bucketed and summarised.

use std::io::{self, Write};
use std::process::ExitCode;

use chrono::Utc;
use ortho_config::OrthoConfig;
use pr_radar::{
    Buckets, OctocrabGateway, PersonalAccessToken, RadarConfig, RefreshEngine, RefreshError,
    StatusFilter, ThrottledGateway, apply_status_filter, bucket,
};
use url::Url;

const DEFAULT_API_URL: &str = "https://api.github.com";

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), RefreshError> {
    let config = load_config()?;

    let login = config.require_user()?;
    let token = PersonalAccessToken::new(config.resolve_token()?)?;
    let api_url = resolve_api_url(config.api_url.as_deref())?;

    let gateway = OctocrabGateway::for_token(&token, &api_url)?;
    let engine = RefreshEngine::new(ThrottledGateway::with_default_policy(gateway));

    let pull_requests = engine.refresh(&login).await?;
    let mute_configuration = config.load_mute_configuration()?;
    let buckets = bucket(pull_requests, &mute_configuration, &login, Utc::now());
    let buckets = apply_status_filter(buckets, &StatusFilter::default());

    write_summary(&buckets)?;
    Ok(())
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`RefreshError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<RadarConfig, RefreshError> {
    RadarConfig::load().map_err(|error| RefreshError::Configuration {
        message: error.to_string(),
    })
}

fn resolve_api_url(configured: Option<&str>) -> Result<Url, RefreshError> {
    let raw = configured.unwrap_or(DEFAULT_API_URL);
    Url::parse(raw).map_err(|error| RefreshError::InvalidUrl(error.to_string()))
}

fn write_summary(buckets: &Buckets) -> Result<(), RefreshError> {
    let mut stdout = io::stdout().lock();
    let mut write_bucket = |label: &str, entries: &[pr_radar::PullRequest]| {
        writeln!(stdout, "{label} ({}):", entries.len()).and_then(|()| {
            entries.iter().try_for_each(|pull_request| {
                writeln!(
                    stdout,
                    "  #{} {} ({})",
                    pull_request.number, pull_request.title, pull_request.html_url
                )
            })
        })
    };

    write_bucket("Incoming", &buckets.incoming)
        .and_then(|()| write_bucket("Reviewed", &buckets.reviewed))
        .and_then(|()| write_bucket("Mine", &buckets.mine))
        .and_then(|()| write_bucket("Muted", &buckets.muted))
        .and_then(|()| write_bucket("Ignored", &buckets.ignored))
        .map_err(|error| RefreshError::Io {
            message: error.to_string(),
        })
}
