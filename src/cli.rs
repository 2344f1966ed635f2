use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use crate::auth::Credentials;
use crate::bitbucket::{aggregate, BitbucketClient};
use crate::config::Config;
use crate::output;
use crate::report;

#[derive(Parser)]
#[command(name = "pipescope")]
#[command(author, version, about = "Bitbucket Pipelines health reporter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (defaults to ./pipescope.{toml,json,yaml})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct ApiArgs {
    /// Bitbucket workspace to report on
    #[arg(short, long, env = "BITBUCKET_WORKSPACE")]
    workspace: Option<String>,

    /// Bitbucket username
    #[arg(short, long, env = "BITBUCKET_USERNAME")]
    username: Option<String>,

    /// Bitbucket app password
    #[arg(short = 'p', long, env = "BITBUCKET_APP_PASSWORD", hide_env_values = true)]
    app_password: Option<String>,

    /// Bitbucket API base URL
    #[arg(short, long)]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List workspace repositories with recent activity
    Repos {
        #[command(flatten)]
        api: ApiArgs,
    },
    /// Report pipeline health per repository, grouped by trigger target
    Pipes {
        #[command(flatten)]
        api: ApiArgs,
    },
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match &self.command {
            Commands::Repos { api } => self.execute_repos(api, &config).await,
            Commands::Pipes { api } => self.execute_pipes(api, &config).await,
        }
    }

    async fn execute_repos(&self, api: &ApiArgs, config: &Config) -> Result<()> {
        let (client, workspace) = build_client(api, config)?;

        info!("Listing repositories for workspace: {workspace}");

        let spinner = output::spinner(format!("Fetching repositories for {workspace}"));
        let repos = client
            .list_repositories(&workspace, config.bitbucket.updated_within_days)
            .await;
        spinner.finish_and_clear();

        output::print_repositories(&workspace, &repos?);

        Ok(())
    }

    async fn execute_pipes(&self, api: &ApiArgs, config: &Config) -> Result<()> {
        let (client, workspace) = build_client(api, config)?;

        info!("Reporting pipelines for workspace: {workspace}");

        let spinner = output::spinner(format!("Fetching repositories for {workspace}"));
        let repos = client
            .list_repositories(&workspace, config.bitbucket.updated_within_days)
            .await;
        spinner.finish_and_clear();
        let repos = repos?;

        info!("Found {} repositories", repos.len());

        for repo in &repos {
            let spinner = output::spinner(format!("Fetching pipelines for {}", repo.slug));
            let pipelines = client.list_pipelines(&workspace, &repo.slug).await;
            spinner.finish_and_clear();
            let pipelines = pipelines?;

            if pipelines.is_empty() {
                info!("No pipelines for {}, skipping", repo.slug);
                continue;
            }

            let stats = aggregate(&pipelines);
            let rows = report::build_rows(&stats);
            output::print_pipeline_report(&repo.name, &rows);
        }

        Ok(())
    }
}

fn build_client(api: &ApiArgs, config: &Config) -> Result<(BitbucketClient, String)> {
    let workspace = api
        .workspace
        .clone()
        .or_else(|| config.bitbucket.workspace.clone())
        .context("no workspace given; pass --workspace or set bitbucket.workspace in the config file")?;

    let username = api
        .username
        .clone()
        .or_else(|| config.bitbucket.username.clone())
        .context("no username given; pass --username or set BITBUCKET_USERNAME")?;

    let app_password = api
        .app_password
        .clone()
        .or_else(|| config.bitbucket.app_password.clone())
        .context("no app password given; pass --app-password or set BITBUCKET_APP_PASSWORD")?;

    let base_url = api
        .base_url
        .clone()
        .unwrap_or_else(|| config.bitbucket.base_url.clone());

    let client = BitbucketClient::new(&base_url, Credentials::new(username, app_password))?;

    Ok((client, workspace))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BitbucketConfig;

    fn args(workspace: Option<&str>, username: Option<&str>, app_password: Option<&str>) -> ApiArgs {
        ApiArgs {
            workspace: workspace.map(String::from),
            username: username.map(String::from),
            app_password: app_password.map(String::from),
            base_url: None,
        }
    }

    fn config_with(workspace: Option<&str>, username: Option<&str>) -> Config {
        Config {
            bitbucket: BitbucketConfig {
                workspace: workspace.map(String::from),
                username: username.map(String::from),
                app_password: Some("from-config".to_string()),
                ..BitbucketConfig::default()
            },
        }
    }

    #[test]
    fn flags_take_precedence_over_config_file() {
        let api = args(Some("from-flags"), Some("alice"), Some("pw"));
        let config = config_with(Some("from-config"), Some("bob"));

        let (_, workspace) = build_client(&api, &config).unwrap();
        assert_eq!(workspace, "from-flags");
    }

    #[test]
    fn config_file_fills_in_missing_flags() {
        let api = args(None, None, None);
        let config = config_with(Some("acme"), Some("alice"));

        let (_, workspace) = build_client(&api, &config).unwrap();
        assert_eq!(workspace, "acme");
    }

    #[test]
    fn missing_workspace_is_an_error() {
        let api = args(None, Some("alice"), Some("pw"));
        let config = config_with(None, None);

        let error = build_client(&api, &config).unwrap_err();
        assert!(error.to_string().contains("workspace"));
    }

    #[test]
    fn missing_credentials_are_an_error() {
        let api = args(Some("acme"), None, None);
        let config = Config::default();

        let error = build_client(&api, &config).unwrap_err();
        assert!(error.to_string().contains("username"));
    }
}
