use std::fs;
use std::io::Write;

use anyhow::{bail, Context, Result};

use crate::cli::{self, GetArgs, LatestTagArgs, OsArchArgs};
use crate::config::Config;
use crate::endpoint;
use crate::extract::{self, InstallDirs};
use crate::github::{self, GitHubClient};
use crate::pattern::{self, PatternContext};
use crate::platform;
use crate::resolver::{self, VersionIntent};
use crate::retry::RetryConfig;

/// Drives the `get` subcommand: resolve a release, select and download one
/// asset, extract one binary, install it.
pub struct Fetcher {
    args: GetArgs,
    config: Config,
    client: GitHubClient,
    owner: String,
    repo: String,
}

impl Fetcher {
    pub fn new(mut args: GetArgs) -> Result<Self> {
        let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;

        let (owner, repo) = cli::parse_owner_repo(&args.owner_repo)?;

        // Config-file values win over flags for the selected repository.
        config.apply_to(&mut args, &owner, &repo);

        let endpoints = endpoint::parse_domain(&args.endpoint)?;
        tracing::info!("GitHub endpoint: {}", endpoints.api);

        let retry_config = if args.no_retry {
            RetryConfig::none()
        } else {
            RetryConfig {
                max_retries: args.max_retries,
                ..Default::default()
            }
        };

        let client = GitHubClient::with_retry_config(Some(&endpoints.api), retry_config)?;

        Ok(Self {
            args,
            config,
            client,
            owner,
            repo,
        })
    }

    pub async fn run(&self) -> Result<()> {
        let Some(asset_pattern) = self.args.pattern.as_deref() else {
            bail!("missing --pattern (set it on the command line or in the config file)");
        };
        let Some(write_to_bin) = self.args.write_to_bin.as_deref() else {
            bail!("missing --write-to-bin (set it on the command line or in the config file)");
        };
        let member_pattern = self.args.archive_path.as_deref().unwrap_or_default();

        tracing::info!(
            "fetching from {}/{} (tag: {})",
            self.owner,
            self.repo,
            self.args.tag
        );

        let intent = VersionIntent::from_tag_flag(&self.args.tag);
        let resolved = resolver::resolve(&self.client, &self.owner, &self.repo, &intent).await?;
        let version = resolved.version();
        let release = resolved
            .into_release()
            .context("tag resolution did not produce a release")?;

        let mut aliases = self.args.aliases.to_table();
        if let Some(repo_config) = self.config.repo_config(&self.owner, &self.repo) {
            aliases.extend(&repo_config.os, &repo_config.arch);
        }
        let platform = platform::current(&aliases)?;
        tracing::info!("current platform: {}/{}", platform.os, platform.arch);

        let vars = PatternContext {
            ver: version,
            os: platform.os,
            arch: platform.arch,
            ext: pattern::ext_alternation(),
        };

        let resolved_pattern = pattern::render(asset_pattern, &vars)?;
        let resolved_member = pattern::render(member_pattern, &vars)?;
        tracing::info!("resolved asset pattern: {}", resolved_pattern);
        tracing::info!("file inside archive: {}", resolved_member);

        let assets = github::release_assets(&release);
        let asset = github::select_asset(&assets, &resolved_pattern, &release.tag_name)?;

        let temp_file = self.client.download_asset(asset).await?;

        let archive = fs::File::open(temp_file.path())
            .context("Failed to reopen the downloaded asset")?;
        let install_path = extract::extract(
            archive,
            &asset.name,
            &resolved_member,
            write_to_bin,
            &InstallDirs::default(),
        )?;

        println!(
            "Downloaded {}; copied {} → {}",
            asset.name,
            if resolved_member.is_empty() {
                &asset.name
            } else {
                &resolved_member
            },
            install_path.display()
        );

        Ok(())
    }
}

/// The `latest-tag` subcommand: print the latest release tag, falling back
/// to the highest tag when the repository publishes no releases. A
/// constraint forces tag-only resolution.
pub async fn latest_tag(args: LatestTagArgs) -> Result<()> {
    let (owner, repo) = cli::parse_owner_repo(&args.owner_repo)?;
    let endpoints = endpoint::parse_domain(&args.endpoint)?;
    tracing::info!("GitHub endpoint: {}", endpoints.api);

    let client = GitHubClient::new(Some(&endpoints.api))?;

    let resolved = if args.skip_to_tags || args.constraint.is_some() {
        let intent = VersionIntent::Constraint(args.constraint.clone().unwrap_or_default());
        resolver::resolve(&client, &owner, &repo, &intent).await?
    } else {
        match resolver::resolve(&client, &owner, &repo, &VersionIntent::Latest).await {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::debug!("no releases ({}); falling back to tags", e);
                let intent = VersionIntent::Constraint(String::new());
                resolver::resolve(&client, &owner, &repo, &intent).await?
            }
        }
    };

    let tag = resolved.version();
    if args.strip {
        print!("{tag}");
        std::io::stdout().flush()?;
    } else {
        println!("{tag}");
    }

    Ok(())
}

/// The `os-arch` subcommand: resolve and print the normalized platform
/// identifiers through a pattern.
pub fn os_arch(args: OsArchArgs) -> Result<()> {
    let aliases = args.aliases.to_table();
    let platform = platform::current(&aliases)?;
    tracing::info!("current platform: {}/{}", platform.os, platform.arch);

    let vars = PatternContext {
        ver: String::new(),
        os: platform.os,
        arch: platform.arch,
        ext: pattern::ext_alternation(),
    };

    let resolved = pattern::render(&args.pattern, &vars)?;
    println!("{resolved}");

    Ok(())
}
