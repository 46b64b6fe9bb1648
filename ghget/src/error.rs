use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GhGetError {
    #[error("GitHub API error: {0}")]
    GitHubApi(#[from] octocrab::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template error in '{template}': {message}")]
    Template { template: String, message: String },

    #[error("Unsupported platform: unknown {kind} identifier '{value}'")]
    UnsupportedPlatform { kind: &'static str, value: String },

    #[error("No release found for {owner}/{repo} (tried: {tried})")]
    NoReleaseFound {
        owner: String,
        repo: String,
        tried: String,
    },

    #[error("Invalid version constraint '{constraint}': {source}")]
    InvalidConstraint {
        constraint: String,
        #[source]
        source: semver::Error,
    },

    #[error("No tag of {owner}/{repo} satisfies constraint '{constraint}'")]
    NoMatchingVersion {
        owner: String,
        repo: String,
        constraint: String,
    },

    #[error("Invalid asset pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("No asset matching '{pattern}' in release {release_tag}. Available assets: {available}")]
    NoAssetMatch {
        pattern: String,
        release_tag: String,
        available: String,
    },

    #[error("No file matching '{member}' found inside {archive}")]
    NoMemberMatch { member: String, archive: String },

    #[error("Failed to read archive stream: {0}")]
    StreamRead(#[source] std::io::Error),

    #[error("Failed to write extracted binary: {0}")]
    StreamWrite(#[source] std::io::Error),

    #[error("Could not create '{name}' in {primary:?} or {fallback:?}: {source}")]
    InstallPath {
        name: String,
        primary: PathBuf,
        fallback: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid repository '{input}'. Expected format: owner/repo (e.g., BurntSushi/ripgrep)")]
    InvalidRepo { input: String },

    #[error("Invalid API endpoint '{input}': {message}")]
    InvalidEndpoint { input: String, message: String },

    #[error("Configuration error at {path}: {message}")]
    Config { path: String, message: String },

    #[error("Failed to download {asset} from {url}: {message}")]
    DownloadFailed {
        asset: String,
        url: String,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, GhGetError>;
