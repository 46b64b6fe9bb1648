//! # ghget
//!
//! Download a single platform-appropriate binary asset from a GitHub
//! release and install it as an executable.
//!
//! ## Overview
//!
//! `ghget` resolves which release or tag satisfies a version intent
//! (latest, an exact tag, or a range constraint over tags), picks the first
//! asset whose name matches a pattern, and unpacks exactly one file from
//! whatever container the asset ships in (tar.gz, tar.xz, tar.bz2, zip, or
//! no container at all) to `/usr/local/bin`, or `$HOME/bin` when the
//! system path is not writable.
//!
//! ## Features
//!
//! - Latest-release, exact-tag (with `v1.2.3`/`1.2.3` inversion retry) and
//!   range-constraint resolution
//! - Asset patterns with `{{.Ver}}`, `{{.OS}}`, `{{.Arch}}` and `{{.Ext}}`
//!   variables, matched as regular expressions
//! - OS/CPU identifier normalization with per-repository aliases
//! - GitHub Enterprise endpoints (subdomain isolation and `/api/v3` style)
//!
//! ## Usage
//!
//! ```bash
//! # Install the latest terraform binary
//! ghget get -r hashicorp/terraform \
//!     -p 'terraform_{{.Ver}}_{{.OS}}_{{.Arch}}.zip' \
//!     -a terraform -w terraform
//!
//! # Print the latest tag satisfying a constraint
//! ghget latest-tag -r golang/go --constraint '>=1.21, <1.23'
//! ```
//!
//! ## Configuration
//!
//! Per-repository settings live in `ghget.toml`, searched in the current
//! directory, the user config directory, and `/etc/ghget/`.

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Configuration file handling and repository-specific settings
pub mod config;

/// GitHub / GitHub Enterprise endpoint parsing
pub mod endpoint;

/// Error types and error handling utilities
pub mod error;

/// Archive-format dispatch, single-member extraction and install paths
pub mod extract;

/// Orchestration of the get / latest-tag / os-arch subcommands
pub mod fetcher;

/// GitHub API client for releases, tags and asset downloads
pub mod github;

/// Pattern templates for asset names and in-archive paths
pub mod pattern;

/// OS and CPU architecture normalization with alias tables
pub mod platform;

/// Release and tag resolution
pub mod resolver;

/// Network retry logic with exponential backoff
pub mod retry;
