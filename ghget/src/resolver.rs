//! Release and tag resolution.
//!
//! Turns a caller's version intent into the single release or tag to use.
//! `Latest` and `ExactTag` resolve through the releases API; `Constraint`
//! resolves against the repository's tag list only. The only built-in retry
//! is the single inverted-tag lookup for `ExactTag`; no API request is ever
//! re-issued verbatim.

use octocrab::models::repos::Release;
use semver::{Version, VersionReq};

use crate::error::{GhGetError, Result};
use crate::github::GitHubClient;

/// What the caller asked for. `Constraint` skips the releases API entirely
/// and works from tags; an empty constraint string means "highest tag".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionIntent {
    Latest,
    ExactTag(String),
    Constraint(String),
}

impl VersionIntent {
    /// Interpret the `--tag` flag value: the literal `latest` requests the
    /// latest release, anything else is an exact tag.
    pub fn from_tag_flag(tag: &str) -> Self {
        if tag == "latest" {
            VersionIntent::Latest
        } else {
            VersionIntent::ExactTag(tag.to_string())
        }
    }
}

/// Outcome of resolution: a full release (with assets), or a bare version
/// when resolution went through the tag list.
#[derive(Debug)]
pub enum Resolved {
    Release(Box<Release>),
    Tag(Version),
}

impl Resolved {
    /// The tag in display form, with any leading `v` stripped.
    pub fn version(&self) -> String {
        match self {
            Resolved::Release(release) => strip_v(&release.tag_name).to_string(),
            Resolved::Tag(version) => version.to_string(),
        }
    }

    pub fn into_release(self) -> Option<Release> {
        match self {
            Resolved::Release(release) => Some(*release),
            Resolved::Tag(_) => None,
        }
    }
}

/// Resolve `intent` for `owner/repo` into a single release or tag.
pub async fn resolve(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    intent: &VersionIntent,
) -> Result<Resolved> {
    match intent {
        VersionIntent::Latest => {
            let release = client.get_latest_release(owner, repo).await.map_err(|e| {
                tracing::debug!("latest-release lookup failed: {}", e);
                GhGetError::NoReleaseFound {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                    tried: "latest".to_string(),
                }
            })?;
            tracing::info!("latest release: {}", release.tag_name);
            Ok(Resolved::Release(Box::new(release)))
        }
        VersionIntent::ExactTag(tag) => {
            // Repositories tag inconsistently (`v1.2.3` vs `1.2.3`), so a
            // miss on the literal tag retries once with the inverted form.
            let inverted = invert_tag(tag);
            match client.get_release_by_tag(owner, repo, tag).await {
                Ok(release) => {
                    tracing::info!("selected release: {}", release.tag_name);
                    Ok(Resolved::Release(Box::new(release)))
                }
                Err(first_err) => {
                    tracing::debug!(
                        "tag '{}' not found ({}); retrying as '{}'",
                        tag,
                        first_err,
                        inverted
                    );
                    match client.get_release_by_tag(owner, repo, &inverted).await {
                        Ok(release) => {
                            tracing::info!("selected release: {}", release.tag_name);
                            Ok(Resolved::Release(Box::new(release)))
                        }
                        Err(_) => Err(GhGetError::NoReleaseFound {
                            owner: owner.to_string(),
                            repo: repo.to_string(),
                            tried: format!("{tag}, {inverted}"),
                        }),
                    }
                }
            }
        }
        VersionIntent::Constraint(constraint) => {
            let req = parse_constraint(constraint)?;
            let refs = client.list_tag_refs(owner, repo).await?;
            let versions = collect_versions(refs.iter().map(String::as_str), is_go_repo(owner, repo));
            select_version(&versions, req.as_ref())
                .cloned()
                .map(Resolved::Tag)
                .ok_or_else(|| GhGetError::NoMatchingVersion {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                    constraint: constraint.clone(),
                })
        }
    }
}

/// Strip a leading `v` when it prefixes a version number.
/// `stripV(stripV(t)) == stripV(t)`.
pub fn strip_v(tag: &str) -> &str {
    match tag.strip_prefix('v') {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => tag,
    }
}

/// Flip a tag between its `v`-prefixed and bare form: `v1.2.3` becomes
/// `1.2.3` and vice versa.
pub fn invert_tag(tag: &str) -> String {
    match tag.strip_prefix('v') {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest.to_string(),
        _ => format!("v{tag}"),
    }
}

/// The `golang/go` repository tags with a `go` prefix instead of `v`.
fn is_go_repo(owner: &str, repo: &str) -> bool {
    owner == "golang" && repo == "go"
}

/// Parse a comma-separated range constraint. `~>` (pessimistic) comparators
/// are accepted and normalized to `~`. An empty constraint matches
/// everything.
pub fn parse_constraint(constraint: &str) -> Result<Option<VersionReq>> {
    if constraint.trim().is_empty() {
        return Ok(None);
    }

    let normalized = constraint
        .split(',')
        .map(|part| {
            let part = part.trim();
            match part.strip_prefix("~>") {
                Some(rest) => format!("~{}", rest.trim_start()),
                None => part.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    VersionReq::parse(&normalized)
        .map(Some)
        .map_err(|e| GhGetError::InvalidConstraint {
            constraint: constraint.to_string(),
            source: e,
        })
}

/// Parse tag refs into versions, sorted descending. Refs that do not parse
/// as a version are skipped. When `strip_go_prefix` is set, only `go`-prefixed
/// tags are considered and the prefix is removed before parsing.
pub fn collect_versions<'a, I>(refs: I, strip_go_prefix: bool) -> Vec<Version>
where
    I: Iterator<Item = &'a str>,
{
    let mut versions: Vec<Version> = refs
        .filter_map(|r| {
            let tag = r.strip_prefix("refs/tags/").unwrap_or(r);
            let tag = if strip_go_prefix {
                tag.strip_prefix("go")?
            } else {
                tag
            };
            parse_version_lenient(tag)
        })
        .collect();

    versions.sort();
    versions.reverse();
    versions
}

/// Walk versions (already sorted descending) and return the first one
/// satisfying `req`, i.e. the highest satisfying version.
pub fn select_version<'a>(versions: &'a [Version], req: Option<&VersionReq>) -> Option<&'a Version> {
    versions.iter().find(|v| match req {
        Some(req) => req.matches(v),
        None => true,
    })
}

/// Parse a version, tolerating a leading `v` and missing minor/patch
/// components (`1.2` parses as `1.2.0`).
pub fn parse_version_lenient(tag: &str) -> Option<Version> {
    let tag = strip_v(tag);
    if let Ok(version) = Version::parse(tag) {
        return Some(version);
    }

    let split = tag.find(['-', '+']).unwrap_or(tag.len());
    let (core, rest) = tag.split_at(split);
    let dots = core.matches('.').count();
    if dots >= 2 {
        return None;
    }

    let padded = format!("{core}{}{rest}", ".0".repeat(2 - dots));
    Version::parse(&padded).ok()
}
