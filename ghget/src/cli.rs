use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::error::GhGetError;
use crate::platform::AliasTable;

#[derive(Parser, Debug)]
#[clap(
    name = "ghget",
    version,
    about = "Download a platform-appropriate binary from a GitHub release",
    long_about = None
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download an asset from a GitHub release and install a single binary
    Get(GetArgs),
    /// Print the latest release (or tag) of a repository
    LatestTag(LatestTagArgs),
    /// Print the normalized OS and CPU architecture identifiers
    OsArch(OsArchArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GetArgs {
    /// The owner and repository name in the format 'owner/repo'
    #[clap(short = 'r', long, value_name = "OWNER/REPO")]
    pub owner_repo: String,

    /// The GitHub API domain to use (supports GitHub Enterprise domains)
    #[clap(short, long, default_value = "https://api.github.com")]
    pub endpoint: String,

    /// The Git tag for which to check releases
    #[clap(short, long, default_value = "latest")]
    pub tag: String,

    /// The naming pattern of the asset to match. Treated as a regular
    /// expression; supports the {{.Ver}}, {{.OS}}, {{.Arch}} and {{.Ext}}
    /// variables
    #[clap(short, long)]
    pub pattern: Option<String>,

    /// The path of the file inside the archive. Supports the same variables
    /// as --pattern
    #[clap(short = 'a', long)]
    pub archive_path: Option<String>,

    /// The final name of the binary. Saved to /usr/local/bin/NAME, falling
    /// back to $HOME/bin/NAME if /usr/local/bin is not writable
    #[clap(short = 'w', long)]
    pub write_to_bin: Option<String>,

    /// Configuration file path
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Maximum download retry attempts
    #[clap(long, default_value_t = 3)]
    pub max_retries: u32,

    /// Disable download retries
    #[clap(long)]
    pub no_retry: bool,

    /// Display verbose output
    #[clap(short, long)]
    pub verbose: bool,

    #[clap(flatten)]
    pub aliases: AliasArgs,
}

#[derive(Args, Debug, Clone)]
pub struct LatestTagArgs {
    /// The owner and repository name in the format 'owner/repo'
    #[clap(short = 'r', long, value_name = "OWNER/REPO")]
    pub owner_repo: String,

    /// The GitHub API domain to use (supports GitHub Enterprise domains)
    #[clap(short, long, default_value = "https://api.github.com")]
    pub endpoint: String,

    /// A version range constraint over tags (e.g. '>=1.2, <2.0'). Implies
    /// tag-only resolution
    #[clap(short, long)]
    pub constraint: Option<String>,

    /// Skip looking up releases and just look at tags
    #[clap(short = 't', long)]
    pub skip_to_tags: bool,

    /// Strip the trailing line ending
    #[clap(short, long)]
    pub strip: bool,

    /// Display verbose output
    #[clap(short, long)]
    pub verbose: bool,
}

#[derive(Args, Debug, Clone)]
pub struct OsArchArgs {
    /// The pattern to resolve. Supports the {{.OS}} and {{.Arch}} variables
    #[clap(short, long, default_value = "{{.OS}}/{{.Arch}}")]
    pub pattern: String,

    /// Display verbose output
    #[clap(short, long)]
    pub verbose: bool,

    #[clap(flatten)]
    pub aliases: AliasArgs,
}

/// Per-platform alias flags. Each sets the value substituted for `{{.OS}}`
/// or `{{.Arch}}` when the current platform matches, e.g.
/// `--intel64 x86_64` for repositories that do not use Go naming.
#[derive(Args, Debug, Clone, Default)]
pub struct AliasArgs {
    /// When the current OS is Darwin, use this value when looking up the correct asset
    #[clap(long, value_name = "ALIAS")]
    pub darwin: Option<String>,

    /// When the current OS is Dragonfly, use this value when looking up the correct asset
    #[clap(long, value_name = "ALIAS")]
    pub dragonfly: Option<String>,

    /// When the current OS is FreeBSD, use this value when looking up the correct asset
    #[clap(long, value_name = "ALIAS")]
    pub freebsd: Option<String>,

    /// When the current OS is Illumos, use this value when looking up the correct asset
    #[clap(long, value_name = "ALIAS")]
    pub illumos: Option<String>,

    /// When the current OS is Linux, use this value when looking up the correct asset
    #[clap(long, value_name = "ALIAS")]
    pub linux: Option<String>,

    /// When the current OS is NetBSD, use this value when looking up the correct asset
    #[clap(long, value_name = "ALIAS")]
    pub netbsd: Option<String>,

    /// When the current OS is OpenBSD, use this value when looking up the correct asset
    #[clap(long, value_name = "ALIAS")]
    pub openbsd: Option<String>,

    /// When the current OS is Plan9, use this value when looking up the correct asset
    #[clap(long, value_name = "ALIAS")]
    pub plan9: Option<String>,

    /// When the current OS is Solaris, use this value when looking up the correct asset
    #[clap(long, value_name = "ALIAS")]
    pub solaris: Option<String>,

    /// When the current OS is Windows, use this value when looking up the correct asset
    #[clap(long, value_name = "ALIAS")]
    pub windows: Option<String>,

    /// When the current CPU architecture is 32-bit ARM, use this value when looking up the correct asset
    #[clap(long, value_name = "ALIAS")]
    pub arm32: Option<String>,

    /// When the current CPU architecture is 64-bit ARM, use this value when looking up the correct asset
    #[clap(long, value_name = "ALIAS")]
    pub arm64: Option<String>,

    /// When the current CPU architecture is 32-bit Intel-compatible, use this value when looking up the correct asset
    #[clap(long, value_name = "ALIAS")]
    pub intel32: Option<String>,

    /// When the current CPU architecture is 64-bit Intel-compatible, use this value when looking up the correct asset
    #[clap(long, value_name = "ALIAS")]
    pub intel64: Option<String>,

    /// When the current CPU architecture is 64-bit Loongson, use this value when looking up the correct asset
    #[clap(long, value_name = "ALIAS")]
    pub loong64: Option<String>,

    /// When the current CPU architecture is 32-bit MIPS, use this value when looking up the correct asset
    #[clap(long = "mips32", value_name = "ALIAS")]
    pub mips32: Option<String>,

    /// When the current CPU architecture is 32-bit MIPS (LE), use this value when looking up the correct asset
    #[clap(long = "mips32-le", value_name = "ALIAS")]
    pub mips32_le: Option<String>,

    /// When the current CPU architecture is 64-bit MIPS, use this value when looking up the correct asset
    #[clap(long = "mips64", value_name = "ALIAS")]
    pub mips64: Option<String>,

    /// When the current CPU architecture is 64-bit MIPS (LE), use this value when looking up the correct asset
    #[clap(long = "mips64-le", value_name = "ALIAS")]
    pub mips64_le: Option<String>,

    /// When the current CPU architecture is 64-bit PowerPC, use this value when looking up the correct asset
    #[clap(long, value_name = "ALIAS")]
    pub ppc64: Option<String>,

    /// When the current CPU architecture is 64-bit PowerPC (LE), use this value when looking up the correct asset
    #[clap(long, value_name = "ALIAS")]
    pub ppc64le: Option<String>,

    /// When the current CPU architecture is 64-bit RISC-V, use this value when looking up the correct asset
    #[clap(long, value_name = "ALIAS")]
    pub riscv64: Option<String>,

    /// When the current CPU architecture is 64-bit s390x, use this value when looking up the correct asset
    #[clap(long, value_name = "ALIAS")]
    pub s390x: Option<String>,
}

impl AliasArgs {
    /// Collect the flags that were actually set into an alias table.
    pub fn to_table(&self) -> AliasTable {
        let mut table = AliasTable::default();

        let os_flags = [
            ("darwin", &self.darwin),
            ("dragonfly", &self.dragonfly),
            ("freebsd", &self.freebsd),
            ("illumos", &self.illumos),
            ("linux", &self.linux),
            ("netbsd", &self.netbsd),
            ("openbsd", &self.openbsd),
            ("plan9", &self.plan9),
            ("solaris", &self.solaris),
            ("windows", &self.windows),
        ];
        for (ident, value) in os_flags {
            if let Some(alias) = value {
                table.os.insert(ident.to_string(), alias.clone());
            }
        }

        let arch_flags = [
            ("arm", &self.arm32),
            ("arm64", &self.arm64),
            ("386", &self.intel32),
            ("amd64", &self.intel64),
            ("loong64", &self.loong64),
            ("mips", &self.mips32),
            ("mipsle", &self.mips32_le),
            ("mips64", &self.mips64),
            ("mips64le", &self.mips64_le),
            ("ppc64", &self.ppc64),
            ("ppc64le", &self.ppc64le),
            ("riscv64", &self.riscv64),
            ("s390x", &self.s390x),
        ];
        for (ident, value) in arch_flags {
            if let Some(alias) = value {
                table.arch.insert(ident.to_string(), alias.clone());
            }
        }

        table
    }
}

/// Split an `owner/repo` argument into its two parts.
pub fn parse_owner_repo(input: &str) -> crate::error::Result<(String, String)> {
    match input.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(GhGetError::InvalidRepo {
            input: input.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_owner_repo() {
        let (owner, repo) = parse_owner_repo("BurntSushi/ripgrep").unwrap();
        assert_eq!(owner, "BurntSushi");
        assert_eq!(repo, "ripgrep");
    }

    #[test]
    fn test_parse_owner_repo_rejects_malformed() {
        for input in ["ripgrep", "a/b/c", "/repo", "owner/", ""] {
            assert!(
                matches!(parse_owner_repo(input), Err(GhGetError::InvalidRepo { .. })),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_alias_args_to_table() {
        let args = AliasArgs {
            darwin: Some("macOS".to_string()),
            intel64: Some("x86_64".to_string()),
            ..AliasArgs::default()
        };

        let table = args.to_table();
        assert_eq!(table.os.get("darwin").map(String::as_str), Some("macOS"));
        assert_eq!(table.arch.get("amd64").map(String::as_str), Some("x86_64"));
        assert!(!table.os.contains_key("linux"));
    }
}
