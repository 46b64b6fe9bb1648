//! OS and CPU architecture normalization.
//!
//! Release assets are almost always named after Go-style platform
//! identifiers (`darwin`, `linux`, `amd64`, `arm64`, ...), so the native
//! identifiers reported by the Rust runtime are translated to that canonical
//! set first, then mapped through a caller-configurable alias table.
//! A repository that names its assets `x86_64` instead of `amd64` only needs
//! an `amd64 -> x86_64` alias.

use std::collections::HashMap;

use crate::error::{GhGetError, Result};

/// Canonical operating system identifiers, in asset-naming form.
pub const OS_IDENTS: &[&str] = &[
    "darwin",
    "dragonfly",
    "freebsd",
    "illumos",
    "linux",
    "netbsd",
    "openbsd",
    "plan9",
    "solaris",
    "windows",
];

/// Canonical CPU architecture identifiers, in asset-naming form.
pub const ARCH_IDENTS: &[&str] = &[
    "386", "amd64", "arm", "arm64", "loong64", "mips", "mips64", "mips64le", "mipsle", "ppc64",
    "ppc64le", "riscv64", "s390x",
];

/// Caller-supplied overrides, keyed by canonical identifier. Identifiers
/// without an entry pass through unchanged.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    pub os: HashMap<String, String>,
    pub arch: HashMap<String, String>,
}

impl AliasTable {
    /// Later entries win, so config-file aliases can override flag aliases.
    pub fn extend(&mut self, os: &HashMap<String, String>, arch: &HashMap<String, String>) {
        self.os.extend(os.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.arch
            .extend(arch.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

/// The normalized platform for the current invocation.
#[derive(Debug, Clone)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

/// Resolve the running platform through `aliases`.
pub fn current(aliases: &AliasTable) -> Result<Platform> {
    Ok(Platform {
        os: normalize_os(native_os(), aliases)?,
        arch: normalize_arch(native_arch(), aliases)?,
    })
}

/// Map a canonical OS identifier through the alias table. Identifiers
/// outside the canonical set fail closed with `UnsupportedPlatform`.
pub fn normalize_os(native: &str, aliases: &AliasTable) -> Result<String> {
    if !OS_IDENTS.contains(&native) {
        return Err(GhGetError::UnsupportedPlatform {
            kind: "operating system",
            value: native.to_string(),
        });
    }
    Ok(aliases
        .os
        .get(native)
        .cloned()
        .unwrap_or_else(|| native.to_string()))
}

/// Map a canonical CPU identifier through the alias table.
pub fn normalize_arch(native: &str, aliases: &AliasTable) -> Result<String> {
    if !ARCH_IDENTS.contains(&native) {
        return Err(GhGetError::UnsupportedPlatform {
            kind: "CPU architecture",
            value: native.to_string(),
        });
    }
    Ok(aliases
        .arch
        .get(native)
        .cloned()
        .unwrap_or_else(|| native.to_string()))
}

/// The running OS in canonical form. Unknown values are passed through
/// verbatim so `normalize_os` can reject them with context.
pub fn native_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// The running CPU architecture in canonical form.
pub fn native_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "loongarch64" => "loong64",
        "powerpc64" => "ppc64",
        other => other,
    }
}
