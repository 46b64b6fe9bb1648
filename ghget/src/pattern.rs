//! Pattern templates for asset names and in-archive paths.
//!
//! Templates are literal strings with `{{.Ver}}`, `{{.OS}}`, `{{.Arch}}` and
//! `{{.Ext}}` placeholders. Substitution is a single pass: no nesting, no
//! conditionals. The resolved string is handed to the asset selector as a
//! regular expression, so a pattern like `mytool_{{.Ver}}_{{.OS}}_{{.Arch}}.{{.Ext}}`
//! matches any supported archive format without enumerating them.

use crate::error::{GhGetError, Result};

/// Substitution variables available to a pattern template. Built once per
/// invocation from the resolved release and the normalized platform.
#[derive(Debug, Clone, Default)]
pub struct PatternContext {
    /// Release version with any leading `v` stripped.
    pub ver: String,
    /// Normalized (and possibly aliased) operating system identifier.
    pub os: String,
    /// Normalized (and possibly aliased) CPU architecture identifier.
    pub arch: String,
    /// Regex alternation over the supported archive suffixes.
    pub ext: String,
}

const EXTENSIONS: &[&str] = &[
    "gz", "tar.bz2", "tar.gz", "tar.xz", "tbz2", "tgz", "txz", "zip",
];

/// Regex alternation over every archive suffix the extractor understands,
/// e.g. `(gz|tar.bz2|tar.gz|tar.xz|tbz2|tgz|txz|zip)`. Windows builds also
/// accept bare `exe` assets.
pub fn ext_alternation() -> String {
    let mut exts: Vec<&str> = EXTENSIONS.to_vec();
    if cfg!(windows) {
        exts.insert(0, "exe");
    }
    format!("({})", exts.join("|"))
}

/// Substitute the placeholders in `template` with values from `vars`.
///
/// Templates without placeholders pass through unchanged. An unclosed
/// `{{`, a placeholder missing its leading `.`, or an unknown placeholder
/// name is a [`GhGetError::Template`] error.
pub fn render(template: &str, vars: &PatternContext) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find("}}").ok_or_else(|| GhGetError::Template {
            template: template.to_string(),
            message: "unclosed '{{'".to_string(),
        })?;

        let name = after[..end].trim();
        let name = name
            .strip_prefix('.')
            .ok_or_else(|| GhGetError::Template {
                template: template.to_string(),
                message: format!("placeholder '{name}' must begin with '.'"),
            })?;

        let value = match name {
            "Ver" => &vars.ver,
            "OS" => &vars.os,
            "Arch" => &vars.arch,
            "Ext" => &vars.ext,
            other => {
                return Err(GhGetError::Template {
                    template: template.to_string(),
                    message: format!("unknown placeholder '.{other}'"),
                })
            }
        };

        out.push_str(value);
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    Ok(out)
}
