// SPDX-FileCopyrightText: 2026 sift-http contributors
//
// SPDX-License-Identifier: ISC

//! URL suppression rules and script MIME detection.

use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// A configured suppression pattern failed to compile.
#[derive(Debug, Error)]
#[error("invalid suppression pattern `{pattern}`: {source}")]
pub struct PatternCompileError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// Compiled set of case-insensitive URL suppression rules.
///
/// Immutable after construction, so concurrent observer callbacks may
/// share it without locking.
#[derive(Debug, Default)]
pub struct SuppressionList {
    rules: Vec<Regex>,
}

impl SuppressionList {
    /// Compile each pattern as a case-insensitive regex.
    ///
    /// Fails on the first pattern that does not compile; the error
    /// names the offending pattern so callers can log it and fall open
    /// to [`SuppressionList::empty`].
    pub fn compile<I, S>(patterns: I) -> Result<Self, PatternCompileError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let rule = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| PatternCompileError {
                    pattern: pattern.to_string(),
                    source,
                })?;
            rules.push(rule);
        }
        Ok(Self { rules })
    }

    /// Rule set that suppresses nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// True when any rule matches anywhere within the URL.
    pub fn is_ignored(&self, url: &str) -> bool {
        self.rules.iter().any(|rule| rule.is_match(url))
    }
}

/// Ordered list of MIME prefixes that mark a response as script content.
///
/// Prefixes are normalized to lowercase at construction; empty entries
/// are discarded.
#[derive(Debug, Clone)]
pub struct ScriptMimes {
    prefixes: Vec<String>,
}

impl ScriptMimes {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prefixes = prefixes
            .into_iter()
            .map(|p| p.as_ref().trim().to_ascii_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self { prefixes }
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// First configured prefix matching the effective MIME, if any.
    ///
    /// The effective MIME is the stated Content-Type when non-empty,
    /// else the engine-inferred type; it is trimmed and lowercased
    /// before matching. Matching is prefix-based so parameterized
    /// values like `application/javascript; charset=utf-8` still
    /// count. An empty effective MIME never matches.
    pub fn matched_prefix(&self, stated: Option<&str>, inferred: Option<&str>) -> Option<&str> {
        let effective = match stated {
            Some(s) if !s.is_empty() => s,
            _ => inferred.unwrap_or(""),
        };
        let effective = effective.trim().to_ascii_lowercase();
        if effective.is_empty() {
            return None;
        }
        self.prefixes
            .iter()
            .map(String::as_str)
            .find(|prefix| effective.starts_with(prefix))
    }
}
