//! Command-line assembly with sensitive-value masking
//!
//! The argument list tracks a mask bit per token: rendering for the log
//! replaces masked property values with a fixed placeholder, while the
//! vector handed to the process always carries the real values.

use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

use crate::config::StepConfig;

/// Placeholder rendered in place of sensitive values
pub const MASK: &str = "******";

#[derive(Clone, Debug)]
struct Argument {
    value: String,
    /// Key to re-render with a masked value, when set
    masked_key: Option<String>,
}

/// Ordered command-line tokens, immutable once assembled
#[derive(Clone, Debug, Default)]
pub struct ArgumentList {
    items: Vec<Argument>,
}

impl ArgumentList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plain token
    pub fn add(&mut self, value: impl Into<String>) {
        self.items.push(Argument {
            value: value.into(),
            masked_key: None,
        });
    }

    /// Append one `-D<key>=<value>` token, masked in rendered output
    pub fn add_property(&mut self, key: &str, value: &str, sensitive: bool) {
        self.items.push(Argument {
            value: format!("-D{key}={value}"),
            masked_key: sensitive.then(|| key.to_string()),
        });
    }

    /// Real argument vector for process launch (program first)
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        self.items.iter().map(|a| a.value.clone()).collect()
    }

    /// Log-safe rendering with sensitive values replaced by the mask
    #[must_use]
    pub fn to_display_string(&self) -> String {
        self.items
            .iter()
            .map(|a| match &a.masked_key {
                Some(key) => format!("-D{key}={MASK}"),
                None => a.value.clone(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Rewrite the final token in place (platform quoting transform)
    pub fn rewrite_last(&mut self, f: impl FnOnce(&str) -> String) {
        if let Some(last) = self.items.last_mut() {
            last.value = f(&last.value);
        }
    }
}

/// Parse a free-text property specification into ordered key/value pairs.
///
/// One `key=value` per line; blank lines, `#` comments, and lines without
/// `=` are ignored.
#[must_use]
pub fn parse_property_string(properties: &str) -> Vec<(String, String)> {
    properties
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            line.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        })
        .collect()
}

/// Merge property sources, later entries overriding earlier ones by key
/// while keeping the first occurrence's position.
#[must_use]
pub fn merge_properties(
    build_vars: &[(String, String)],
    user_properties: &[(String, String)],
) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = Vec::new();
    for (key, value) in build_vars.iter().chain(user_properties) {
        if let Some(existing) = merged.iter_mut().find(|(k, _)| k == key) {
            existing.1 = value.clone();
        } else {
            merged.push((key.clone(), value.clone()));
        }
    }
    merged
}

/// Assemble the full argument vector for one invocation.
///
/// Token order: executable, `-file <name>`, merged `-D` properties, optional
/// `-lib`, optional `-verbose`, optional `-emacs`. The build file is passed
/// by name only; the process runs with the file's directory as its working
/// directory.
#[must_use]
pub fn assemble(
    executable: &Path,
    build_file_name: &str,
    config: &StepConfig,
    build_vars: &[(String, String)],
    sensitive: &HashSet<String>,
    lib_dir: Option<&str>,
) -> ArgumentList {
    let mut args = ArgumentList::new();
    args.add(executable.display().to_string());
    args.add("-file");
    args.add(build_file_name);

    let user_properties = config
        .properties
        .as_deref()
        .map(parse_property_string)
        .unwrap_or_default();
    for (key, value) in merge_properties(build_vars, &user_properties) {
        args.add_property(&key, &value, sensitive.contains(&key));
    }

    if let Some(dir) = lib_dir {
        args.add("-lib");
        args.add(dir);
    }
    if config.verbose {
        args.add("-verbose");
    }
    if config.plain_output {
        args.add("-emacs");
    }

    if cfg!(windows) {
        args.rewrite_last(fix_empty_property_values);
    }

    args
}

/// Quote empty `-D<key>=` values, which Ant on Windows rejects bare.
///
/// Applied to the final token of the already-escaped vector, once per
/// invocation.
#[must_use]
pub fn fix_empty_property_values(token: &str) -> String {
    let re = Regex::new(r#"(^| )(-D[^"\s]+)=( |$)"#).unwrap();
    let mut current = token.to_string();
    // Adjacent empty values overlap on the separating space, so iterate
    // until the rewrite reaches a fixed point.
    loop {
        let next = re.replace_all(&current, "${1}${2}=\"\"${3}").into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}
