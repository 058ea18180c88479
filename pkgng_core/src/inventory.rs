/*============================================================
  Synavera Project: Syn-Pkgng
  Module: pkgng_core::inventory
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Parse `pkg query` and `pkg version` output into package
    records joined by origin.

  Security / Safety Notes:
    Pure text processing; pkg output is treated as untrusted
    and malformed lines are skipped rather than trusted.

  Dependencies:
    serde for snapshot output.

  Operational Scope:
    Feeds the pkgng provider with inventory snapshots and
    latest-version lookups.

  Revision History:
    2025-11-12 COD  Crafted pkg inventory parser.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Lenient line parsing with observable skip counts
    - Exact origin matching for every lookup
============================================================*/

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::package_info::PackageRecord;

/// Format string handed to `pkg query`; fields are space separated.
pub const QUERY_FORMAT: &str = "%n %v %o";

/// Comparison flag printed by `pkg version -o`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VersionFlag {
    /// `<`: the repository carries a newer version.
    Behind,
    /// `=`: installed version matches the repository.
    Current,
    /// `>`: installed version is newer than the repository.
    Ahead,
}

impl VersionFlag {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "<" => Some(VersionFlag::Behind),
            "=" => Some(VersionFlag::Current),
            ">" => Some(VersionFlag::Ahead),
            _ => None,
        }
    }
}

/// One parsed line of `pkg version -voR`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    pub origin: String,
    pub flag: VersionFlag,
    pub remote_version: Option<String>,
}

/// Counters for lines the parser could not use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    pub info_skipped: usize,
    pub version_skipped: usize,
}

impl ParseStats {
    pub fn total(&self) -> usize {
        self.info_skipped + self.version_skipped
    }
}

/// Parse a `%n %v %o` line into a record without a latest version.
pub fn parse_info_line(line: &str) -> Option<PackageRecord> {
    let mut fields = line.split_whitespace();
    let name = fields.next()?;
    let version = fields.next()?;
    let origin = fields.next()?;
    if fields.next().is_some() || !is_origin(origin) {
        return None;
    }
    Some(PackageRecord::new(
        name.to_string(),
        origin.to_string(),
        version.to_string(),
    ))
}

/// Parse an `<origin> <flag> <text>` line of `pkg version -voR`.
pub fn parse_version_line(line: &str) -> Option<VersionEntry> {
    let mut fields = line.split_whitespace();
    let origin = fields.next()?;
    let flag = VersionFlag::from_token(fields.next()?)?;
    if !is_origin(origin) {
        return None;
    }
    let remote_version = remote_version(line);
    if flag == VersionFlag::Behind && remote_version.is_none() {
        return None;
    }
    Some(VersionEntry {
        origin: origin.to_string(),
        flag,
        remote_version,
    })
}

fn remote_version(line: &str) -> Option<String> {
    let (_, tail) = line.split_once("remote has ")?;
    let version = tail.split(')').next()?.trim();
    if version.is_empty() {
        None
    } else {
        Some(version.to_string())
    }
}

fn is_origin(token: &str) -> bool {
    matches!(token.split_once('/'), Some((category, name)) if !category.is_empty() && !name.is_empty())
}

/// Parsed `pkg version` output keyed by exact origin.
#[derive(Debug, Default)]
pub struct VersionList {
    entries: HashMap<String, VersionEntry>,
    skipped: usize,
}

impl VersionList {
    pub fn parse(text: &str) -> Self {
        let mut list = VersionList::default();
        for line in text.lines().filter(|line| !line.trim().is_empty()) {
            match parse_version_line(line) {
                Some(entry) => {
                    if let Entry::Vacant(slot) = list.entries.entry(entry.origin.clone()) {
                        slot.insert(entry);
                    } else {
                        list.skipped += 1;
                    }
                }
                None => list.skipped += 1,
            }
        }
        list
    }

    pub fn get(&self, origin: &str) -> Option<&VersionEntry> {
        self.entries.get(origin)
    }

    /// Upgrade target for `origin`, or `None` when current, ahead or unknown.
    pub fn latest_for(&self, origin: &str) -> Option<&str> {
        let entry = self.get(origin)?;
        match entry.flag {
            VersionFlag::Behind => entry.remote_version.as_deref(),
            VersionFlag::Current | VersionFlag::Ahead => None,
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// A single inventory snapshot.
#[derive(Debug, Default, Serialize)]
pub struct Inventory {
    pub packages: Vec<PackageRecord>,
    pub stats: ParseStats,
}

impl Inventory {
    /// Join `pkg query -a` output with `pkg version` output by origin.
    pub fn build(info: &str, versions: &str) -> Self {
        let versions = VersionList::parse(versions);
        let mut stats = ParseStats {
            info_skipped: 0,
            version_skipped: versions.skipped(),
        };

        let mut seen = HashSet::new();
        let mut packages = Vec::new();
        for line in info.lines().filter(|line| !line.trim().is_empty()) {
            let Some(mut record) = parse_info_line(line) else {
                stats.info_skipped += 1;
                continue;
            };
            if !seen.insert(record.origin.clone()) {
                stats.info_skipped += 1;
                continue;
            }
            record.latest_version = resolve_latest(&record, &versions);
            packages.push(record);
        }

        Inventory { packages, stats }
    }

    pub fn find_by_origin(&self, origin: &str) -> Option<&PackageRecord> {
        self.packages.iter().find(|pkg| pkg.origin == origin)
    }

    /// Match either the short name or the origin exactly.
    pub fn find(&self, identifier: &str) -> Option<&PackageRecord> {
        self.packages
            .iter()
            .find(|pkg| pkg.origin == identifier || pkg.name == identifier)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Latest version for an installed record given the version list.
pub fn resolve_latest(record: &PackageRecord, versions: &VersionList) -> Option<String> {
    let entry = versions.get(&record.origin)?;
    match entry.flag {
        VersionFlag::Behind => entry.remote_version.clone(),
        VersionFlag::Current | VersionFlag::Ahead => Some(record.installed_version.clone()),
    }
}
