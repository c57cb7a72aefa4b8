use std::sync::LazyLock;

use regex::Regex;

use crate::color::Color;
use crate::registry::Registry;

/// `[COLOR:Name=#RRGGBB,...]` or `[COLORS:...]`, any case, may span lines.
// Constant pattern; every parse test compiles it.
static BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\[COLORS?:(.*?)\]").expect("valid annotation pattern"));

/// One accepted `Name=#RRGGBB` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub color: Color,
}

/// One matched annotation block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// The exact substring matched, for callers that strip it from display.
    pub raw: String,
    pub declarations: Vec<Declaration>,
    /// Pairs that failed validation and were dropped.
    pub skipped: usize,
}

/// What a scan did to the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Raw matched blocks in order of appearance.
    pub blocks: Vec<String>,
    /// Keys created during the scan.
    pub created: Vec<String>,
    /// Pre-existing keys that were re-detected.
    pub updated: Vec<String>,
    pub skipped: usize,
}

impl ScanReport {
    pub fn touched(&self) -> bool {
        !self.created.is_empty() || !self.updated.is_empty()
    }

    fn merge(&mut self, other: ScanReport) {
        self.blocks.extend(other.blocks);
        self.skipped += other.skipped;
        for key in other.created {
            if !self.created.contains(&key) {
                self.created.push(key);
            }
        }
        for key in other.updated {
            if !self.updated.contains(&key) && !self.created.contains(&key) {
                self.updated.push(key);
            }
        }
    }
}

/// `#` followed by exactly six hex digits, nothing else.
fn is_hex_token(s: &str) -> bool {
    s.len() == 7
        && s.starts_with('#')
        && s[1..].bytes().all(|b| b.is_ascii_hexdigit())
}

/// Parse a single `Name=#RRGGBB` item. Returns `None` for anything that
/// does not fit; callers skip it and keep going.
fn parse_pair(raw: &str) -> Option<Declaration> {
    let (name, hex) = raw.split_once('=')?;
    let name = name.trim();
    let hex = hex.trim();
    if name.is_empty() || !is_hex_token(hex) {
        return None;
    }
    let color = Color::from_hex(hex).ok()?;
    Some(Declaration {
        name: name.to_string(),
        color,
    })
}

/// Find every annotation block in `text`. A bad pair never invalidates its
/// siblings or the block.
pub fn parse(text: &str) -> Vec<Block> {
    BLOCK
        .captures_iter(text)
        .filter_map(|caps| {
            let raw = caps.get(0)?.as_str().to_string();
            let body = caps.get(1).map_or("", |m| m.as_str());
            let mut declarations = Vec::new();
            let mut skipped = 0;
            for item in body.split(',') {
                if item.trim().is_empty() {
                    continue;
                }
                match parse_pair(item) {
                    Some(decl) => declarations.push(decl),
                    None => {
                        tracing::debug!(pair = item.trim(), "skipping malformed color pair");
                        skipped += 1;
                    }
                }
            }
            Some(Block {
                raw,
                declarations,
                skipped,
            })
        })
        .collect()
}

/// Apply one declaration. Existing entries (by key or alias) gain a
/// dialogue and take the color only when unlocked; new entries start at one
/// dialogue with `auto_lock` as their lock flag.
fn apply(registry: &mut Registry, decl: &Declaration, auto_lock: bool, report: &mut ScanReport) {
    if let Some(entry) = registry.get_mut(&decl.name) {
        entry.dialogue_count = entry.dialogue_count.saturating_add(1);
        if !entry.locked {
            entry.color = decl.color;
        }
        let key = entry.key.clone();
        if !report.updated.contains(&key) && !report.created.contains(&key) {
            report.updated.push(key);
        }
        return;
    }
    if let Some(key) = registry.add(&decl.name, decl.color, auto_lock) {
        if let Some(entry) = registry.get_mut(&key) {
            entry.dialogue_count = 1;
        }
        tracing::debug!(%key, color = %decl.color, "new speaker detected");
        report.created.push(key);
    }
}

/// Incremental scan: apply every block in one message on top of the current
/// counts.
pub fn scan_message(registry: &mut Registry, message: &str, auto_lock: bool) -> ScanReport {
    let mut report = ScanReport::default();
    for block in parse(message) {
        for decl in &block.declarations {
            apply(registry, decl, auto_lock, &mut report);
        }
        report.skipped += block.skipped;
        report.blocks.push(block.raw);
    }
    report
}

/// Full-history scan staged on a working copy.
///
/// Every dialogue count is reset to zero, then messages are replayed in the
/// order they are fed. Feeding can be split across as many calls as the
/// caller likes; nothing reaches the live registry until [`FullScan::finish`]
/// hands back the finished copy.
#[derive(Debug, Clone)]
pub struct FullScan {
    working: Registry,
    auto_lock: bool,
    report: ScanReport,
    messages: usize,
    revision: u64,
}

impl FullScan {
    pub fn new(base: &Registry, auto_lock: bool) -> Self {
        let mut working = base.clone();
        working.reset_counts();
        Self {
            working,
            auto_lock,
            report: ScanReport::default(),
            messages: 0,
            revision: 0,
        }
    }

    /// Stamp the state revision the scan was taken from.
    pub fn at_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn feed(&mut self, message: &str) {
        let report = scan_message(&mut self.working, message, self.auto_lock);
        self.report.merge(report);
        self.messages += 1;
    }

    pub fn feed_all<'m, I: IntoIterator<Item = &'m str>>(&mut self, messages: I) {
        for message in messages {
            self.feed(message);
        }
    }

    /// Messages fed so far.
    pub fn messages(&self) -> usize {
        self.messages
    }

    pub fn finish(self) -> (Registry, ScanReport) {
        (self.working, self.report)
    }
}
