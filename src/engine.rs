//! The engine value that owns all mutable state for one conversation scope.
//!
//! Every logical action (one command, one completed scan) that changes the
//! registry records exactly one history snapshot. Actions that turn out to
//! be no-ops record nothing.

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::cli::ThemeMode;
use crate::color::Color;
use crate::history::History;
use crate::pipeline::allocate::{self, Allocator};
use crate::pipeline::annotate::{self, FullScan, ScanReport};
use crate::pipeline::conflict::{self, Conflict, ResolveReport};
use crate::prompt;
use crate::registry::{Registry, Style};
use crate::settings::Settings;
use crate::store::Document;
use crate::theme;

/// A staged full scan was handed back after the registry had moved on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("state changed since the full scan began (revision {began}, now {now})")]
pub struct StaleScan {
    pub began: u64,
    pub now: u64,
}

#[derive(Debug, Clone)]
pub struct Engine {
    registry: Registry,
    settings: Settings,
    history: History,
    rng: StdRng,
    mode_hint: Option<ThemeMode>,
    revision: u64,
}

fn allocator<'a>(settings: &Settings, mode: ThemeMode, rng: &'a mut StdRng) -> Allocator<'a, StdRng> {
    Allocator::new(
        theme::palette(&settings.palette),
        mode,
        settings.brightness_offset(),
        rng,
    )
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Engine {
    pub fn new(settings: Settings) -> Self {
        Self::build(Registry::new(), settings, StdRng::from_entropy())
    }

    /// Engine whose palette-exhaustion fallback is reproducible.
    pub fn with_seed(settings: Settings, seed: u64) -> Self {
        Self::build(Registry::new(), settings, StdRng::seed_from_u64(seed))
    }

    pub fn from_document(doc: Document) -> Self {
        Self::build(doc.colors, doc.settings, StdRng::from_entropy())
    }

    fn build(registry: Registry, settings: Settings, rng: StdRng) -> Self {
        let history = History::seeded(&registry);
        Self {
            registry,
            settings,
            history,
            rng,
            mode_hint: None,
            revision: 0,
        }
    }

    /// Export registry and settings in the persisted shape.
    pub fn document(&self) -> Document {
        Document {
            colors: self.registry.clone(),
            settings: self.settings.clone(),
        }
    }

    /// Swap in the state of another conversation scope. History starts over.
    pub fn replace_scope(&mut self, doc: Document) {
        self.registry = doc.colors;
        self.settings = doc.settings;
        self.history = History::seeded(&self.registry);
        self.revision += 1;
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Settings changes are not part of undo history.
    pub fn update_settings(&mut self, f: impl FnOnce(&mut Settings)) {
        f(&mut self.settings);
        self.revision += 1;
    }

    /// Background mode reported by the host, used when settings say auto.
    pub fn set_mode_hint(&mut self, hint: Option<ThemeMode>) {
        self.mode_hint = hint;
    }

    pub fn mode(&self) -> ThemeMode {
        self.settings.effective_mode(self.mode_hint)
    }

    /// Increments on every state change. Downstream consumers can compare
    /// revisions to coalesce bursts of updates.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn commit(&mut self, changed: bool) -> bool {
        if changed {
            self.history.record(&self.registry);
            self.revision += 1;
        }
        changed
    }

    /// Add a speaker by hand. Without a color, one is allocated. Returns the
    /// key naming the speaker, whether new or already present.
    pub fn add(&mut self, name: &str, color: Option<Color>) -> Option<String> {
        if let Some(existing) = self.registry.resolve(name) {
            return Some(existing);
        }
        let color = match color {
            Some(c) => c,
            None => {
                let mode = self.mode();
                let used = self.registry.used_colors();
                allocator(&self.settings, mode, &mut self.rng).pick(&used)
            }
        };
        let key = self.registry.add(name, color, false)?;
        self.commit(true);
        Some(key)
    }

    pub fn recolor(&mut self, name: &str, color: Color) -> bool {
        let changed = self.registry.set_color(name, color);
        self.commit(changed)
    }

    pub fn toggle_lock(&mut self, name: &str) -> Option<bool> {
        let locked = self.registry.toggle_lock(name)?;
        self.commit(true);
        Some(locked)
    }

    pub fn add_alias(&mut self, name: &str, alias: &str) -> bool {
        let changed = self.registry.add_alias(name, alias);
        self.commit(changed)
    }

    pub fn remove_alias(&mut self, name: &str, alias: &str) -> bool {
        let changed = self.registry.remove_alias(name, alias);
        self.commit(changed)
    }

    pub fn cycle_style(&mut self, name: &str) -> Option<Style> {
        let style = self.registry.cycle_style(name)?;
        self.commit(true);
        Some(style)
    }

    pub fn swap(&mut self, a: &str, b: &str) -> bool {
        let changed = self.registry.swap(a, b);
        self.commit(changed)
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let changed = self.registry.remove(name);
        self.commit(changed)
    }

    pub fn remove_by_lock(&mut self, locked: bool) -> usize {
        let removed = self.registry.remove_by_lock(locked);
        self.commit(removed > 0);
        removed
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.registry.is_empty();
        self.registry.clear();
        self.commit(changed)
    }

    pub fn suggest(&self, name: &str) -> Option<Color> {
        allocate::suggest_by_name(name)
    }

    /// Incremental scan of one message.
    pub fn scan_message(&mut self, message: &str) -> ScanReport {
        let report =
            annotate::scan_message(&mut self.registry, message, self.settings.auto_lock_detected);
        self.commit(report.touched());
        report
    }

    /// Host hook for a newly generated message. Skipped when the engine is
    /// disabled or automatic scanning is off.
    pub fn on_message(&mut self, message: &str) -> Option<ScanReport> {
        if !self.settings.enabled || !self.settings.auto_scan_new_messages {
            return None;
        }
        Some(self.scan_message(message))
    }

    /// Start a staged full-history scan. Feed it, then hand it to
    /// [`Engine::commit_full_scan`].
    pub fn begin_full_scan(&self) -> FullScan {
        FullScan::new(&self.registry, self.settings.auto_lock_detected).at_revision(self.revision)
    }

    /// Install a finished scan. Refused when any state change happened after
    /// [`Engine::begin_full_scan`]; the caller starts a new scan instead.
    pub fn commit_full_scan(&mut self, scan: FullScan) -> Result<ScanReport, StaleScan> {
        if scan.revision() != self.revision {
            tracing::warn!(
                began = scan.revision(),
                now = self.revision,
                "discarding stale full scan"
            );
            return Err(StaleScan {
                began: scan.revision(),
                now: self.revision,
            });
        }
        Ok(self.install_full_scan(scan))
    }

    fn install_full_scan(&mut self, scan: FullScan) -> ScanReport {
        let messages = scan.messages();
        let (registry, report) = scan.finish();
        let changed = registry != self.registry;
        self.registry = registry;
        self.commit(changed);
        tracing::info!(
            messages,
            blocks = report.blocks.len(),
            created = report.created.len(),
            "full scan complete"
        );
        report
    }

    /// Reset counts and replay the whole history in one go.
    pub fn full_scan<'m, I: IntoIterator<Item = &'m str>>(&mut self, messages: I) -> ScanReport {
        let mut scan = self.begin_full_scan();
        scan.feed_all(messages);
        self.install_full_scan(scan)
    }

    pub fn find_conflicts(&self) -> Vec<Conflict> {
        conflict::find_conflicts(&self.registry)
    }

    pub fn auto_resolve(&mut self) -> ResolveReport {
        let mode = self.mode();
        let before = self.registry.clone();
        let mut alloc = allocator(&self.settings, mode, &mut self.rng);
        let report = conflict::auto_resolve(&mut self.registry, &mut alloc);
        let changed = self.registry != before;
        self.commit(changed);
        report
    }

    pub fn regenerate_all(&mut self) -> usize {
        let before = self.registry.clone();
        let mode = self.mode();
        let mut alloc = allocator(&self.settings, mode, &mut self.rng);
        let visited = conflict::regenerate_all(&mut self.registry, &mut alloc);
        let changed = self.registry != before;
        self.commit(changed);
        visited
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(registry) => {
                self.registry = registry;
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(registry) => {
                self.registry = registry;
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    pub fn prompt(&self) -> String {
        prompt::build_instruction(&self.registry, &self.settings, self.mode())
    }
}
