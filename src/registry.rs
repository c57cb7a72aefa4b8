use std::collections::{BTreeMap, BTreeSet, HashSet};

use im::OrdMap;
use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Text style applied to a speaker's dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Style {
    #[default]
    None,
    Bold,
    Italic,
    BoldItalic,
}

impl Style {
    /// none -> bold -> italic -> bold-italic -> none
    pub fn next(self) -> Self {
        match self {
            Style::None => Style::Bold,
            Style::Bold => Style::Italic,
            Style::Italic => Style::BoldItalic,
            Style::BoldItalic => Style::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Style::None => "none",
            Style::Bold => "bold",
            Style::Italic => "italic",
            Style::BoldItalic => "bold-italic",
        }
    }
}

/// Persisted color state for one speaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default)]
    pub key: String,
    pub display_name: String,
    #[serde(rename = "colorHex")]
    pub color: Color,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub aliases: BTreeSet<String>,
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub dialogue_count: u32,
}

impl Entry {
    pub fn new(display_name: &str, color: Color) -> Self {
        Self {
            key: normalize(display_name),
            display_name: display_name.trim().to_string(),
            color,
            locked: false,
            aliases: BTreeSet::new(),
            style: Style::None,
            dialogue_count: 0,
        }
    }
}

/// Normalize a speaker name to its registry key.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Mapping from normalized speaker key to its entry.
///
/// Backed by a persistent map so that cloning for history snapshots shares
/// structure instead of copying every entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    entries: OrdMap<String, Entry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Resolve a raw name to the key that owns it, either directly or
    /// through an alias.
    pub fn resolve(&self, name: &str) -> Option<String> {
        let key = normalize(name);
        if key.is_empty() {
            return None;
        }
        if self.entries.contains_key(&key) {
            return Some(key);
        }
        self.entries
            .values()
            .find(|e| e.aliases.contains(&key))
            .map(|e| e.key.clone())
    }

    /// Look up an entry by name or alias.
    pub fn get(&self, name: &str) -> Option<&Entry> {
        let key = self.resolve(name)?;
        self.entries.get(&key)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Entry> {
        let key = self.resolve(name)?;
        self.entries.get_mut(&key)
    }

    /// Insert a new entry. Returns the new key, or `None` when the name is
    /// empty or already resolves to an existing entry.
    pub fn add(&mut self, name: &str, color: Color, locked: bool) -> Option<String> {
        if self.resolve(name).is_some() {
            return None;
        }
        let mut entry = Entry::new(name, color);
        if entry.key.is_empty() {
            return None;
        }
        entry.locked = locked;
        let key = entry.key.clone();
        self.entries.insert(key.clone(), entry);
        Some(key)
    }

    /// Manual recolor. Ignores the lock flag.
    pub fn set_color(&mut self, name: &str, color: Color) -> bool {
        match self.get_mut(name) {
            Some(entry) if entry.color != color => {
                entry.color = color;
                true
            }
            _ => false,
        }
    }

    /// Flip the lock flag, returning the new state.
    pub fn toggle_lock(&mut self, name: &str) -> Option<bool> {
        let entry = self.get_mut(name)?;
        entry.locked = !entry.locked;
        Some(entry.locked)
    }

    /// Attach an alias. Rejected when the alias is empty or already names
    /// any entry, as a primary key or as another alias.
    pub fn add_alias(&mut self, name: &str, alias: &str) -> bool {
        let alias = normalize(alias);
        if alias.is_empty() || self.resolve(&alias).is_some() {
            return false;
        }
        match self.get_mut(name) {
            Some(entry) => entry.aliases.insert(alias),
            None => false,
        }
    }

    pub fn remove_alias(&mut self, name: &str, alias: &str) -> bool {
        let alias = normalize(alias);
        match self.get_mut(name) {
            Some(entry) => entry.aliases.remove(&alias),
            None => false,
        }
    }

    /// Advance the entry's style, returning the new one.
    pub fn cycle_style(&mut self, name: &str) -> Option<Style> {
        let entry = self.get_mut(name)?;
        entry.style = entry.style.next();
        Some(entry.style)
    }

    /// Exchange the colors of two entries.
    pub fn swap(&mut self, a: &str, b: &str) -> bool {
        let (Some(ka), Some(kb)) = (self.resolve(a), self.resolve(b)) else {
            return false;
        };
        if ka == kb {
            return false;
        }
        let (Some(ca), Some(cb)) = (
            self.entries.get(&ka).map(|e| e.color),
            self.entries.get(&kb).map(|e| e.color),
        ) else {
            return false;
        };
        if let Some(e) = self.entries.get_mut(&ka) {
            e.color = cb;
        }
        if let Some(e) = self.entries.get_mut(&kb) {
            e.color = ca;
        }
        true
    }

    pub fn remove(&mut self, name: &str) -> bool {
        match self.resolve(name) {
            Some(key) => self.entries.remove(&key).is_some(),
            None => false,
        }
    }

    /// Remove every entry whose lock flag equals `locked`. Returns how many
    /// were removed.
    pub fn remove_by_lock(&mut self, locked: bool) -> usize {
        let doomed: Vec<String> = self
            .entries
            .values()
            .filter(|e| e.locked == locked)
            .map(|e| e.key.clone())
            .collect();
        for key in &doomed {
            self.entries.remove(key);
        }
        doomed.len()
    }

    pub fn clear(&mut self) {
        self.entries = OrdMap::new();
    }

    pub(crate) fn reset_counts(&mut self) {
        let keys: Vec<String> = self.entries.keys().cloned().collect();
        for key in keys {
            if let Some(e) = self.entries.get_mut(&key) {
                e.dialogue_count = 0;
            }
        }
    }

    pub fn used_colors(&self) -> HashSet<Color> {
        self.entries.values().map(|e| e.color).collect()
    }

    pub fn locked_entries(&self) -> Vec<&Entry> {
        self.entries.values().filter(|e| e.locked).collect()
    }

    /// alias -> owning key
    pub fn alias_map(&self) -> BTreeMap<String, String> {
        self.entries
            .values()
            .flat_map(|e| e.aliases.iter().map(|a| (a.clone(), e.key.clone())))
            .collect()
    }

    /// Re-establish key invariants on data loaded from outside: keys are
    /// normalized and match the entry, aliases never shadow a primary key,
    /// and entries with an empty name are dropped.
    pub fn sanitized(self) -> Self {
        let mut entries = OrdMap::new();
        for (raw_key, mut entry) in self.entries {
            let key = normalize(&raw_key);
            if key.is_empty() || entries.contains_key(&key) {
                continue;
            }
            entry.key = key.clone();
            if entry.display_name.trim().is_empty() {
                entry.display_name = raw_key.trim().to_string();
            }
            entries.insert(key, entry);
        }
        let primary: HashSet<String> = entries.keys().cloned().collect();
        let mut claimed = HashSet::new();
        let keys: Vec<String> = entries.keys().cloned().collect();
        for key in keys {
            if let Some(entry) = entries.get_mut(&key) {
                entry.aliases = std::mem::take(&mut entry.aliases)
                    .into_iter()
                    .map(|a| normalize(&a))
                    .filter(|a| !a.is_empty() && !primary.contains(a) && claimed.insert(a.clone()))
                    .collect();
            }
        }
        Self { entries }
    }
}
