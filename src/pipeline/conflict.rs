use std::collections::HashSet;

use rand::Rng;

use crate::color::{hue_distance, Color};
use crate::pipeline::allocate::Allocator;
use crate::registry::Registry;

/// Hue distance (degrees) below which two colors may be confused.
const HUE_THRESHOLD: u16 = 25;
/// Lightness difference (percent) below which two colors may be confused.
const LIGHTNESS_THRESHOLD: u8 = 15;

/// Two speakers whose colors are too similar. `a` always sorts before `b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Conflict {
    pub a: String,
    pub b: String,
}

impl Conflict {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        let (x, y) = (x.into(), y.into());
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }
}

/// Outcome of [`auto_resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Number of pairs separated by recoloring one party.
    pub resolved: usize,
    /// Pairs left as-is because both parties are locked.
    pub unresolved: Vec<Conflict>,
}

/// Whether two colors are perceptually too close.
pub fn colors_conflict(x: Color, y: Color) -> bool {
    let (hx, hy) = (x.to_hsl(), y.to_hsl());
    hue_distance(hx.h, hy.h) < HUE_THRESHOLD && hx.l.abs_diff(hy.l) < LIGHTNESS_THRESHOLD
}

/// Every unordered pair of entries whose colors conflict, in key order.
pub fn find_conflicts(registry: &Registry) -> Vec<Conflict> {
    let entries: Vec<_> = registry.iter().collect();
    let mut conflicts = Vec::new();
    for (i, x) in entries.iter().enumerate() {
        for y in &entries[i + 1..] {
            if colors_conflict(x.color, y.color) {
                conflicts.push(Conflict::new(x.key.as_str(), y.key.as_str()));
            }
        }
    }
    conflicts
}

/// Recolor one unlocked party of every conflicting pair.
///
/// Pairs are re-checked against the live registry so an earlier
/// reassignment that already separated a pair is not repeated. When both
/// parties are unlocked the less talkative one moves (ties move `b`). The
/// new color is the first free palette slot that does not conflict with the
/// partner; a pair only counts as resolved once it no longer conflicts.
pub fn auto_resolve<R: Rng + ?Sized>(
    registry: &mut Registry,
    allocator: &mut Allocator<'_, R>,
) -> ResolveReport {
    let mut report = ResolveReport::default();
    for conflict in find_conflicts(registry) {
        let (Some(a), Some(b)) = (registry.get(&conflict.a), registry.get(&conflict.b)) else {
            continue;
        };
        if !colors_conflict(a.color, b.color) {
            continue;
        }
        let (target, partner) = match (a.locked, b.locked) {
            (true, true) => {
                tracing::warn!(a = %conflict.a, b = %conflict.b, "conflict left unresolved, both locked");
                report.unresolved.push(conflict);
                continue;
            }
            (false, true) => (&conflict.a, b.color),
            (true, false) => (&conflict.b, a.color),
            (false, false) if a.dialogue_count < b.dialogue_count => (&conflict.a, b.color),
            (false, false) => (&conflict.b, a.color),
        };
        let color = allocator.pick_where(&registry.used_colors(), |c| !colors_conflict(c, partner));
        if registry.set_color(target, color) && !colors_conflict(color, partner) {
            report.resolved += 1;
        } else {
            tracing::debug!(key = %target, %color, "no separating color left in palette");
        }
    }
    report
}

/// Reassign colors to every unlocked entry, starting from a used set that
/// holds only the locked colors. Entries are visited by ascending dialogue
/// count, then key. Returns the number of entries visited.
pub fn regenerate_all<R: Rng + ?Sized>(
    registry: &mut Registry,
    allocator: &mut Allocator<'_, R>,
) -> usize {
    let mut order: Vec<(u32, String)> = registry
        .iter()
        .filter(|e| !e.locked)
        .map(|e| (e.dialogue_count, e.key.clone()))
        .collect();
    order.sort();

    let mut used: HashSet<Color> = registry.locked_entries().iter().map(|e| e.color).collect();
    for (_, key) in &order {
        let color = allocator.pick(&used);
        used.insert(color);
        registry.set_color(key, color);
    }
    order.len()
}
