use std::collections::HashSet;

use rand::Rng;

use crate::cli::ThemeMode;
use crate::color::Color;
use crate::theme::{Palette, NAME_HUES};

/// Lightness shift applied to every palette entry before use.
const LIGHTNESS_SHIFT: u8 = 15;
const DARK_CEILING: u8 = 85;
const LIGHT_FLOOR: u8 = 35;

/// Fallback lightness once the palette is exhausted.
const FALLBACK_DARK_L: f32 = 75.0;
const FALLBACK_LIGHT_L: f32 = 40.0;
const FALLBACK_JITTER: i32 = 30;

const SUGGEST_SATURATION: f32 = 70.0;
const SUGGEST_LIGHTNESS: f32 = 60.0;

/// Lighten for dark backgrounds, darken for light ones.
fn shift_lightness(l: u8, mode: ThemeMode) -> u8 {
    match mode {
        ThemeMode::Dark => l.saturating_add(LIGHTNESS_SHIFT).min(DARK_CEILING),
        ThemeMode::Light => l.saturating_sub(LIGHTNESS_SHIFT).max(LIGHT_FLOOR),
    }
}

/// Pick a color for a new speaker.
///
/// Walks the palette in order and returns the first adjusted entry not in
/// `used`. When every entry is taken, jitters the hue of a random entry
/// instead; that result is not guaranteed to be unused.
pub fn next_color<R: Rng + ?Sized>(
    palette: &Palette,
    mode: ThemeMode,
    brightness: f32,
    used: &HashSet<Color>,
    rng: &mut R,
) -> Color {
    first_fit(palette, mode, brightness, |c| !used.contains(&c))
        .unwrap_or_else(|| fallback_color(palette, mode, brightness, rng))
}

/// First adjusted palette entry that `accept` takes.
fn first_fit(
    palette: &Palette,
    mode: ThemeMode,
    brightness: f32,
    accept: impl Fn(Color) -> bool,
) -> Option<Color> {
    let found = palette.entries.iter().find_map(|base| {
        let l = shift_lightness(base.l, mode);
        let color = Color::from_hsl(base.h.into(), base.s.into(), l.into(), brightness);
        accept(color).then_some(color)
    });
    if found.is_none() {
        tracing::debug!(palette = palette.name, "palette exhausted, using jittered fallback");
    }
    found
}

/// Allocation context shared by operations that hand out several colors in
/// one pass.
pub struct Allocator<'a, R: Rng + ?Sized> {
    pub palette: Palette,
    pub mode: ThemeMode,
    pub brightness: f32,
    pub rng: &'a mut R,
}

impl<'a, R: Rng + ?Sized> Allocator<'a, R> {
    pub fn new(palette: Palette, mode: ThemeMode, brightness: f32, rng: &'a mut R) -> Self {
        Self {
            palette,
            mode,
            brightness,
            rng,
        }
    }

    pub fn pick(&mut self, used: &HashSet<Color>) -> Color {
        next_color(&self.palette, self.mode, self.brightness, used, &mut *self.rng)
    }

    /// Like [`Allocator::pick`], but palette entries must also pass `accept`.
    /// The jittered fallback is not checked against it.
    pub fn pick_where(&mut self, used: &HashSet<Color>, accept: impl Fn(Color) -> bool) -> Color {
        first_fit(&self.palette, self.mode, self.brightness, |c| {
            !used.contains(&c) && accept(c)
        })
        .unwrap_or_else(|| fallback_color(&self.palette, self.mode, self.brightness, &mut *self.rng))
    }
}

fn fallback_color<R: Rng + ?Sized>(
    palette: &Palette,
    mode: ThemeMode,
    brightness: f32,
    rng: &mut R,
) -> Color {
    let l = match mode {
        ThemeMode::Dark => FALLBACK_DARK_L,
        ThemeMode::Light => FALLBACK_LIGHT_L,
    };
    if palette.entries.is_empty() {
        return Color::from_hsl(0.0, 0.0, l, brightness);
    }
    let base = palette.entries[rng.gen_range(0..palette.entries.len())];
    let jitter = rng.gen_range(-FALLBACK_JITTER..=FALLBACK_JITTER);
    let hue = (i32::from(base.h) + jitter).rem_euclid(360);
    Color::from_hsl(hue as f32, base.s.into(), l, brightness)
}

/// Suggest a color from a keyword contained in the speaker's name, e.g.
/// "Red Knight" or "Bluebell". First keyword in table order wins.
pub fn suggest_by_name(name: &str) -> Option<Color> {
    let lower = name.to_lowercase();
    NAME_HUES
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|&(_, hue)| Color::from_hsl(hue.into(), SUGGEST_SATURATION, SUGGEST_LIGHTNESS, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::hue_distance;
    use crate::theme::palette;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn first_entry_lightened_in_dark_mode() {
        let p = palette("pastel");
        let base = p.entries[0];
        let color = next_color(&p, ThemeMode::Dark, 0.0, &HashSet::new(), &mut rng());
        let expected_l = (base.l + 15).min(85);
        assert_eq!(
            color,
            Color::from_hsl(base.h.into(), base.s.into(), expected_l.into(), 0.0)
        );
    }

    #[test]
    fn brightness_offset_shifts_allocated_lightness() {
        let p = palette("pastel");
        let base = p.entries[0];
        let plain = next_color(&p, ThemeMode::Dark, 0.0, &HashSet::new(), &mut rng());
        let brighter = next_color(&p, ThemeMode::Dark, 10.0, &HashSet::new(), &mut rng());
        let darker = next_color(&p, ThemeMode::Dark, -20.0, &HashSet::new(), &mut rng());

        let shifted_l = shift_lightness(base.l, ThemeMode::Dark);
        assert_eq!(
            brighter,
            Color::from_hsl(base.h.into(), base.s.into(), shifted_l.into(), 10.0)
        );
        assert_ne!(brighter, plain);
        assert!(brighter.to_hsl().l > plain.to_hsl().l);
        assert!(darker.to_hsl().l < plain.to_hsl().l);
    }

    #[test]
    fn pick_where_skips_rejected_entries() {
        let p = palette("pastel");
        let mut r = rng();
        let mut alloc = Allocator::new(p, ThemeMode::Dark, 0.0, &mut r);
        let first = alloc.pick(&HashSet::new());
        let other = alloc.pick_where(&HashSet::new(), |c| c != first);
        assert_ne!(other, first);
        assert_eq!(other, alloc.pick(&HashSet::from([first])));
    }

    #[test]
    fn light_mode_darkens_with_floor() {
        assert_eq!(shift_lightness(75, ThemeMode::Light), 60);
        assert_eq!(shift_lightness(40, ThemeMode::Light), 35);
        assert_eq!(shift_lightness(30, ThemeMode::Light), 35);
        assert_eq!(shift_lightness(80, ThemeMode::Dark), 85);
        assert_eq!(shift_lightness(50, ThemeMode::Dark), 65);
    }

    #[test]
    fn skips_used_colors() {
        let p = palette("neon");
        let mut used = HashSet::new();
        let first = next_color(&p, ThemeMode::Dark, 0.0, &used, &mut rng());
        used.insert(first);
        let second = next_color(&p, ThemeMode::Dark, 0.0, &used, &mut rng());
        assert_ne!(first, second);
    }

    #[test]
    fn exhausted_palette_falls_back_deterministically() {
        let p = palette("jade");
        let mut used = HashSet::new();
        for _ in 0..p.entries.len() {
            let c = next_color(&p, ThemeMode::Dark, 0.0, &used, &mut rng());
            assert!(used.insert(c), "palette walk returned a used color");
        }

        let a = next_color(&p, ThemeMode::Dark, 0.0, &used, &mut rng());
        let b = next_color(&p, ThemeMode::Dark, 0.0, &used, &mut rng());
        assert_eq!(a, b, "same seed should give the same fallback");

        let hsl = a.to_hsl();
        assert!((i16::from(hsl.l) - 75).abs() <= 1, "fallback lightness {}", hsl.l);
        assert!(
            p.entries.iter().any(|e| hue_distance(e.h, hsl.h) <= 33),
            "fallback hue {} too far from every base hue",
            hsl.h
        );
    }

    #[test]
    fn suggest_matches_keywords() {
        let red = suggest_by_name("The Red Knight").unwrap();
        assert_eq!(red.to_hsl().h, 0);
        let blue = suggest_by_name("BLUEBELL").unwrap();
        assert!(hue_distance(blue.to_hsl().h, 220) <= 1);
    }

    #[test]
    fn suggest_prefers_table_order() {
        // Both keywords appear; crimson comes first in the table.
        let c = suggest_by_name("Crimson Redcap").unwrap();
        assert!(hue_distance(c.to_hsl().h, 348) <= 1);
    }

    #[test]
    fn suggest_without_keyword_is_none() {
        assert_eq!(suggest_by_name("Alice"), None);
        assert_eq!(suggest_by_name(""), None);
    }
}
