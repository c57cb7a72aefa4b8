use std::collections::BTreeMap;

use crate::cli::ThemeMode;
use crate::registry::{Registry, Style};
use crate::settings::Settings;

/// Build the instruction handed to the prompt assembler.
///
/// Pure function of its inputs. Returns an empty string when the engine is
/// disabled.
pub fn build_instruction(registry: &Registry, settings: &Settings, mode: ThemeMode) -> String {
    if !settings.enabled {
        return String::new();
    }

    let mut lines = Vec::new();
    lines.push("[Dialogue colors]".to_string());

    let background = match mode {
        ThemeMode::Dark => "dark background: choose light, saturated colors",
        ThemeMode::Light => "light background: choose dark, saturated colors",
    };
    lines.push(format!("Text is shown on a {background}."));

    if settings.highlight_dialogue {
        lines.push(
            "Wrap each character's spoken dialogue, including the quotation marks, in \
             <font color=#RRGGBB>...</font> using that character's color."
                .to_string(),
        );
    }

    let symbols = settings.thought_symbols.trim();
    if !symbols.is_empty() {
        let markers: Vec<String> = symbols.chars().map(|c| format!("{c}...{c}")).collect();
        lines.push(format!(
            "Inner thoughts marked as {} use the thinking character's color too.",
            markers.join(" or ")
        ));
    }

    match (settings.disable_narration, settings.narrator_color) {
        (_, Some(color)) => lines.push(format!("Color narration with {color}.")),
        (true, None) => lines.push("Leave narration uncolored.".to_string()),
        (false, None) => {}
    }

    if settings.css_effects {
        lines.push(
            "CSS effects (text-shadow glow, letter-spacing) may be used for emphasis in \
             intense moments."
                .to_string(),
        );
    } else {
        lines.push("Do not use CSS effects; plain font colors only.".to_string());
    }

    if !registry.is_empty() {
        let known: Vec<String> = registry
            .iter()
            .map(|e| {
                let mut item = format!("{}={}", e.display_name, e.color);
                if e.style != Style::None {
                    item.push_str(&format!(" ({})", e.style.label()));
                }
                item
            })
            .collect();
        lines.push(format!("Known characters: {}.", known.join(", ")));

        let locked: Vec<&str> = registry
            .locked_entries()
            .into_iter()
            .map(|e| e.display_name.as_str())
            .collect();
        if !locked.is_empty() {
            lines.push(format!(
                "Never change the colors of: {}.",
                locked.join(", ")
            ));
        }

        let mut aliases: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for entry in registry.iter() {
            for alias in &entry.aliases {
                aliases
                    .entry(entry.display_name.as_str())
                    .or_default()
                    .push(alias.as_str());
            }
        }
        for (name, names) in aliases {
            lines.push(format!("{name} is also called {} (same color).", names.join(", ")));
        }
    }

    lines.push(
        "Give every new speaking character a distinct color. At the very end of each \
         response, list every character who spoke as [COLORS:Name=#RRGGBB,Name2=#RRGGBB]."
            .to_string(),
    );

    lines.join("\n")
}
