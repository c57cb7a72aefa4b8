use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::style::{Color as TermColor, Stylize};
use tracing_subscriber::EnvFilter;

use dialogue_hues::cli::{Args, Command};
use dialogue_hues::color::Color;
use dialogue_hues::registry::Entry;
use dialogue_hues::store;
use dialogue_hues::Engine;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let path = args
        .state
        .clone()
        .unwrap_or_else(|| store::scope_path(&store::data_dir(), &args.scope));
    let mut engine = Engine::from_document(store::load_or_default(&path));
    engine.set_mode_hint(args.mode);

    let start = engine.revision();
    run(&mut engine, args.command)?;

    if engine.revision() != start {
        store::save(&engine.document(), &path)
            .with_context(|| format!("failed to save state to {}", path.display()))?;
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(engine: &mut Engine, command: Command) -> Result<()> {
    match command {
        Command::Scan { files, incremental } => {
            let mut messages = Vec::new();
            for file in &files {
                messages.extend(read_messages(file)?);
            }
            let report = if incremental {
                let last = messages.last().map(String::as_str).unwrap_or_default();
                engine.scan_message(last)
            } else {
                engine.full_scan(messages.iter().map(String::as_str))
            };
            println!(
                "{} block(s), {} new, {} updated, {} skipped pair(s)",
                report.blocks.len(),
                report.created.len(),
                report.updated.len(),
                report.skipped
            );
        }
        Command::Show { preview } => {
            for entry in engine.registry().iter() {
                if preview {
                    print_swatch(entry);
                } else {
                    print_entry(entry);
                }
            }
        }
        Command::Add { name, color } => match engine.add(&name, color) {
            Some(key) => print_key(engine, &key),
            None => eprintln!("speaker name must not be empty"),
        },
        Command::Recolor { name, color } => {
            report_noop(engine.recolor(&name, color), &name);
        }
        Command::Lock { name } => match engine.toggle_lock(&name) {
            Some(locked) => println!("{name}: {}", if locked { "locked" } else { "unlocked" }),
            None => eprintln!("no speaker named {name:?}"),
        },
        Command::Alias { name, alias } => {
            report_noop(engine.add_alias(&name, &alias), &name);
        }
        Command::Style { name } => match engine.cycle_style(&name) {
            Some(style) => println!("{name}: {}", style.label()),
            None => eprintln!("no speaker named {name:?}"),
        },
        Command::Swap { a, b } => {
            report_noop(engine.swap(&a, &b), &format!("{a} / {b}"));
        }
        Command::Remove { name } => {
            report_noop(engine.remove(&name), &name);
        }
        Command::Purge { locked, unlocked } => {
            let removed = engine.remove_by_lock(locked && !unlocked);
            println!("removed {removed} speaker(s)");
        }
        Command::Clear => {
            engine.clear();
        }
        Command::Conflicts { resolve } => {
            for c in engine.find_conflicts() {
                println!("{} ~ {}", c.a, c.b);
            }
            if resolve {
                let report = engine.auto_resolve();
                println!("recolored {}", report.resolved);
                for c in &report.unresolved {
                    println!("unresolved (both locked): {} ~ {}", c.a, c.b);
                }
            }
        }
        Command::Regenerate => {
            let visited = engine.regenerate_all();
            println!("regenerated {visited} speaker(s)");
        }
        Command::Suggest { name } => match engine.suggest(&name) {
            Some(color) => println!("{color}"),
            None => println!("no suggestion for {name:?}"),
        },
        Command::Prompt => println!("{}", engine.prompt()),
        Command::Export { path } => {
            store::save(&engine.document(), &path)
                .with_context(|| format!("failed to export to {}", path.display()))?;
        }
        Command::Import { path } => {
            let doc = store::load(&path)
                .with_context(|| format!("failed to import {}", path.display()))?;
            engine.replace_scope(doc);
        }
    }
    Ok(())
}

/// Split a transcript into messages on blank lines.
fn read_messages(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read transcript {}", path.display()))?;
    let mut messages = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                messages.push(std::mem::take(&mut current));
            }
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }
    if !current.is_empty() {
        messages.push(current);
    }
    Ok(messages)
}

fn report_noop(changed: bool, what: &str) {
    if !changed {
        eprintln!("nothing changed for {what}");
    }
}

fn print_key(engine: &Engine, key: &str) {
    if let Some(entry) = engine.registry().get(key) {
        print_entry(entry);
    }
}

fn describe(entry: &Entry) -> String {
    let mut line = format!(
        "{:<20} {} {:>4}x {}",
        entry.display_name,
        entry.color,
        entry.dialogue_count,
        entry.style.label()
    );
    if entry.locked {
        line.push_str(" locked");
    }
    if !entry.aliases.is_empty() {
        let aliases: Vec<&str> = entry.aliases.iter().map(String::as_str).collect();
        line.push_str(&format!(" aka {}", aliases.join(", ")));
    }
    line
}

fn print_entry(entry: &Entry) {
    println!("{}", describe(entry));
}

fn to_term(c: Color) -> TermColor {
    TermColor::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Black or white, whichever reads better on `c`.
fn contrast_fg(c: Color) -> TermColor {
    if c.relative_luminance() > 0.4 {
        TermColor::Black
    } else {
        TermColor::White
    }
}

fn print_swatch(entry: &Entry) {
    let swatch = format!(" {} ", entry.color)
        .with(contrast_fg(entry.color))
        .on(to_term(entry.color));
    println!("{swatch} {}", describe(entry).with(to_term(entry.color)));
}
