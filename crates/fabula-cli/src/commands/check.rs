use std::path::Path;

use colored::Colorize;
use fabula_core::Action;

pub fn run(file: &Path) -> Result<(), String> {
    let story = super::load_story(file)?;

    story.check_integrity().map_err(|e| e.to_string())?;

    let mut warnings = 0usize;
    for (id, section) in &story.sections {
        for (index, action) in section.script.iter().enumerate() {
            if let Action::Malformed { tag, .. } = action {
                warnings += 1;
                eprintln!(
                    "  {} section \"{id}\" script entry {index}: unknown or malformed action \"{tag}\"",
                    "warning:".yellow()
                );
            }
        }
    }

    println!("  All checks passed for '{}'.", file.display());
    println!(
        "  {} sections, {} choices",
        story.sections.len(),
        story.choice_count()
    );
    if warnings > 0 {
        println!(
            "  {warnings} malformed script action{} (skipped at play time)",
            if warnings == 1 { "" } else { "s" }
        );
    }

    Ok(())
}
