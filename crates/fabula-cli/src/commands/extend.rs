use std::path::Path;

use fabula_core::validate_extension;

pub fn run(
    file: &Path,
    response: &Path,
    section: &str,
    output: Option<&Path>,
) -> Result<(), String> {
    let story = super::load_story(file)?;
    let raw = std::fs::read_to_string(response)
        .map_err(|e| format!("cannot read {}: {e}", response.display()))?;

    let merged = validate_extension(&story, &raw, section)
        .map_err(|e| format!("extension rejected: {e}"))?;

    let added = merged.sections.len() - story.sections.len();
    let json = merged.to_json().map_err(|e| e.to_string())?;
    super::write_or_print(&json, output)?;

    println!(
        "  Extension accepted: {added} new section{}, {} total",
        if added == 1 { "" } else { "s" },
        merged.sections.len()
    );
    Ok(())
}
