use std::path::Path;

use fabula_core::{linearize, markdown_from_section_id_list};

pub fn run(
    file: &Path,
    from: Option<&str>,
    to: &str,
    via: &[String],
    output: Option<&Path>,
) -> Result<(), String> {
    let story = super::load_story(file)?;

    let start = match from {
        Some(id) => id.to_string(),
        None => story
            .first_section_id()
            .map(String::from)
            .ok_or_else(|| "story has no sections".to_string())?,
    };

    let path = linearize(&story, &start, to, via).ok_or_else(|| {
        format!(
            "no linear path from \"{start}\" to \"{to}\"{}",
            if via.is_empty() {
                String::new()
            } else {
                format!(" via {}", via.join(", "))
            }
        )
    })?;

    let markdown = markdown_from_section_id_list(&path, &story);
    super::write_or_print(&markdown, output)?;

    if output.is_some() {
        println!("  Path: {}", path.join(" -> "));
    }
    Ok(())
}
