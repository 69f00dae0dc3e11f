use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

pub fn run(file: &Path) -> Result<(), String> {
    let story = super::load_story(file)?;

    let title = story
        .meta
        .as_ref()
        .and_then(|m| m.title.as_deref())
        .unwrap_or("(untitled)");
    println!("  {}", title.bold());
    if let Some(meta) = &story.meta {
        if let Some(author) = &meta.author {
            println!("  by {author}");
        }
        if let Some(year) = meta.year {
            println!("  year:    {year}");
        }
        if let Some(license) = &meta.license {
            println!("  license: {license}");
        }
    }
    if let Some(state) = &story.state {
        if let Some(current) = &state.current_section {
            println!(
                "  {} at section \"{current}\", {} variable(s), {} step(s) of history",
                "in progress:".dimmed(),
                state.variables.len(),
                state.history.len()
            );
        }
    }
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Text", "Choices", "Script", "Media"]);

    for (id, section) in &story.sections {
        let body = section.body();
        let text = if body.chars().count() > 60 {
            let head: String = body.chars().take(57).collect();
            format!("{head}...")
        } else if body.is_empty() {
            "—".to_string()
        } else {
            body
        };
        let media = section
            .media
            .as_ref()
            .map(|m| format!("{:?}", m.kind).to_lowercase())
            .unwrap_or_else(|| "—".to_string());
        table.add_row(vec![
            id.clone(),
            text,
            section.next.len().to_string(),
            section.script.len().to_string(),
            media,
        ]);
    }

    println!("{table}");
    println!();
    println!(
        "  {} sections, {} choices",
        story.sections.len(),
        story.choice_count()
    );

    Ok(())
}
