use std::path::PathBuf;

use fabula_core::{Choice, Section, SectionRef, Story, StoryMeta};

pub fn run(name: &str) -> Result<(), String> {
    let path = PathBuf::from(format!("{name}.story.json"));
    if path.exists() {
        return Err(format!("'{}' already exists", path.display()));
    }

    let story = template_story(name);
    let json = story
        .to_json()
        .map_err(|e| format!("cannot serialize template: {e}"))?;
    std::fs::write(&path, json).map_err(|e| format!("cannot write {}: {e}", path.display()))?;

    println!("Created story '{name}' in {}", path.display());
    println!();
    println!("Get started:");
    println!("  fabula show {}    # Section overview", path.display());
    println!("  fabula play {}    # Play it", path.display());
    println!("  fabula check {}   # Validate the graph", path.display());

    Ok(())
}

/// A two-section starter with one choice, so `play` has something to do.
fn template_story(name: &str) -> Story {
    let mut story = Story::starter();
    story.meta = Some(StoryMeta {
        title: Some(name.to_string()),
        ..StoryMeta::default()
    });

    if let Some(first) = story.sections.get_mut("1") {
        first.text = Some(format!("Welcome to {name}. Your story begins here."));
        first.next.push(Choice {
            text: "Turn the page".to_string(),
            next: SectionRef::from("2"),
        });
    }
    story.sections.insert(
        "2".to_string(),
        Section {
            id: "2".to_string(),
            text: Some("And this is where it goes next.".to_string()),
            ..Section::default()
        },
    );
    story
}
