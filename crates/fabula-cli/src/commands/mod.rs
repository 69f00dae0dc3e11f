pub mod check;
pub mod export;
pub mod extend;
pub mod init;
pub mod play;
pub mod show;

use std::path::Path;

use fabula_core::Story;

/// Load a story file, mapping I/O and parse failures to user-facing text.
fn load_story(path: &Path) -> Result<Story, String> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    Story::from_json(&json).map_err(|e| format!("{}: {e}", path.display()))
}

/// Write content to a file, or print it when no path is given.
fn write_or_print(content: &str, output: Option<&Path>) -> Result<(), String> {
    if let Some(path) = output {
        std::fs::write(path, content)
            .map_err(|e| format!("cannot write to {}: {e}", path.display()))?;
        println!("  Written to {}", path.display());
    } else {
        print!("{content}");
    }
    Ok(())
}
