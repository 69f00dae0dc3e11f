use std::io::{BufRead, Write};
use std::path::Path;

use colored::Colorize;
use fabula_core::{Phase, Player, PromptSource};

/// Prompt source backed by stdin, used for `INPUT` script actions.
struct StdinPrompt;

impl PromptSource for StdinPrompt {
    fn prompt(&mut self, message: &str) -> Option<String> {
        print!("  {} ", message.bold());
        std::io::stdout().flush().ok()?;
        read_line().map(|line| line.trim().to_string())
    }
}

fn read_line() -> Option<String> {
    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(0) => None, // EOF
        Ok(_) => Some(line),
        Err(_) => None,
    }
}

pub fn run(file: &Path) -> Result<(), String> {
    let story = super::load_story(file)?;
    let mut player = Player::new();
    let mut prompts = StdinPrompt;

    if player.load_story(story) == Phase::Menu {
        return Err(format!("{}: story has no sections", file.display()));
    }

    // Re-enter the starting section (without a history push) so its entry
    // script runs before the first render.
    if let Some(start) = player
        .story()
        .and_then(|s| s.current_section_id())
        .map(String::from)
    {
        player
            .load_section(&start, false, &mut prompts)
            .map_err(|e| e.to_string())?;
    }

    println!("  (enter a choice number, 'back', or 'quit')");

    loop {
        render(&mut player);

        if player.choices().is_empty() {
            println!("  {}", "The end.".bold());
            return Ok(());
        }

        print!("> ");
        std::io::stdout().flush().ok();
        let Some(line) = read_line() else {
            return Ok(());
        };
        let input = line.trim();

        match input {
            "q" | "quit" => return Ok(()),
            "b" | "back" => match player.one_step_back(&mut prompts) {
                Ok(true) => {}
                Ok(false) => println!("  Nothing to go back to."),
                Err(e) => println!("  {e}"),
            },
            "" => {
                // Bare return follows a single choice.
                match player.one_step_forward(&mut prompts) {
                    Ok(true) => {}
                    Ok(false) => println!("  Pick a choice by number."),
                    Err(e) => println!("  {e}"),
                }
            }
            _ => match input.parse::<usize>() {
                Ok(n) if n >= 1 => {
                    if let Err(e) = player.choose(n - 1, &mut prompts) {
                        println!("  {e}");
                    }
                }
                _ => println!("  Unknown input '{input}'."),
            },
        }
    }
}

fn render(player: &mut Player) {
    println!();
    if let Some(section) = player.current_section() {
        println!("  {}", format!("— {} —", section.id).dimmed());
        if let Some(media) = &section.media {
            println!("  {}", format!("[{:?}: {}]", media.kind, media.src).dimmed());
        }
    }

    let text = player.current_text();
    for line in text.lines() {
        println!("  {line}");
    }
    if !text.is_empty() {
        println!();
    }

    for diagnostic in player.take_diagnostics() {
        eprintln!("  {}", format!("script: {diagnostic}").dimmed());
    }

    for (i, choice) in player.choices().iter().enumerate() {
        let label = if choice.text.is_empty() {
            "(continue)"
        } else {
            choice.text.as_str()
        };
        println!("  [{}] {label}", i + 1);
    }
}
