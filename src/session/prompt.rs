use dialoguer::Input;

use crate::ui::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    Local,
    Online,
    Dual,
    Resume,
    Exit,
    Invalid(String),
}

impl MenuChoice {
    /// Menu entries with the answer that selects each one.
    pub const ENTRIES: [(&'static str, &'static str); 5] = [
        ("1", "Local images (pick files and copy them to session_images/)"),
        ("2", "Online images (download themed images)"),
        ("3", "Dual mode (local pick + online download)"),
        ("4", "Resume last session"),
        ("0", "Exit"),
    ];

    /// Parse the numeric menu answer (`1`-`4`, `0` to exit).
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "1" => MenuChoice::Local,
            "2" => MenuChoice::Online,
            "3" => MenuChoice::Dual,
            "4" => MenuChoice::Resume,
            "0" => MenuChoice::Exit,
            other => MenuChoice::Invalid(other.to_string()),
        }
    }
}

/// Integer answer, or `default` for empty or non-numeric input.
pub fn parse_int(input: &str, default: u64) -> u64 {
    let input = input.trim();
    if input.is_empty() {
        return default;
    }
    input.parse().unwrap_or(default)
}

/// Yes/no answer, or `default` for anything that is neither.
pub fn parse_yes_no(input: &str, default: bool) -> bool {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default,
    }
}

/// Interactive questions asked while preparing a session.
pub trait Prompter: Send + Sync {
    fn menu(&self) -> MenuChoice;

    /// Free text answer; `default` when the user just presses enter.
    fn ask(&self, prompt: &str, default: &str) -> String;

    fn ask_int(&self, prompt: &str, default: u64) -> u64 {
        parse_int(&self.ask(prompt, &default.to_string()), default)
    }

    fn ask_yes_no(&self, prompt: &str, default: bool) -> bool {
        let hint = if default { "y" } else { "n" };
        parse_yes_no(&self.ask(&format!("{} (y/n)", prompt), hint), default)
    }
}

pub struct ConsolePrompter;

impl Prompter for ConsolePrompter {
    fn menu(&self) -> MenuChoice {
        separator();
        for (key, label) in MenuChoice::ENTRIES {
            emit(Level::Info, "menu.entry", &format!("{}) {}", key, label), None);
        }
        match Input::<String>::new()
            .with_prompt("Choose")
            .allow_empty(true)
            .interact_text()
        {
            Ok(answer) => MenuChoice::parse(&answer),
            Err(e) => {
                emit(
                    Level::Error,
                    "prompt.menu_failed",
                    &format!("Could not read menu selection: {}", e),
                    None,
                );
                MenuChoice::Exit
            }
        }
    }

    fn ask(&self, prompt: &str, default: &str) -> String {
        Input::<String>::new()
            .with_prompt(prompt)
            .default(default.to_string())
            .allow_empty(true)
            .interact_text()
            .unwrap_or_else(|_| default.to_string())
    }
}
