use crate::output::Output;
use color_eyre::Result;
use dialoguer::{Confirm, Input, Password};

/// Prompt for a secret (masked input)
pub fn prompt_password(prompt: &str) -> Result<String> {
    Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read password: {}", e))
}

pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read confirmation: {}", e))
}

/// Prompt until a rating between 1 and 10 is entered
pub fn prompt_rating(prompt: &str, output: &Output) -> Result<u8> {
    loop {
        let input_str = Input::<String>::new()
            .with_prompt(prompt)
            .interact_text()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to read input: {}", e))?;

        match parse_rating(&input_str) {
            Some(rating) => return Ok(rating),
            None => output.error("Invalid input. Please enter a number from 1 to 10."),
        }
    }
}

pub fn parse_rating(input: &str) -> Option<u8> {
    input
        .trim()
        .parse::<u8>()
        .ok()
        .filter(|rating| (1..=10).contains(rating))
}
