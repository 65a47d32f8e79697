use crate::types::Result;
use dialoguer::Confirm;

/// Standardized yes/no prompt used by the interactive loop.
pub fn ask_confirmation(prompt: &str, default_yes: bool) -> Result<bool> {
    let choice = Confirm::new()
        .with_prompt(prompt)
        .default(default_yes)
        .show_default(true)
        .interact()?;
    Ok(choice)
}
