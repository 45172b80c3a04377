//! `lpvault generate`: print a random password.

use crate::errors::Result;
use crate::generator::{generate_password, GeneratorOptions};

/// Execute the `generate` command.
pub fn execute(options: &GeneratorOptions) -> Result<()> {
    let password = generate_password(options)?;
    println!("{}", password.as_str());
    Ok(())
}
