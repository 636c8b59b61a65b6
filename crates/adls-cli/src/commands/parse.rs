//! Parse command - Show URI resolution

use adls_core::parse_abfss_uri;
use anyhow::Result;
use colored::Colorize;

pub fn run(uri: &str) -> Result<()> {
    let location = parse_abfss_uri(uri)?;

    println!("{} {}", "Filesystem:".cyan(), location.filesystem);
    println!("{} {}", "Account:   ".cyan(), location.account);
    println!("{} {}", "Endpoint:  ".cyan(), location.account_url());
    let base = if location.base_path.is_empty() {
        "(filesystem root)".dimmed().to_string()
    } else {
        location.base_path.clone()
    };
    println!("{} {}", "Base path: ".cyan(), base);

    Ok(())
}
