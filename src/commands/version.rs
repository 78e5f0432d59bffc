use anyhow::Result;

use crate::keyframes::STYLE_BLOCK_ID;

pub async fn handle_version() -> Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const NAME: &str = env!("CARGO_PKG_NAME");

    println!("{} v{}", NAME, VERSION);
    println!("Style block id: {}", STYLE_BLOCK_ID);
    if let Some(path) = crate::config::default_config_path() {
        let state = if path.exists() { "found" } else { "not present" };
        println!("Config: {} ({})", path.display(), state);
    }
    Ok(())
}
