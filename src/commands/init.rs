use std::path::Path;

use anyhow::Result;

use crate::config::loader::write_starter_config;

pub fn init_config(path: &Path, force: bool) -> Result<()> {
    write_starter_config(path, force)?;
    println!("Created {}", path.display());
    Ok(())
}
