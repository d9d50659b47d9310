use crate::add::add;
use crate::category::Category;
use crate::config::Config;
use anyhow::{Context, Result};

/// Creates a new category, then lets the user fill it.
pub fn init(config: &Config, name: &str) -> Result<()> {
    let category = Category::create(&config.root, name).with_context(|| {
        format!(
            "Cannot create category {:?}. Use `cardbox add` to add new cards. Aborting.",
            name
        )
    })?;
    println!(
        "Created new category {:?} in {:?}\n",
        category.name(),
        config.root
    );
    add(config, name)
}
