use anyhow::{Context, Result};
use storekit::{Locale, PackageId, StoreAdapter};

use crate::commands::format::print_info;

pub async fn run(
    adapter: &dyn StoreAdapter,
    package: &str,
    locale: &Locale,
    json: bool,
) -> Result<()> {
    let source = adapter.source();
    let info = adapter
        .fetch(&PackageId::new(package), locale)
        .await
        .with_context(|| format!("{} lookup failed for {package}", source.display_label()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        print_info(source, &info);
    }

    Ok(())
}
