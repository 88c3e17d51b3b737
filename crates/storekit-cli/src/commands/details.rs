use anyhow::{Context, Result};
use storekit::{Locale, PackageId};
use storekit_stores::GooglePlayAdapter;

pub async fn run(adapter: &GooglePlayAdapter, package: &str, locale: &Locale) -> Result<()> {
    let app = adapter
        .details(&PackageId::new(package), locale)
        .await
        .with_context(|| format!("Google Play details failed for {package}"))?;

    println!("{}", serde_json::to_string_pretty(&app)?);
    Ok(())
}
