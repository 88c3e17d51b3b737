use anyhow::Result;
use storekit::{LinkResolver, PackageId};

use crate::commands::format::print_link;

pub async fn run(resolver: &LinkResolver, package: &str, json: bool) -> Result<()> {
    let link = resolver.resolve(&PackageId::new(package)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&link)?);
    } else {
        print_link(&link);
    }

    Ok(())
}
