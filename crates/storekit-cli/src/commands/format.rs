use storekit::{ResolvedLink, Source, SourceInfo};

const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

pub fn print_link(link: &ResolvedLink) {
    println!("Package:      {}", link.package_id);
    if !link.title.is_empty() {
        println!("Title:        {}", link.title);
    }
    println!("Source:       {} ({})", link.source, link.source.display_label());
    println!("Version:      {}", version_label(&link.version, &link.version_code));
    if link.has_known_size() {
        println!("Size:         {}", human_size(link.file_size));
    }
    println!("Download:     {}", or_dash(&link.download_url));
}

pub fn print_info(source: Source, info: &SourceInfo) {
    println!("Source:       {}", source.display_label());
    println!("Package:      {}", or_dash(&info.package_id));
    println!("Title:        {}", or_dash(&info.title));
    println!("Version:      {}", version_label(&info.version, &info.version_code));
    if !info.signature.is_empty() {
        println!("Signature:    {}", info.signature);
    }
    if !info.page_url.is_empty() {
        println!("Page:         {}", info.page_url);
    }
    println!("Download:     {}", or_dash(&info.download_url));
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}

fn version_label(version: &str, code: &str) -> String {
    match (version.is_empty(), code.is_empty()) {
        (true, true) => "-".to_owned(),
        (false, true) => version.to_owned(),
        (true, false) => format!("({code})"),
        (false, false) => format!("{version} ({code})"),
    }
}

/// Bytes in binary units, or "unknown" for negative sizes.
pub fn human_size(bytes: i64) -> String {
    if bytes < 0 {
        return "unknown".to_owned();
    }
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
