use storekit::SizeProbe;

use crate::commands::format::human_size;

pub async fn run(probe: &dyn SizeProbe, url: &str) {
    let size = probe.probe(url).await;
    if size < 0 {
        println!("unknown");
    } else {
        println!("{size} bytes ({})", human_size(size));
    }
}
