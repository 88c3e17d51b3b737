use storekit::SourcePriority;

pub fn run(priority: &SourcePriority) {
    for (index, source) in priority.get_order().iter().enumerate() {
        println!("{:>2}. {:<12} {}", index + 1, source.name(), source.display_label());
    }
}
