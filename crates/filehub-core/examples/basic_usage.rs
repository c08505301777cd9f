//! Basic usage example - index a directory and list what was catalogued

use filehub_core::{format_brief, FileHub, IndexMode, Requester, Result};

fn main() -> Result<()> {
    // Get path from args or use current directory
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./example-files".to_string());

    println!("Initializing FileHub with root: {}", path);

    let hub = FileHub::builder(&path).auto_create_dirs(true).build()?;

    let report = hub.index_directory(IndexMode::All, true)?;
    println!("Indexed {} new file(s)", report.added);

    let hits = hub.list(&Requester::anonymous(), "");
    if hits.is_empty() {
        println!("No files found in catalog.");
    } else {
        println!("Found {} files:", hits.len());
        for hit in hits {
            println!("  - {}", format_brief(&hit.entry));
        }
    }

    Ok(())
}
