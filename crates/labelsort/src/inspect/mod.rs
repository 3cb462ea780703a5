use crate::prelude::*;
use crate::prelude::println;
use labelsort_core::{build_hierarchy, UNKNOWN_COURIER};

#[derive(Debug, clap::Parser)]
#[command(name = "inspect")]
#[command(about = "Preview the classification without writing any files")]
pub struct App {
    /// Path to the shipping-label PDF
    pub path: std::path::PathBuf,
}

pub fn run(app: App, global: crate::Global) -> Result<()> {
    let registry = global.build_registry()?;

    let bytes = std::fs::read(&app.path)?;
    let doc = pdf::LabelDocument::from_bytes(&bytes).map_err(|e| eyre!(e))?;
    println!("Total pages: {}", doc.page_count());

    let pages = crate::sort::read_pages(&doc)?;
    let (hierarchy, unparsed) = build_hierarchy(&registry, &pages);

    if hierarchy.is_empty() {
        println!("Document has no pages.");
        return Ok(());
    }

    // Known couriers in priority order, then whatever fell through.
    let mut table = new_table();
    table.add_row(prettytable::row!["Courier", "Style", "Size", "Pages"]);
    for courier in registry.courier_order().chain([UNKNOWN_COURIER]) {
        let Some(node) = hierarchy.courier(courier) else {
            continue;
        };
        for style in node.styles() {
            for (size, positions) in style.sizes() {
                table.add_row(prettytable::row![
                    courier,
                    style.name(),
                    size,
                    positions.len()
                ]);
            }
        }
    }
    table.printstd();

    crate::sort::report_unparsed(&unparsed);
    Ok(())
}
