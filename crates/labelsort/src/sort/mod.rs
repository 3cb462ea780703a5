use crate::prelude::*;
use crate::prelude::{eprintln, println};
use labelsort_core::{assemble, build_hierarchy, PageRecord};

#[derive(Debug, clap::Parser)]
#[command(name = "sort")]
#[command(about = "Write one sorted PDF per courier and style")]
pub struct App {
    /// Path to the shipping-label PDF
    pub path: std::path::PathBuf,

    /// Directory where the sorted PDFs are written
    #[arg(short, long, default_value = "sorted")]
    pub out_dir: std::path::PathBuf,
}

pub fn run(app: App, global: crate::Global) -> Result<()> {
    let registry = global.build_registry()?;

    let bytes = std::fs::read(&app.path)?;
    let doc = pdf::LabelDocument::from_bytes(&bytes).map_err(|e| eyre!(e))?;
    println!("Total pages: {}", doc.page_count());

    let pages = read_pages(&doc)?;
    let (hierarchy, unparsed) = build_hierarchy(&registry, &pages);
    report_unparsed(&unparsed);

    let bundles = assemble(&hierarchy, &registry);
    if bundles.is_empty() {
        println!("No pages matched a known courier; nothing to write.");
        return Ok(());
    }

    for courier in registry.courier_order() {
        if hierarchy.courier(courier).is_none() {
            log::debug!("no pages found for {courier}");
        }
    }

    std::fs::create_dir_all(&app.out_dir)
        .wrap_err_with(|| f!("cannot create output directory {}", app.out_dir.display()))?;

    let mut table = new_table();
    table.add_row(prettytable::row!["Courier", "Style", "Pages", "File"]);
    for bundle in &bundles {
        let data = doc
            .select_pages(&bundle.ordered_positions)
            .map_err(|e| eyre!(e))?;
        let path = app.out_dir.join(bundle.output_filename());
        std::fs::write(&path, &data).wrap_err_with(|| f!("cannot write {}", path.display()))?;
        table.add_row(prettytable::row![
            bundle.courier,
            bundle.style,
            bundle.ordered_positions.len(),
            path.display()
        ]);
    }
    table.printstd();

    println!(
        "Wrote {} sorted PDFs to {}",
        bundles.len(),
        app.out_dir.display()
    );
    Ok(())
}

/// Extract every page's text, in position order.
pub(crate) fn read_pages(doc: &pdf::LabelDocument) -> Result<Vec<PageRecord>> {
    (0..doc.page_count())
        .map(|position| {
            let raw_text = doc.page_text(position).map_err(|e| eyre!(e))?;
            Ok(PageRecord::new(position, raw_text))
        })
        .collect()
}

/// Operator-visibility report: how many pages matched nothing on any axis,
/// with the first few positions as examples.
pub(crate) fn report_unparsed(unparsed: &[usize]) {
    if unparsed.is_empty() {
        return;
    }
    let examples: Vec<usize> = unparsed.iter().take(10).copied().collect();
    eprintln!(
        "{} pages could not be parsed (e.g. pages: {:?})",
        unparsed.len(),
        examples
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
