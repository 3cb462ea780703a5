use std::collections::HashSet;

use crate::classify::SIZE_NA;
use crate::hierarchy::Hierarchy;
use crate::registry::Registry;

/// The deduplicated, size-ordered page list destined for one output
/// document. Emitted only when it holds at least one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub courier: String,
    pub style: String,
    pub ordered_positions: Vec<usize>,
}

impl Bundle {
    /// Stable output name for the document this bundle becomes.
    ///
    /// Downstream consumers sort printed packages by filename, so the
    /// format is part of the external contract.
    pub fn output_filename(&self) -> String {
        format!("{}_{}.pdf", self.courier, self.style.replace(' ', "_"))
    }
}

/// Derive the output bundles from a built hierarchy.
///
/// Couriers are emitted in registry priority order -- never in hierarchy
/// insertion order, and never the `UNKNOWN` sentinel. Styles under a
/// courier follow first-seen order from hierarchy construction. Within a
/// bundle, positions concatenate per size token in registry order with `NA`
/// last, each size's list already scan-ordered.
///
/// A per-bundle seen set drops duplicate positions. In normal operation a
/// position cannot land under two sizes of one courier/style, since each
/// page has exactly one classification, but the assembler guards the
/// invariant itself instead of relying on upstream correctness.
pub fn assemble(hierarchy: &Hierarchy, registry: &Registry) -> Vec<Bundle> {
    let mut bundles = Vec::new();

    for courier in registry.courier_order() {
        let Some(node) = hierarchy.courier(courier) else {
            continue;
        };
        for style in node.styles() {
            let mut seen: HashSet<usize> = HashSet::new();
            let mut ordered = Vec::new();
            for size in registry.size_order().chain(std::iter::once(SIZE_NA)) {
                for &position in style.positions_for(size) {
                    if seen.insert(position) {
                        ordered.push(position);
                    }
                }
            }
            if ordered.is_empty() {
                continue;
            }
            bundles.push(Bundle {
                courier: courier.to_string(),
                style: style.name().to_string(),
                ordered_positions: ordered,
            });
        }
    }

    bundles
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
