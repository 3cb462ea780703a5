use crate::classify::classify;
use crate::registry::Registry;

/// One input page: its stable 0-based position in the original document and
/// the plain text extracted from it. Immutable once created.
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub position: usize,
    pub raw_text: String,
}

impl PageRecord {
    pub fn new(position: usize, raw_text: impl Into<String>) -> Self {
        PageRecord {
            position,
            raw_text: raw_text.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Hierarchy
// ---------------------------------------------------------------------------

/// The three-level page index: courier -> style -> size -> ordered page
/// positions.
///
/// Every level preserves first-seen insertion order; a plain Vec of nodes
/// stands in for an order-preserving map, since lookups only happen over a
/// handful of entries. Every input position appears in exactly one leaf
/// list, in ascending position order.
#[derive(Debug, Default)]
pub struct Hierarchy {
    couriers: Vec<CourierNode>,
}

#[derive(Debug)]
pub struct CourierNode {
    name: String,
    styles: Vec<StyleNode>,
}

#[derive(Debug)]
pub struct StyleNode {
    name: String,
    sizes: Vec<SizeNode>,
}

#[derive(Debug)]
struct SizeNode {
    token: String,
    positions: Vec<usize>,
}

impl Hierarchy {
    /// Look up a courier's subtree by name.
    pub fn courier(&self, name: &str) -> Option<&CourierNode> {
        self.couriers.iter().find(|c| c.name == name)
    }

    /// All couriers with at least one page, in first-seen order.
    pub fn couriers(&self) -> &[CourierNode] {
        &self.couriers
    }

    pub fn is_empty(&self) -> bool {
        self.couriers.is_empty()
    }

    /// The leaf list at `[courier][style][size]`, created empty on first
    /// access. Intentionally crate-private: the hierarchy is read-only for
    /// consumers once built.
    pub(crate) fn leaf_mut(&mut self, courier: &str, style: &str, size: &str) -> &mut Vec<usize> {
        let ci = match self.couriers.iter().position(|c| c.name == courier) {
            Some(i) => i,
            None => {
                self.couriers.push(CourierNode {
                    name: courier.to_string(),
                    styles: Vec::new(),
                });
                self.couriers.len() - 1
            }
        };
        let styles = &mut self.couriers[ci].styles;
        let si = match styles.iter().position(|s| s.name == style) {
            Some(i) => i,
            None => {
                styles.push(StyleNode {
                    name: style.to_string(),
                    sizes: Vec::new(),
                });
                styles.len() - 1
            }
        };
        let sizes = &mut styles[si].sizes;
        let zi = match sizes.iter().position(|z| z.token == size) {
            Some(i) => i,
            None => {
                sizes.push(SizeNode {
                    token: size.to_string(),
                    positions: Vec::new(),
                });
                sizes.len() - 1
            }
        };
        &mut sizes[zi].positions
    }
}

impl CourierNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Styles under this courier, in first-seen order.
    pub fn styles(&self) -> &[StyleNode] {
        &self.styles
    }
}

impl StyleNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `(size token, positions)` pairs in first-seen order.
    pub fn sizes(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.sizes
            .iter()
            .map(|z| (z.token.as_str(), z.positions.as_slice()))
    }

    /// Positions recorded under the given size token, scan-ordered. Empty
    /// when the style has no pages of that size.
    pub fn positions_for(&self, size: &str) -> &[usize] {
        self.sizes
            .iter()
            .find(|z| z.token == size)
            .map(|z| z.positions.as_slice())
            .unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Classify every page and index its position under
/// `hierarchy[courier][style][size]`.
///
/// Pages must arrive in ascending position order; each leaf list then keeps
/// scan order. A page classified exactly `(UNKNOWN, "Other", NA)` is
/// additionally recorded in the returned unparsed list. No page is ever
/// dropped, and the builder is total over any finite page sequence,
/// including zero pages.
pub fn build_hierarchy(registry: &Registry, pages: &[PageRecord]) -> (Hierarchy, Vec<usize>) {
    let mut hierarchy = Hierarchy::default();
    let mut unparsed = Vec::new();

    for page in pages {
        let c = classify(registry, &page.raw_text);
        hierarchy
            .leaf_mut(&c.courier, &c.style, &c.size)
            .push(page.position);
        if c.is_unparsed() {
            unparsed.push(page.position);
        }
    }

    (hierarchy, unparsed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
