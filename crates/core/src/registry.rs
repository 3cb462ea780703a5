use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("courier name must not be empty")]
    EmptyCourier,
    #[error("size token must not be empty")]
    EmptySize,
    #[error("canonical style name must not be empty")]
    EmptyStyleName,
    #[error("style group '{0}' has an empty keyword")]
    EmptyKeyword(String),
    #[error("style group '{0}' has no keywords")]
    NoKeywords(String),
    #[error("cannot compile matcher for '{keyword}': {source}")]
    BadPattern {
        keyword: String,
        source: regex::Error,
    },
    #[error("registry file parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// Keyword matching
// ---------------------------------------------------------------------------

/// A compiled occurrence matcher for one courier name, style keyword, or
/// size token.
///
/// Matching is case-insensitive. In whole-word mode an occurrence is
/// accepted only when the characters immediately before and after it are
/// absent or non-alphanumeric, so a short token never matches inside a
/// longer alphanumeric run such as a SKU code. Substring mode has no
/// boundary requirement at all.
#[derive(Debug)]
pub(crate) struct Matcher {
    pattern: Regex,
    whole_word: bool,
}

impl Matcher {
    fn compile(keyword: &str, whole_word: bool) -> Result<Self, RegistryError> {
        let pattern = RegexBuilder::new(&regex::escape(keyword))
            .case_insensitive(true)
            .build()
            .map_err(|source| RegistryError::BadPattern {
                keyword: keyword.to_string(),
                source,
            })?;
        Ok(Matcher {
            pattern,
            whole_word,
        })
    }

    pub(crate) fn is_match(&self, text: &str) -> bool {
        if !self.whole_word {
            return self.pattern.is_match(text);
        }
        // The regex crate has no lookaround, so boundary checking is
        // explicit: scan every candidate occurrence and accept the first one
        // whose neighbors are absent or non-alphanumeric.
        self.pattern.find_iter(text).any(|m| {
            let before = text[..m.start()].chars().next_back();
            let after = text[m.end()..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        })
    }
}

// ---------------------------------------------------------------------------
// Registry spec (plain data, serde-loadable)
// ---------------------------------------------------------------------------

/// Uncompiled registry tables.
///
/// This is the serde-facing shape: a TOML registry file deserializes into it
/// directly, with any omitted table falling back to the built-in default.
/// [`Registry::compile`] turns a spec into usable matchers.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrySpec {
    /// Courier names in priority order. The order is both the match
    /// precedence and the output ordering of sorted documents.
    #[serde(default = "default_couriers")]
    pub couriers: Vec<String>,
    /// Size tokens in shipment-priority order (smallest first).
    #[serde(default = "default_sizes")]
    pub sizes: Vec<String>,
    /// Style groups, checked in order; the first group with a matching
    /// keyword wins. Order the table from most-specific to least-specific:
    /// short generic keywords shadow longer ones placed after them.
    #[serde(default = "default_style_groups", rename = "style")]
    pub styles: Vec<StyleGroupSpec>,
}

/// One style group: any keyword maps the page to the canonical name.
#[derive(Debug, Clone, Deserialize)]
pub struct StyleGroupSpec {
    pub keywords: Vec<String>,
    pub name: String,
}

impl Default for RegistrySpec {
    fn default() -> Self {
        RegistrySpec {
            couriers: default_couriers(),
            sizes: default_sizes(),
            styles: default_style_groups(),
        }
    }
}

impl RegistrySpec {
    /// Parse a TOML registry file. Tables not present in the file keep
    /// their built-in defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, RegistryError> {
        Ok(toml::from_str(text)?)
    }

    /// Replace the style-group table with one single-keyword group per
    /// name, preserving the given order. Backs the comma-separated
    /// `--styles` shortcut for one-off sorts.
    pub fn override_styles<I>(&mut self, names: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.styles = names
            .into_iter()
            .map(|name| {
                let name = name.into();
                StyleGroupSpec {
                    keywords: vec![name.clone()],
                    name,
                }
            })
            .collect();
    }
}

fn default_couriers() -> Vec<String> {
    ["Shadowfax", "Xpress Bees", "Delhivery", "Valmo"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_sizes() -> Vec<String> {
    ["XS", "S", "M", "L", "XL", "XXL"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_style_groups() -> Vec<StyleGroupSpec> {
    // The generic "of" group must stay last: every group before it shadows
    // it on overlapping text.
    let groups: [(&[&str], &str); 6] = [
        (
            &["zeme-01", "zeme 01", "zeme01", "2-pc", "2 pc", "2pc", "2-pcs"],
            "Jumpsuit",
        ),
        (&["2-tape", "2 tape", "2-strip", "2 strip"], "Tape Pant"),
        (&["crop"], "Crop Hoodie"),
        (&["fruit"], "Fruit Dress"),
        (&["plain trouser", "plaintrouser"], "Plain Trouser"),
        (&["of"], "OF"),
    ];
    groups
        .into_iter()
        .map(|(keywords, name)| StyleGroupSpec {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            name: name.to_string(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Compiled registry
// ---------------------------------------------------------------------------

pub(crate) struct CourierPattern {
    pub(crate) name: String,
    pub(crate) matcher: Matcher,
}

pub(crate) struct SizePattern {
    pub(crate) token: String,
    pub(crate) matcher: Matcher,
}

pub(crate) struct StyleGroup {
    pub(crate) name: String,
    pub(crate) keywords: Vec<Matcher>,
}

/// The static pattern configuration consumed by the classifier: ordered
/// courier names, ordered size tokens, and ordered style groups, with
/// matchers compiled once at construction.
///
/// Compilation is the registry's only fallible operation; afterwards it is
/// immutable and offers read access only.
pub struct Registry {
    couriers: Vec<CourierPattern>,
    sizes: Vec<SizePattern>,
    groups: Vec<StyleGroup>,
}

impl Registry {
    /// Compile a spec into matchers, validating every table entry.
    pub fn compile(spec: RegistrySpec) -> Result<Self, RegistryError> {
        let mut couriers = Vec::with_capacity(spec.couriers.len());
        for name in spec.couriers {
            if name.trim().is_empty() {
                return Err(RegistryError::EmptyCourier);
            }
            // Couriers match as plain substrings, not whole words.
            let matcher = Matcher::compile(&name, false)?;
            couriers.push(CourierPattern { name, matcher });
        }

        let mut sizes = Vec::with_capacity(spec.sizes.len());
        for token in spec.sizes {
            if token.trim().is_empty() {
                return Err(RegistryError::EmptySize);
            }
            let matcher = Matcher::compile(&token, true)?;
            sizes.push(SizePattern { token, matcher });
        }

        let mut groups = Vec::with_capacity(spec.styles.len());
        for group in spec.styles {
            if group.name.trim().is_empty() {
                return Err(RegistryError::EmptyStyleName);
            }
            if group.keywords.is_empty() {
                return Err(RegistryError::NoKeywords(group.name));
            }
            let mut keywords = Vec::with_capacity(group.keywords.len());
            for keyword in &group.keywords {
                if keyword.trim().is_empty() {
                    return Err(RegistryError::EmptyKeyword(group.name.clone()));
                }
                keywords.push(Matcher::compile(keyword, true)?);
            }
            groups.push(StyleGroup {
                name: group.name,
                keywords,
            });
        }

        Ok(Registry {
            couriers,
            sizes,
            groups,
        })
    }

    /// Compile the built-in default tables.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::compile(RegistrySpec::default())
    }

    /// Courier names in priority order.
    pub fn courier_order(&self) -> impl Iterator<Item = &str> {
        self.couriers.iter().map(|c| c.name.as_str())
    }

    /// Size tokens in shipment-priority order, without the `NA` sentinel.
    pub fn size_order(&self) -> impl Iterator<Item = &str> {
        self.sizes.iter().map(|s| s.token.as_str())
    }

    pub(crate) fn couriers(&self) -> &[CourierPattern] {
        &self.couriers
    }

    pub(crate) fn sizes(&self) -> &[SizePattern] {
        &self.sizes
    }

    pub(crate) fn groups(&self) -> &[StyleGroup] {
        &self.groups
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
