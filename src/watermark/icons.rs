//! Icon catalog.
//!
//! Icons are glyphs in an icon font, referenced by class, codepoint and name.
//! The catalog is read from the icon font's stylesheet, where every icon is a
//! `.fa-<name>::before { content: "\<hex>" }` rule.

use super::fonts::FontStyle;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const ICON_FAMILY_SOLID: &str = "Font Awesome 7 Free";
pub const ICON_FAMILY_BRANDS: &str = "Font Awesome 7 Brands";

/// Reference to one glyph in the icon catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IconRef {
    /// Style and name classes, e.g. `fa-solid fa-copyright`
    pub class: String,
    /// The glyph as a string (usually a single private-use codepoint)
    pub unicode: String,
    pub name: String,
}

impl Default for IconRef {
    fn default() -> Self {
        Self {
            class: "fa-solid fa-copyright".to_string(),
            unicode: "\u{a9}".to_string(),
            name: "copyright".to_string(),
        }
    }
}

impl IconRef {
    /// Font family and weight that carry this icon's glyph.
    pub fn font_style(&self, size: f32) -> FontStyle {
        let (family, weight) = if self.class.contains("fa-brands") {
            (ICON_FAMILY_BRANDS, 400)
        } else if self.class.contains("fa-regular") {
            (ICON_FAMILY_SOLID, 400)
        } else {
            (ICON_FAMILY_SOLID, 900)
        };
        FontStyle {
            family: family.to_string(),
            size,
            weight,
            italic: false,
        }
    }
}

/// Parse icon entries out of an icon-font stylesheet.
///
/// Returns entries deduplicated by class and sorted by name. Rules that are
/// not `::before` content rules on `.fa-*` selectors are ignored.
pub fn parse_icon_catalog(css: &str) -> Vec<IconRef> {
    let rule = match Regex::new(r#"([^{}]+?)\s*\{\s*content:\s*"\\([a-fA-F0-9]+)""#) {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };

    let mut seen = HashSet::new();
    let mut icons = Vec::new();

    for caps in rule.captures_iter(css) {
        let selectors = &caps[1];
        if !selectors.contains("::before") {
            continue;
        }
        let Some(glyph) = u32::from_str_radix(&caps[2], 16)
            .ok()
            .and_then(char::from_u32)
        else {
            continue;
        };

        for selector in selectors.split(',').map(str::trim) {
            if !selector.starts_with(".fa-") {
                continue;
            }
            let Some(name_part) = selector.rsplit(".fa-").next() else {
                continue;
            };
            let name = name_part.split("::").next().unwrap_or_default().trim();
            if name.is_empty() {
                continue;
            }

            let style = if selector.contains(".fa-brands") {
                "brands"
            } else if selector.contains(".fa-regular") {
                "regular"
            } else {
                "solid"
            };
            let class = format!("fa-{} fa-{}", style, name);

            if seen.insert(class.clone()) {
                icons.push(IconRef {
                    class,
                    unicode: glyph.to_string(),
                    name: name.to_string(),
                });
            }
        }
    }

    icons.sort_by(|a, b| a.name.cmp(&b.name));
    icons
}

/// Case-insensitive substring filter on icon names.
pub fn filter_icons<'a>(catalog: &'a [IconRef], query: &str) -> Vec<&'a IconRef> {
    let query = query.to_lowercase();
    catalog
        .iter()
        .filter(|icon| icon.name.to_lowercase().contains(&query))
        .collect()
}
