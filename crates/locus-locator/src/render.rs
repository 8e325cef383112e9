//! Locator rendering
//!
//! Deterministic, re-parseable renderings of a [`Directory`]: a hierarchical
//! path expression and a selector string. Checked entries emit their tag
//! token plus a conjunction of checked attribute conditions; regex-kind
//! descriptors never render (they post-filter resolution instead).

use crate::directory::{AttrDescriptor, AttrKind, Directory};
use crate::SHADOW_MARKER;

/// Render the path-expression form.
///
/// Anchored at the root (`/html/...`) when the chain reaches the tree root,
/// otherwise search-anywhere (`//...`).
pub fn render_path(dir: &Directory) -> String {
    let body = dir
        .entries
        .iter()
        .map(|entry| {
            let conds: Vec<String> = entry
                .attrs
                .iter()
                .filter_map(condition)
                .collect();
            if conds.is_empty() {
                entry.tag_token().to_string()
            } else {
                format!("{}[{}]", entry.tag_token(), conds.join(" and "))
            }
        })
        .collect::<Vec<_>>()
        .join("/");
    if body.starts_with("html") {
        format!("/{body}")
    } else {
        format!("//{body}")
    }
}

fn condition(attr: &AttrDescriptor) -> Option<String> {
    if !attr.checked || attr.value.is_empty() || attr.kind == AttrKind::Regex {
        return None;
    }
    let v = &attr.value;
    let cond = match attr.name.as_str() {
        "index" => format!("position()={v}"),
        "text" | "innertext" => {
            if attr.kind == AttrKind::Contains {
                format!("contains(., \"{v}\")")
            } else {
                text_condition(v)
            }
        }
        name => {
            if attr.kind == AttrKind::Contains {
                format!("contains(@{name}, \"{v}\")")
            } else {
                format!("@{name}=\"{v}\"")
            }
        }
    };
    Some(cond)
}

/// Equality against text, splicing embedded double quotes through concat()
fn text_condition(value: &str) -> String {
    if !value.contains('"') {
        return format!("text()=\"{value}\"");
    }
    let parts: Vec<&str> = value.split('"').collect();
    let mut pieces = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        pieces.push(format!("\"{part}\""));
        if i < parts.len() - 1 {
            pieces.push("'\"'".to_string());
        }
    }
    format!("text()=concat({})", pieces.join(", "))
}

/// Render the selector-string form.
///
/// Per level: id shortcut, tag+class, or tag+nth-of-type, with the same
/// unique-id short-circuit the path form has (the chain simply starts at
/// the anchored level).
pub fn render_selector(dir: &Directory) -> String {
    dir.entries
        .iter()
        .map(|entry| {
            let tag = entry.tag_token();
            if let Some(id) = entry.attr("id").filter(|a| a.checked && !a.value.is_empty()) {
                return format!("#{}", id.value);
            }
            if let Some(class) = entry
                .attr("class")
                .filter(|a| a.checked && !a.value.is_empty())
            {
                return format!("{tag}.{}", class.value);
            }
            if let Some(index) = entry
                .attr("index")
                .filter(|a| a.checked && !a.value.is_empty())
            {
                return format!("{tag}:nth-of-type({})", index.value);
            }
            tag.to_string()
        })
        .collect::<Vec<_>>()
        .join(">")
}

/// Join per-fragment path renderings across shadow boundaries
pub fn render_shadow_path(fragments: &[Directory]) -> String {
    fragments
        .iter()
        .map(render_path)
        .collect::<Vec<_>>()
        .join(&format!("/{SHADOW_MARKER}"))
}

/// Join per-fragment selector renderings across shadow boundaries
pub fn render_shadow_selector(fragments: &[Directory]) -> String {
    fragments
        .iter()
        .map(render_selector)
        .collect::<Vec<_>>()
        .join(&format!(">{SHADOW_MARKER}>"))
}

/// Keep only position and id conditions (structural skeleton of a locator)
pub fn only_position(dir: &Directory) -> Directory {
    let mut out = dir.clone();
    for entry in out.entries.iter_mut() {
        for attr in entry.attrs.iter_mut() {
            attr.checked =
                (attr.name == "index" || attr.name == "id") && !attr.value.trim().is_empty();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::DirectoryEntry;

    fn entry(tag: &str, attrs: Vec<AttrDescriptor>) -> DirectoryEntry {
        let mut e = DirectoryEntry::new(tag);
        e.attrs = attrs;
        e
    }

    #[test]
    fn test_render_anchored_vs_anywhere() {
        let d = Directory::new(vec![entry("html", vec![]), entry("body", vec![])]);
        assert_eq!(render_path(&d), "/html/body");
        let d = Directory::new(vec![entry("div", vec![])]);
        assert_eq!(render_path(&d), "//div");
    }

    #[test]
    fn test_render_conditions() {
        let d = Directory::new(vec![
            entry("div", vec![AttrDescriptor::exact("id", "root", true)]),
            entry(
                "li",
                vec![
                    AttrDescriptor::exact("index", "2", true),
                    AttrDescriptor::contains("class", "row", true),
                ],
            ),
        ]);
        assert_eq!(
            render_path(&d),
            "//div[@id=\"root\"]/li[position()=2 and contains(@class, \"row\")]"
        );
    }

    #[test]
    fn test_unchecked_and_regex_attrs_do_not_render() {
        let d = Directory::new(vec![entry(
            "div",
            vec![
                AttrDescriptor::exact("title", "x", false),
                AttrDescriptor::new("class", "ro.*", true, AttrKind::Regex),
            ],
        )]);
        assert_eq!(render_path(&d), "//div");
    }

    #[test]
    fn test_wildcard_entry() {
        let mut e = entry("td", vec![AttrDescriptor::exact("index", "3", true)]);
        e.checked = false;
        let d = Directory::new(vec![e]);
        assert_eq!(render_path(&d), "//*[position()=3]");
    }

    #[test]
    fn test_text_condition_with_quotes() {
        assert_eq!(text_condition("plain"), "text()=\"plain\"");
        assert_eq!(
            text_condition("a\"b"),
            "text()=concat(\"a\", '\"', \"b\")"
        );
    }

    #[test]
    fn test_render_selector_levels() {
        let d = Directory::new(vec![
            entry("div", vec![AttrDescriptor::exact("id", "root", true)]),
            entry("ul", vec![AttrDescriptor::contains("class", "list", true)]),
            entry("li", vec![AttrDescriptor::exact("index", "2", true)]),
        ]);
        assert_eq!(render_selector(&d), "#root>ul.list>li:nth-of-type(2)");
    }

    #[test]
    fn test_only_position_strips_everything_else() {
        let d = Directory::new(vec![entry(
            "li",
            vec![
                AttrDescriptor::exact("index", "2", true),
                AttrDescriptor::contains("class", "row", true),
                AttrDescriptor::contains("text", "hi", true),
            ],
        )]);
        assert_eq!(render_path(&only_position(&d)), "//li[position()=2]");
    }

    #[test]
    fn test_shadow_join() {
        let outer = Directory::new(vec![entry("my-widget", vec![])]);
        let inner = Directory::new(vec![entry("button", vec![])]);
        assert_eq!(
            render_shadow_path(&[outer.clone(), inner.clone()]),
            "//my-widget/$shadow$//button"
        );
        assert_eq!(
            render_shadow_selector(&[outer, inner]),
            "my-widget>$shadow$>button"
        );
    }
}
