//! Comprehensive tests for locus-locator
//!
//! End-to-end capture, rendering, resolution, generalization, and
//! diagnosis flows over parsed documents.

use locus_dom::{DomTree, HtmlParser, NodeId, Point, Rect};
use locus_locator::{
    Directory, LocatorBuilder, diagnose, diagnose_path, generalize,
    generalize_path, generalize_selector, render_path, render_selector,
    render_shadow_path, render_shadow_selector, resolve_directory,
    resolve_path, resolve_selector, batch_capture, widen_selector,
};

fn find(tree: &DomTree, tag: &str, text: &str) -> NodeId {
    tree.descendant_elements(NodeId::ROOT)
        .into_iter()
        .find(|&n| tree.tag(n) == Some(tag) && tree.text_content(n) == text)
        .unwrap()
}

fn page() -> DomTree {
    HtmlParser::new().parse(
        r#"<div id="app">
            <nav class="topbar"><a href="/home">Home</a><a href="/docs">Docs</a></nav>
            <div class="list">
                <li>one</li><li>two</li><li>three</li><li>four</li><li>five</li>
            </div>
            <form><input type="text" placeholder="Search"></form>
        </div>"#,
    )
}

#[test]
fn test_capture_renders_and_resolves_back() {
    let t = page();
    let builder = LocatorBuilder::new(&t);
    for text in ["one", "three", "five"] {
        let node = find(&t, "li", text);
        let dir = builder.build(node, false).unwrap();

        let path = render_path(&dir);
        let hits = resolve_path(&t, &path, false).unwrap();
        assert!(hits.contains(&node), "{path} must find its own target");

        let hits = resolve_directory(&t, &dir, false).unwrap();
        assert!(hits.contains(&node));
    }
}

#[test]
fn test_rendered_path_is_reparse_stable() {
    let t = page();
    let node = find(&t, "a", "Docs");
    let dir = LocatorBuilder::new(&t).build(node, false).unwrap();
    let path = render_path(&dir);
    let reparsed = locus_locator::parse_path(&path).unwrap();
    assert_eq!(render_path(&reparsed), path);
}

#[test]
fn test_unique_id_keeps_chains_short() {
    let t = page();
    let node = find(&t, "li", "two");
    let dir = LocatorBuilder::new(&t).build(node, false).unwrap();
    assert_eq!(dir.entries[0].attr("id").unwrap().value, "app");
    assert!(render_path(&dir).starts_with("//div[@id=\"app\"]"));
}

#[test]
fn test_generalized_directory_matches_the_family() {
    let t = page();
    let builder = LocatorBuilder::new(&t);
    let a = builder.build(find(&t, "li", "two"), false).unwrap();
    let b = builder.build(find(&t, "li", "five"), false).unwrap();
    let family = generalize(&a, &b).expect("similar chains");

    let hits = resolve_directory(&t, &family, false).unwrap();
    assert_eq!(hits.len(), 5, "{}", render_path(&family));
    for text in ["one", "two", "three", "four", "five"] {
        assert!(hits.contains(&find(&t, "li", text)));
    }
}

#[test]
fn test_generalize_rejects_dissimilar_chains() {
    let t = page();
    let builder = LocatorBuilder::new(&t);
    let li = builder.build(find(&t, "li", "one"), false).unwrap();
    let link = builder.build(find(&t, "a", "Home"), false).unwrap();
    assert_eq!(generalize(&li, &link), None);
}

#[test]
fn test_selector_generalization_drops_nth() {
    let t = page();
    let general = generalize_selector(
        "div.list>li:nth-child(2)",
        "div.list>li:nth-child(5)",
    );
    assert_eq!(general, "div.list>li");
    let hits = resolve_selector(&t, &general, false).unwrap();
    assert_eq!(hits.len(), 5);
}

#[test]
fn test_path_generalization_drops_predicates() {
    let general = generalize_path(
        "//div[@id=\"app\"]/div[contains(@class, \"list\")]/li[position()=2]",
        "//div[@id=\"app\"]/div[contains(@class, \"list\")]/li[position()=5]",
    );
    assert_eq!(
        general,
        "//div[@id=\"app\"]/div[contains(@class, \"list\")]/li"
    );
}

#[test]
fn test_widen_selector_prefers_more_matches() {
    let t = page();
    let widened = widen_selector(&t, "div.list>li:nth-child(2)");
    assert_eq!(widened, "div.list>li");
    assert_eq!(resolve_selector(&t, &widened, false).unwrap().len(), 5);
}

#[test]
fn test_batch_capture_switches_to_src() {
    let t = HtmlParser::new().parse(
        r#"<div class="gallery">
            <img src="a.png"><img src="b.png"><img src="c.png">
        </div>"#,
    );
    let imgs = t
        .descendant_elements(NodeId::ROOT)
        .into_iter()
        .filter(|&n| t.tag(n) == Some("img"))
        .collect::<Vec<_>>();
    let dir = LocatorBuilder::new(&t).build(imgs[0], false).unwrap();
    let batch = batch_capture(&t, &dir).unwrap();
    assert_eq!(batch.source, locus_locator::ValueSource::Src);
    let values: Vec<&str> = batch.values.iter().map(|v| v.text.as_str()).collect();
    assert_eq!(values, vec!["a.png", "b.png", "c.png"]);
}

#[test]
fn test_diagnosis_is_monotonic() {
    let t = page();
    // every prefix the watcher reports as matched must itself resolve
    let r = diagnose_path(&t, "//div[@id=\"app\"]/div[contains(@class, \"list\")]/ol/li", false);
    assert!(!r.found);
    assert_eq!(r.failing_index, 3);
    let prefix = r.last_matched_prefix.unwrap();
    assert!(!resolve_path(&t, &prefix, false).unwrap().is_empty());
    assert!(r.last_matched_node.is_some());

    let ok = diagnose(&t, "//div[@id=\"app\"]/div[contains(@class, \"list\")]/li[position()=4]", false);
    assert!(ok.found);
    assert_eq!(ok.failing_index, 0);
}

#[test]
fn test_position_only_survives_class_churn() {
    let before = HtmlParser::new().parse(
        r#"<div id="app"><ul><li class="row">a</li><li class="row sel">b</li></ul></div>"#,
    );
    let node = find(&before, "li", "b");
    let dir = LocatorBuilder::new(&before).build(node, false).unwrap();

    // same structure, classes renamed wholesale
    let after = HtmlParser::new().parse(
        r#"<div id="app"><ul><li class="cell">a</li><li class="cell on">b</li></ul></div>"#,
    );
    let hits = resolve_directory(&after, &dir, true).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(after.text_content(hits[0]), "b");
}

#[test]
fn test_shadow_round_trip() {
    let mut t = page();
    let form = t
        .descendant_elements(NodeId::ROOT)
        .into_iter()
        .find(|&n| t.tag(n) == Some("form"))
        .unwrap();
    let shadow = t.attach_shadow(form);
    let btn = t.create_element("button");
    t.append_child(shadow, btn);
    let label = t.create_text("Go");
    t.append_child(btn, label);

    let builder = LocatorBuilder::new(&t);
    let outer = builder.build(form, false).unwrap();
    let inner = builder.build(btn, false).unwrap();

    let path = render_shadow_path(&[outer.clone(), inner.clone()]);
    let hits = resolve_path(&t, &path, false).unwrap();
    assert_eq!(hits, vec![btn], "{path}");

    let selector = render_shadow_selector(&[outer, inner]);
    let hits = resolve_selector(&t, &selector, false).unwrap();
    assert_eq!(hits, vec![btn], "{selector}");

    let r = diagnose(&t, &path, false);
    assert!(r.found);
    assert_eq!(r.last_matched_node, Some(btn));
}

#[test]
fn test_point_capture_crosses_shadow() {
    let mut t = page();
    let form = t
        .descendant_elements(NodeId::ROOT)
        .into_iter()
        .find(|&n| t.tag(n) == Some("form"))
        .unwrap();
    t.set_rect(form, Rect::from_xywh(0.0, 200.0, 400.0, 100.0));
    let shadow = t.attach_shadow(form);
    let btn = t.create_element("button");
    t.append_child(shadow, btn);
    t.set_rect(btn, Rect::from_xywh(10.0, 210.0, 80.0, 30.0));

    let hit = t.find_element_by_point(Point::new(20.0, 220.0)).unwrap();
    assert_eq!(hit.element, btn);
    let cap = LocatorBuilder::new(&t).build_deep(&hit, false).unwrap();
    assert_eq!(cap.fragments.len(), 2);
    assert_eq!(resolve_path(&t, &cap.path, false).unwrap(), vec![btn]);
    assert_eq!(resolve_selector(&t, &cap.selector, false).unwrap(), vec![btn]);
}

#[test]
fn test_directory_serialization_round_trip() {
    let t = page();
    let node = find(&t, "li", "four");
    let dir = LocatorBuilder::new(&t).build(node, false).unwrap();
    let json = serde_json::to_string(&dir).unwrap();
    let back: Directory = serde_json::from_str(&json).unwrap();
    assert_eq!(back, dir);
    assert_eq!(render_path(&back), render_path(&dir));
}
