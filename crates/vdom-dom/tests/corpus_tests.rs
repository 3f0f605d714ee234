//! Corpus tests for parsing, mutation and rendering

use vdom_dom::{parse_html, Content, Dialect, NodeKind, Tree, Value};
use vdom_html::{escape, unescape, VOID_ELEMENTS};

/// Route library logs to the test harness; `RUST_LOG=trace` shows the
/// recovery paths taken on malformed input.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn round_trip(html: &str) -> String {
    init_tracing();
    let (tree, root) = parse_html(html);
    tree.render(root, Dialect::Html)
}

#[test]
fn test_canonical_markup_round_trips() {
    let inputs = [
        "<p>Hello</p>",
        "<div id=\"a\" class=\"b c\"><span>x</span> tail</div>",
        "<ul><li>One<ul><li>Nested</li></ul></li><li>Two</li></ul>",
        "<p>1 &lt; 2 &amp;&amp; 3 &gt; 2</p>",
        "<input type=\"checkbox\" checked><br><img src=\"a.png\" alt=\"\">",
        "<!DOCTYPE html><html><head><title>T</title></head><body><p>x</p></body></html>",
        "<style>a > b { color: red }</style><script>if (a < b) {}</script>",
        "plain text only",
    ];
    for html in inputs {
        assert_eq!(round_trip(html), html, "input {:?}", html);
    }
}

#[test]
fn test_render_is_idempotent() {
    let inputs = [
        "<b><i>bold italic</b></i>",
        "<div><p>Text",
        "<a href=x title='it'>q</a>",
        "<p>Let&#x27;s go &copy; &unknown;</p>",
        "<img src=x/><br /><hr/>",
        "a < b > c",
        "<DIV ClAsS=Foo>Mixed</div>",
    ];
    for html in inputs {
        let once = round_trip(html);
        assert_eq!(round_trip(&once), once, "input {:?}", html);
    }
}

#[test]
fn test_malformed_input_keeps_text() {
    init_tracing();
    for html in ["<", "<<", "<div<div", ">", ">div>div", "a <b c", "a < b"] {
        let (tree, root) = parse_html(html);
        assert_eq!(tree.text_content(root), html, "input {:?}", html);
    }
}

#[test]
fn test_void_elements_never_get_children() {
    let html: String = VOID_ELEMENTS
        .iter()
        .map(|tag| format!("<{tag}>text</{tag}>"))
        .collect();
    let (tree, root) = parse_html(&html);
    for tag in VOID_ELEMENTS {
        for el in tree.get_elements_by_tag_name(root, tag) {
            assert!(tree.children(el).is_empty(), "{tag} has children");
        }
    }
}

#[test]
fn test_parent_uniqueness_across_trees() {
    let mut tree = Tree::new();
    let a = tree.parse_html("<div id=a><p>1</p><p>2</p></div>");
    let b = tree.parse_html("<div id=b><span>3</span></div>");
    let div_a = tree.get_element_by_id(a, "a").unwrap();
    let div_b = tree.get_element_by_id(b, "b").unwrap();
    let ps = tree.get_elements_by_tag_name(a, "p");
    let span = tree.get_elements_by_tag_name(b, "span")[0];

    tree.append_child(div_b, ps.clone());
    tree.insert_before(div_a, span, None);
    tree.append_child(div_a, ps[1]);
    tree.insert_before(div_b, Content::Node(ps[1]), Some(ps[0]));

    let mut all = tree.flatten_nodes(a);
    all.extend(tree.flatten_nodes(b));
    for node in all {
        if let Some(parent) = tree.parent(node) {
            let occurrences = tree.children(parent).iter().filter(|&&c| c == node).count();
            assert_eq!(occurrences, 1);
        }
    }
    assert_eq!(tree.render(a, Dialect::Html), r#"<div id="a"><span>3</span></div>"#);
    assert_eq!(tree.render(b, Dialect::Html), r#"<div id="b"><p>2</p><p>1</p></div>"#);
}

#[test]
fn test_combinator_example() {
    let (tree, root) = parse_html("<div><p>a</p><span>b</span><div><p>c</p><span>d</span></div></div>");
    let ps = tree.get_elements_by_tag_name(root, "p");
    let (first_p, nested_p) = (ps[0], ps[1]);
    let outer = tree.children(root)[0];
    let inner = tree.element_children(outer)[2];

    assert!(tree.matches(first_p, "div > p").unwrap());
    // Deliberate departure from the listed example `match("div > p", nestedP) = false`:
    // the nested paragraph's parent is the inner div, so standard child-combinator
    // semantics match it. Anchoring at the outer div is what fails.
    assert!(tree.matches(nested_p, "div > p").unwrap());
    assert!(!tree.matches(nested_p, "div > div > div p").unwrap());
    assert!(tree.matches(nested_p, "div p").unwrap());
    assert!(tree.matches(nested_p, "div div > p").unwrap());
    assert!(tree.matches(inner, "span + div").unwrap());
    assert!(!tree.matches(inner, "p + div").unwrap());
    assert!(tree.matches(inner, "p ~ div").unwrap());
}

#[test]
fn test_escape_round_trip() {
    for s in ["<>&'\"", "a < b && c > d", "it's \"quoted\"", "&amp; literal"] {
        assert_eq!(unescape(&escape(s)), s);
    }
}

#[test]
fn test_xml_dialect() {
    let (tree, root) = parse_html("<p>a<br>b<span></span></p>");
    assert_eq!(tree.render(root, Dialect::Xml), "<p>a<br />b<span /></p>");
}

#[test]
fn test_constructed_markup() {
    let mut tree = Tree::new();
    let frag = tree.create_fragment();
    let link = tree.create_element_with(
        "a",
        vec![
            ("href", Value::from("/x?a=1&b=2")),
            ("className", Value::map(vec![("-active", true), ("hidden", false)])),
            ("disabled", Value::Bool(false)),
        ],
    );
    tree.append_child(link, "go");
    let markup = tree.create_markup("<!-- raw -->");
    tree.append_child(frag, vec![link, markup]);
    assert_eq!(
        tree.render(frag, Dialect::Html),
        r#"<a href="/x?a=1&amp;b=2" class="-active">go</a><!-- raw -->"#
    );
    assert!(matches!(tree.kind(markup), NodeKind::Text(t) if t.raw));
}

#[test]
fn test_clone_is_independent() {
    let (mut tree, root) = parse_html("<div class=x><p>a</p></div>");
    let div = tree.children(root)[0];
    let copy = tree.clone_node(div, true);
    tree.set_attribute(copy, "class", "y").unwrap();
    let p = tree.children(copy)[0];
    tree.set_text_content(p, "b");

    assert_eq!(tree.outer_html(div), r#"<div class="x"><p>a</p></div>"#);
    assert_eq!(tree.outer_html(copy), r#"<div class="y"><p>b</p></div>"#);
    let shallow = tree.clone_node(div, false);
    assert_eq!(tree.outer_html(shallow), r#"<div class="x"></div>"#);
}
