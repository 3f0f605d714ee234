//! Subcommand implementations.
//!
//! Each command takes the input markup and returns the text to print, so
//! they can be exercised without touching stdin or the filesystem.

use std::io::Read;
use std::path::Path;

use tracing::{debug, info};
use vdom_common::{OptionExt, Result, ResultExt, VdomError};
use vdom_dom::{Dialect, ParseOptions, Tree};

/// Read a file, or stdin when `path` is `-`.
pub fn read_input(path: &Path) -> Result<String> {
    let bytes = if path.as_os_str() == "-" {
        let mut input = Vec::new();
        std::io::stdin().read_to_end(&mut input)?;
        input
    } else {
        std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => VdomError::NotFound(path.display().to_string()),
            _ => VdomError::Io(e),
        })?
    };
    decode_input(path, bytes)
}

/// Markup must be UTF-8 text.
fn decode_input(path: &Path, bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| {
        VdomError::markup_with_source(format!("{} is not valid UTF-8", path.display()), e)
    })
}

fn parse(html: &str, strip_whitespace: bool) -> (Tree, vdom_dom::NodeId) {
    let mut tree = Tree::new();
    let options = ParseOptions {
        ignore_whitespace_text: strip_whitespace,
        ..Default::default()
    };
    let root = tree.parse_html_with(html, options);
    debug!(nodes = tree.len(), "input parsed");
    (tree, root)
}

/// Options for [`render`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub xml: bool,
    pub tidy: bool,
    pub strip_whitespace: bool,
}

/// Parse and serialize `html` again.
pub fn render(html: &str, options: RenderOptions) -> Result<String> {
    let (mut tree, root) = parse(html, options.strip_whitespace);
    if options.tidy {
        tree.tidy(root).selector_context("tidy failed")?;
    }
    let dialect = if options.xml { Dialect::Xml } else { Dialect::Html };
    Ok(tree.render(root, dialect))
}

/// What [`query`] prints for each match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutput {
    Html,
    Text,
    Attribute(String),
    Count,
}

/// Print the elements under the root that match `selector`, one per line.
pub fn query(html: &str, selector: &str, output: &QueryOutput) -> Result<String> {
    let (tree, root) = parse(html, false);
    let matches = tree
        .query_selector_all(root, selector)
        .selector_context(format!("cannot compile `{selector}`"))?;
    info!(selector = %selector, matches = matches.len(), "query finished");

    let lines: Vec<String> = match output {
        QueryOutput::Count => vec![matches.len().to_string()],
        QueryOutput::Html => matches.iter().map(|&el| tree.outer_html(el)).collect(),
        QueryOutput::Text => matches.iter().map(|&el| tree.text_content(el)).collect(),
        QueryOutput::Attribute(name) => matches
            .iter()
            .filter_map(|&el| tree.get_attribute(el, name).map(str::to_string))
            .collect(),
    };
    Ok(lines.join("\n"))
}

/// Text content of the whole input.
pub fn text(html: &str) -> String {
    let (tree, root) = parse(html, false);
    tree.text_content(root)
}

/// Title of a document, or an error when it has none.
pub fn title(html: &str) -> Result<String> {
    let (tree, root) = parse(html, false);
    let title = tree
        .get_elements_by_tag_name(root, "title")
        .into_iter()
        .next()
        .ok_or_not_found("title element")?;
    Ok(tree.text_content(title))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<!DOCTYPE html><html><head><title>Docs</title></head>\
        <body><ul><li class=item><a href=/a>A</a></li><li class=item><a href=/b>B &amp; C</a></li></ul></body></html>";

    #[test]
    fn test_render_html_and_xml() {
        let html = "<p>a<br>b</p>";
        assert_eq!(render(html, RenderOptions::default()).unwrap(), html);
        let xml = RenderOptions {
            xml: true,
            ..Default::default()
        };
        assert_eq!(render(html, xml).unwrap(), "<p>a<br />b</p>");
    }

    #[test]
    fn test_render_strip_whitespace() {
        let options = RenderOptions {
            strip_whitespace: true,
            ..Default::default()
        };
        assert_eq!(render("<ul>\n <li>a</li>\n</ul>", options).unwrap(), "<ul><li>a</li></ul>");
    }

    #[test]
    fn test_query_outputs() {
        assert_eq!(query(PAGE, "li.item", &QueryOutput::Count).unwrap(), "2");
        assert_eq!(query(PAGE, "li + li a", &QueryOutput::Text).unwrap(), "B & C");
        assert_eq!(
            query(PAGE, "a", &QueryOutput::Attribute("href".into())).unwrap(),
            "/a\n/b"
        );
        assert_eq!(
            query(PAGE, "li:first-child", &QueryOutput::Html).unwrap(),
            r#"<li class="item"><a href="/a">A</a></li>"#
        );
    }

    #[test]
    fn test_query_bad_selector() {
        let err = query(PAGE, "div >", &QueryOutput::Html).unwrap_err();
        assert!(matches!(err, VdomError::Selector { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_text_and_title() {
        assert_eq!(text("<p>a <b>b</b></p>c"), "a bc");
        assert_eq!(title(PAGE).unwrap(), "Docs");
        assert!(matches!(title("<p>x</p>"), Err(VdomError::NotFound(_))));
    }

    #[test]
    fn test_non_utf8_input_is_a_markup_error() {
        let err = decode_input(Path::new("page.html"), vec![b'<', b'p', b'>', 0xff]).unwrap_err();
        assert!(matches!(err, VdomError::Markup { .. }));
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("page.html is not valid UTF-8"));
        assert_eq!(decode_input(Path::new("-"), b"<p>".to_vec()).unwrap(), "<p>");
    }

    #[test]
    fn test_missing_file() {
        let err = read_input(Path::new("/nonexistent/vdom/input.html")).unwrap_err();
        assert!(matches!(err, VdomError::NotFound(_)));
    }
}
