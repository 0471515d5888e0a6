//! Markdown to HTML rendering for the `html` publish format

use pulldown_cmark::{html, Options, Parser};

/// Render markdown to an HTML fragment
///
/// Tables, strikethrough and task lists are enabled so common note syntax
/// survives the conversion.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(markdown, options);
    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_and_paragraph() {
        assert_eq!(markdown_to_html("# Notes\nHello"), "<h1>Notes</h1>\n<p>Hello</p>\n");
    }

    #[test]
    fn test_escapes_html_in_text() {
        assert!(markdown_to_html("a < b & c").contains("a &lt; b &amp; c"));
    }

    #[test]
    fn test_tables_and_strikethrough() {
        let html = markdown_to_html("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~");
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn test_task_list() {
        let html = markdown_to_html("- [x] done\n- [ ] todo");
        assert!(html.contains(r#"type="checkbox""#));
    }
}
