//! Embed extraction for vault notes
//!
//! Finds transclusion references (`![[Note]]`, `![[Note#Heading|alias]]`,
//! `![alt](path/to/note.md)`) the same way a note application's metadata cache
//! reports them: in document order, skipping code blocks and inline code.

use std::ops::Range;
use std::path::Path;
use std::sync::OnceLock;

use pulldown_cmark::{Event, Options, Parser, Tag};
use regex::Regex;

/// File extension of vault notes
pub const NOTE_EXTENSION: &str = "md";

/// A single embed found in a note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    /// The literal embed text as written in the note (`![[Other]]`)
    pub original: String,
    /// The link target, including any `#subpath` but without the alias
    pub link: String,
}

impl Embed {
    /// Whether the embed points at another note (as opposed to an image,
    /// PDF or remote resource)
    pub fn is_note(&self) -> bool {
        is_note_link(&self.link)
    }
}

/// Strip the `#subpath` suffix from a link
pub fn link_path(link: &str) -> &str {
    link.split('#').next().unwrap_or_default().trim()
}

/// A link is a note link when it is local and has no extension or `.md`
pub fn is_note_link(link: &str) -> bool {
    let path = link_path(link);
    if path.is_empty() || path.contains("://") {
        return false;
    }

    match Path::new(path).extension() {
        None => true,
        Some(ext) => ext.eq_ignore_ascii_case(NOTE_EXTENSION),
    }
}

fn embed_regex() -> &'static Regex {
    static RE_EMBED: OnceLock<Regex> = OnceLock::new();
    RE_EMBED.get_or_init(|| {
        Regex::new(
            r#"!\[\[(?P<wiki>[^\[\]\n]+?)\]\]|!\[[^\[\]\n]*\]\((?P<dest><[^>\n]+>|[^()\s]+)(?:\s+"[^"\n]*")?\)"#,
        )
        .unwrap()
    })
}

/// Byte ranges of code blocks (fenced or indented, at any nesting) and inline
/// code spans
fn code_ranges(content: &str) -> Vec<Range<usize>> {
    Parser::new_ext(content, Options::empty())
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::CodeBlock(_)) | Event::Code(_) => Some(range),
            _ => None,
        })
        .collect()
}

fn parse_wiki_target(inner: &str) -> String {
    inner.split('|').next().unwrap_or_default().trim().to_string()
}

fn parse_markdown_dest(dest: &str) -> String {
    let dest = dest
        .strip_prefix('<')
        .and_then(|d| d.strip_suffix('>'))
        .unwrap_or(dest);

    urlencoding::decode(dest)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| dest.to_string())
}

/// Extract all embeds from note content, deduplicated by their literal text
pub fn extract_embeds(content: &str) -> Vec<Embed> {
    let code = code_ranges(content);
    let mut embeds: Vec<Embed> = Vec::new();

    for caps in embed_regex().captures_iter(content) {
        let Some(whole) = caps.get(0) else { continue };
        if code.iter().any(|range| range.contains(&whole.start())) {
            continue;
        }

        let link = if let Some(wiki) = caps.name("wiki") {
            parse_wiki_target(wiki.as_str())
        } else if let Some(dest) = caps.name("dest") {
            parse_markdown_dest(dest.as_str())
        } else {
            continue;
        };

        if link.is_empty() || embeds.iter().any(|e| e.original == whole.as_str()) {
            continue;
        }

        embeds.push(Embed {
            original: whole.as_str().to_string(),
            link,
        });
    }

    embeds
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(content: &str) -> Vec<String> {
        extract_embeds(content).into_iter().map(|e| e.link).collect()
    }

    #[test]
    fn test_extract_wiki_embeds() {
        let embeds = extract_embeds("Intro\n![[Other]]\nand ![[folder/Deep Note]] end");
        assert_eq!(
            embeds,
            vec![
                Embed {
                    original: "![[Other]]".into(),
                    link: "Other".into()
                },
                Embed {
                    original: "![[folder/Deep Note]]".into(),
                    link: "folder/Deep Note".into()
                },
            ]
        );
    }

    #[test]
    fn test_extract_wiki_embed_alias_and_subpath() {
        let embeds = extract_embeds("![[Note#Section|shown]]");
        assert_eq!(embeds[0].original, "![[Note#Section|shown]]");
        assert_eq!(embeds[0].link, "Note#Section");
        assert_eq!(link_path(&embeds[0].link), "Note");
    }

    #[test]
    fn test_extract_markdown_embeds() {
        assert_eq!(
            links(r#"![x](sub/My%20Note.md) ![y](<other note.md> "title")"#),
            vec!["sub/My Note.md", "other note.md"]
        );
    }

    #[test]
    fn test_plain_links_are_not_embeds() {
        assert!(extract_embeds("[[Other]] and [text](other.md)").is_empty());
    }

    #[test]
    fn test_embeds_in_code_are_ignored() {
        let content = "```\n![[InFence]]\n```\n`![[InSpan]]` ![[Real]]\n~~~~\n![[Tilde]]\n~~~~";
        assert_eq!(links(content), vec!["Real"]);
    }

    #[test]
    fn test_unclosed_fence_hides_rest() {
        assert!(links("```rust\n![[Hidden]]").is_empty());
    }

    #[test]
    fn test_duplicate_embeds_reported_once() {
        assert_eq!(links("![[A]] ![[B]] ![[A]]"), vec!["A", "B"]);
    }

    #[test]
    fn test_is_note_link() {
        assert!(is_note_link("Other"));
        assert!(is_note_link("dir/Other.md"));
        assert!(is_note_link("Other#Heading"));
        assert!(is_note_link("Other.MD"));
        assert!(!is_note_link("image.png"));
        assert!(!is_note_link("doc.pdf#page=2"));
        assert!(!is_note_link("https://example.com/a"));
        assert!(!is_note_link("#Heading"));
    }

    #[test]
    fn test_indented_code_block_is_ignored() {
        assert!(links("Intro\n\n    ![[InIndentedCode]]\n").is_empty());
    }

    #[test]
    fn test_fences_in_quotes_and_lists_are_ignored() {
        assert!(links("> ```\n> ![[InQuotedFence]]\n> ```").is_empty());
        assert_eq!(
            links("- item\n\n  ```\n  ![[InListFence]]\n  ```\n\n![[After]]"),
            vec!["After"]
        );
    }

    #[test]
    fn test_code_span_across_lines_is_ignored() {
        assert_eq!(
            links("text `start\n![[InSpan]] end` ![[Real]]"),
            vec!["Real"]
        );
    }

    #[test]
    fn test_unclosed_backtick_is_not_code() {
        assert_eq!(links("unclosed `tick ![[Real]]"), vec!["Real"]);
    }
}
