//! Line-oriented parser for the Markdown dialect accepted by reverse
//! conversion.
//!
//! One pass, one cursor. Each line is tried against the block rules in a
//! fixed order: fenced code, table, heading, horizontal rule, unordered
//! list, ordered list, blockquote, blank, paragraph. Nothing here fails;
//! malformed input degrades to the closest block that fits.

use once_cell::sync::Lazy;
use regex::Regex;

const PROVENANCE_PREFIX: &str = "> Converted from";
const MAX_HEADING_LEVEL: usize = 9;

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#+)\s+(.+)$").unwrap());
static RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(-{3,}|\*{3,}|_{3,})$").unwrap());
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)[-*+]\s+(.+)$").unwrap());
static NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\s*)\d+\.\s+(.+)$").unwrap());
static QUOTE_MARK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^>\s*").unwrap());
static SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\s|:\-]+$").unwrap());
static INLINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*(.+?)\*\*|\*(.+?)\*|`(.+?)`|\[(.+?)\]\((.+?)\)").unwrap()
});

/// A run of text with at most one kind of inline formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Plain(String),
    Bold(String),
    Italic(String),
    Code(String),
    Link { text: String, url: String },
}

impl Inline {
    /// Visible text of the span.
    pub fn text(&self) -> &str {
        match self {
            Inline::Plain(t) | Inline::Bold(t) | Inline::Italic(t) | Inline::Code(t) => t,
            Inline::Link { text, .. } => text,
        }
    }
}

/// A block-level token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Level in 1..=9
    Heading { level: u8, spans: Vec<Inline> },
    /// Fenced code, one entry per source line
    CodeBlock(Vec<String>),
    /// Rows are padded or cut to the header width
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    UnorderedListItem { indent: usize, spans: Vec<Inline> },
    OrderedListItem { indent: usize, spans: Vec<Inline> },
    Blockquote(Vec<String>),
    HorizontalRule,
    Paragraph(Vec<Inline>),
}

/// Parse Markdown into block tokens.
pub fn parse_markdown(markdown: &str) -> Vec<Block> {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut blocks = Vec::new();
    let mut i = skip_provenance_header(&lines);

    while i < lines.len() {
        let line = lines[i];

        if line.starts_with("```") {
            i += 1;
            let start = i;
            while i < lines.len() && !lines[i].starts_with("```") {
                i += 1;
            }
            blocks.push(Block::CodeBlock(
                lines[start..i].iter().map(|l| l.to_string()).collect(),
            ));
            // closing fence, if there is one
            i += 1;
            continue;
        }

        if line.starts_with('|') && line[1..].contains('|') {
            let start = i;
            while i < lines.len() && lines[i].starts_with('|') {
                i += 1;
            }
            // a lone row has no header and is dropped
            if let Some(table) = parse_table(&lines[start..i]) {
                blocks.push(table);
            }
            continue;
        }

        if let Some(caps) = HEADING.captures(line) {
            let level = caps[1].len().min(MAX_HEADING_LEVEL) as u8;
            blocks.push(Block::Heading {
                level,
                spans: parse_inline(&caps[2]),
            });
            i += 1;
            continue;
        }

        if RULE.is_match(line.trim()) {
            blocks.push(Block::HorizontalRule);
            i += 1;
            continue;
        }

        if let Some(caps) = BULLET.captures(line) {
            blocks.push(Block::UnorderedListItem {
                indent: indent_level(&caps[1]),
                spans: parse_inline(&caps[2]),
            });
            i += 1;
            continue;
        }

        if let Some(caps) = NUMBERED.captures(line) {
            blocks.push(Block::OrderedListItem {
                indent: indent_level(&caps[1]),
                spans: parse_inline(&caps[2]),
            });
            i += 1;
            continue;
        }

        if line.starts_with('>') {
            let mut quoted = Vec::new();
            while i < lines.len() && lines[i].starts_with('>') {
                quoted.push(QUOTE_MARK.replace(lines[i], "").into_owned());
                i += 1;
            }
            blocks.push(Block::Blockquote(quoted));
            continue;
        }

        if line.trim().is_empty() {
            i += 1;
            continue;
        }

        blocks.push(Block::Paragraph(parse_inline(line)));
        i += 1;
    }

    blocks
}

/// Index of the first line after the provenance header written by forward
/// conversion, or 0 when the input does not start with one.
///
/// The header is `# name`, an optional blank line, `> Converted from ...`,
/// then everything up to and including a `---` line and one blank line.
fn skip_provenance_header(lines: &[&str]) -> usize {
    if !lines.first().is_some_and(|l| l.starts_with("# ")) {
        return 0;
    }
    let note = match lines.get(1) {
        Some(l) if l.trim().is_empty() => 2,
        _ => 1,
    };
    if !lines.get(note).is_some_and(|l| l.starts_with(PROVENANCE_PREFIX)) {
        return 0;
    }

    let Some(rule) = lines[note + 1..]
        .iter()
        .position(|l| l.trim_end() == "---")
        .map(|offset| note + 1 + offset)
    else {
        // no closing rule; drop only the title and the note
        return note + 1;
    };

    let mut next = rule + 1;
    if lines.get(next).is_some_and(|l| l.trim().is_empty()) {
        next += 1;
    }
    next
}

/// Two columns of leading whitespace per nesting level.
fn indent_level(leading: &str) -> usize {
    leading.chars().count() / 2
}

fn parse_table(lines: &[&str]) -> Option<Block> {
    if lines.len() < 2 {
        return None;
    }
    let mut rows: Vec<Vec<String>> = lines.iter().map(|l| split_row(l)).collect();

    let header = rows.remove(0);
    if is_separator(lines[1]) {
        rows.remove(0);
    }
    let columns = header.len();
    for row in &mut rows {
        row.resize(columns, String::new());
    }
    Some(Block::Table { header, rows })
}

fn is_separator(line: &str) -> bool {
    SEPARATOR.is_match(line) && line.contains('-')
}

/// Cells of `| a | b |`, outer pipes optional.
fn split_row(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);
    line.split('|').map(|cell| cell.trim().to_string()).collect()
}

/// Split text into formatted spans. At each position bold wins over
/// italic, italic over code, code over links. Unmatched markers stay
/// literal.
pub fn parse_inline(text: &str) -> Vec<Inline> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in INLINE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            spans.push(Inline::Plain(text[last..whole.start()].to_string()));
        }

        let span = if let Some(m) = caps.get(1) {
            Inline::Bold(m.as_str().to_string())
        } else if let Some(m) = caps.get(2) {
            Inline::Italic(m.as_str().to_string())
        } else if let Some(m) = caps.get(3) {
            Inline::Code(m.as_str().to_string())
        } else {
            Inline::Link {
                text: caps.get(4).map_or("", |m| m.as_str()).to_string(),
                url: caps.get(5).map_or("", |m| m.as_str()).to_string(),
            }
        };
        spans.push(span);
        last = whole.end();
    }

    if last < text.len() {
        spans.push(Inline::Plain(text[last..].to_string()));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(s: &str) -> Inline {
        Inline::Plain(s.to_string())
    }

    #[test]
    fn test_inline_priority_and_literals() {
        assert_eq!(
            parse_inline("Some **bold** and *it* with `x*y` see [docs](https://e.x/a)."),
            vec![
                plain("Some "),
                Inline::Bold("bold".to_string()),
                plain(" and "),
                Inline::Italic("it".to_string()),
                plain(" with "),
                Inline::Code("x*y".to_string()),
                plain(" see "),
                Inline::Link {
                    text: "docs".to_string(),
                    url: "https://e.x/a".to_string()
                },
                plain("."),
            ]
        );
        assert_eq!(parse_inline("2 * 3 = 6"), vec![plain("2 * 3 = 6")]);
        assert_eq!(parse_inline("**open"), vec![plain("**open")]);
        assert!(parse_inline("").is_empty());
    }

    #[test]
    fn test_provenance_header_stripped() {
        let md = "# report.docx\n\n> Converted from word_document on 2024-01-01 00:00:00 UTC\n\n---\n\nBody";
        assert_eq!(parse_markdown(md), vec![Block::Paragraph(vec![plain("Body")])]);

        let tight = "# report.docx\n> Converted from word_document on now\n---\nBody";
        assert_eq!(parse_markdown(tight), vec![Block::Paragraph(vec![plain("Body")])]);
    }

    #[test]
    fn test_ordinary_title_kept() {
        let blocks = parse_markdown("# Plan\n\nText");
        assert_eq!(
            blocks[0],
            Block::Heading {
                level: 1,
                spans: vec![plain("Plan")]
            }
        );
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_header_without_rule_keeps_body() {
        let md = "# a.pdf\n> Converted from pdf_document on now\nStill here";
        assert_eq!(
            parse_markdown(md),
            vec![Block::Paragraph(vec![plain("Still here")])]
        );
    }

    #[test]
    fn test_unterminated_fence_runs_to_end() {
        let blocks = parse_markdown("Intro\n```rust\nfn main() {}\n\n# not a heading");
        assert_eq!(
            blocks[1],
            Block::CodeBlock(vec![
                "fn main() {}".to_string(),
                String::new(),
                "# not a heading".to_string()
            ])
        );
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_table_padding_and_truncation() {
        let blocks = parse_markdown("| A | B | C |\n|:--|---|--:|\n| 1 |\n| 1 | 2 | 3 | 4 |");
        assert_eq!(
            blocks,
            vec![Block::Table {
                header: vec!["A".into(), "B".into(), "C".into()],
                rows: vec![
                    vec!["1".into(), String::new(), String::new()],
                    vec!["1".into(), "2".into(), "3".into()],
                ],
            }]
        );
    }

    #[test]
    fn test_table_without_separator_and_single_line() {
        let blocks = parse_markdown("| A | B |\n| 1 | 2 |");
        assert_eq!(
            blocks,
            vec![Block::Table {
                header: vec!["A".into(), "B".into()],
                rows: vec![vec!["1".into(), "2".into()]],
            }]
        );

        let single = parse_markdown("before\n| only | row |\nafter");
        assert_eq!(
            single,
            vec![
                Block::Paragraph(vec![Inline::Plain("before".into())]),
                Block::Paragraph(vec![Inline::Plain("after".into())]),
            ]
        );
    }

    #[test]
    fn test_headings_clamped_and_rules() {
        let blocks = parse_markdown("########### Deep **bold**\n***\n___\n--");
        assert_eq!(
            blocks[0],
            Block::Heading {
                level: 9,
                spans: vec![plain("Deep "), Inline::Bold("bold".to_string())]
            }
        );
        assert_eq!(blocks[1], Block::HorizontalRule);
        assert_eq!(blocks[2], Block::HorizontalRule);
        assert_eq!(blocks[3], Block::Paragraph(vec![plain("--")]));
    }

    #[test]
    fn test_lists_and_indent() {
        let blocks = parse_markdown("- one\n  * two\n     + three\n1. first\n   2. second");
        let indents: Vec<_> = blocks
            .iter()
            .map(|b| match b {
                Block::UnorderedListItem { indent, .. } => ('u', *indent),
                Block::OrderedListItem { indent, .. } => ('o', *indent),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(indents, vec![('u', 0), ('u', 1), ('u', 2), ('o', 0), ('o', 1)]);
    }

    #[test]
    fn test_blockquote_lines() {
        let blocks = parse_markdown("> first\n>second\n>\nafter");
        assert_eq!(
            blocks[0],
            Block::Blockquote(vec!["first".into(), "second".into(), String::new()])
        );
        assert_eq!(blocks[1], Block::Paragraph(vec![plain("after")]));
    }
}
