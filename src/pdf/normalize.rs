//! Splits flat extracted text into display sections.
//!
//! Pages are separated by form feeds (what `pdf-extract` emits), paragraphs by
//! blank lines. A section starts at a heading-like paragraph, at a page break
//! when the running section has no heading, or when the running body would
//! grow past [`MAX_SECTION_CHARS`]. Only whitespace is rewritten: the heading
//! line stays the first paragraph of its body, so the bodies read in order
//! still carry every non-whitespace character of the input.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

const PAGE_BREAK: char = '\x0C';

/// Soft limit, checked between paragraphs; a single long paragraph is never split.
pub const MAX_SECTION_CHARS: usize = 2000;

const MAX_HEADING_CHARS: usize = 80;
const MAX_TITLE_CHARS: usize = 60;
const MAX_TITLE_WORDS: usize = 10;

lazy_static! {
    static ref NUMBERED_HEADING: Regex = Regex::new(
        r"^(?:\d+(?:\.\d+)*\.?|[IVXLC]+\.|(?i:chapter|section|part|unit|lesson)\s+(?:\d+|[IVXLC]+)[.:]?)\s+\p{Lu}",
    )
    .unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedSection {
    /// 0-based reading order
    pub order: usize,
    pub heading: Option<String>,
    /// unique within the document
    pub slug: String,
    /// 1-based page the section starts on
    pub page: usize,
    pub body: String,
}

struct Paragraph {
    lines: Vec<String>,
    page: usize,
    page_start: bool,
}

struct SectionBuilder {
    heading: Option<String>,
    page: usize,
    paragraphs: Vec<String>,
    len: usize,
}

impl SectionBuilder {
    fn new(heading: Option<String>, page: usize) -> Self {
        Self {
            heading,
            page,
            paragraphs: Vec::new(),
            len: 0,
        }
    }

    fn push(&mut self, paragraph: String) {
        self.len += paragraph.len();
        self.paragraphs.push(paragraph);
    }
}

pub fn normalize_text(text: &str) -> Vec<NormalizedSection> {
    let mut builders: Vec<SectionBuilder> = Vec::new();

    for paragraph in split_paragraphs(text) {
        let first = &paragraph.lines[0];
        let single_line = paragraph.lines.len() == 1;
        let heading = if is_heading(first, single_line) {
            Some(first.clone())
        } else {
            None
        };
        let joined = paragraph.lines.join(" ");

        let start_new = match builders.last() {
            None => true,
            Some(_) if heading.is_some() => true,
            Some(current) if paragraph.page_start && current.heading.is_none() => true,
            Some(current) => current.len + joined.len() > MAX_SECTION_CHARS,
        };

        if start_new {
            builders.push(SectionBuilder::new(heading, paragraph.page));
        }
        if let Some(current) = builders.last_mut() {
            current.push(joined);
        }
    }

    let mut slugger = github_slugger::Slugger::default();

    builders
        .into_iter()
        .enumerate()
        .map(|(order, section)| {
            let slug = match &section.heading {
                Some(heading) => slugger.slug(heading),
                None => slugger.slug(&format!("section {}", order + 1)),
            };
            NormalizedSection {
                order,
                heading: section.heading,
                slug,
                page: section.page,
                body: section.paragraphs.join("\n\n"),
            }
        })
        .collect()
}

fn split_paragraphs(text: &str) -> Vec<Paragraph> {
    let mut paragraphs = Vec::new();

    for (page_index, page) in text.split(PAGE_BREAK).enumerate() {
        let mut lines: Vec<String> = Vec::new();
        let mut page_start = true;

        for raw_line in page.lines() {
            let line = collapse_whitespace(raw_line);
            if line.is_empty() {
                if !lines.is_empty() {
                    paragraphs.push(Paragraph {
                        lines: std::mem::take(&mut lines),
                        page: page_index + 1,
                        page_start,
                    });
                    page_start = false;
                }
                continue;
            }
            lines.push(line);
        }

        if !lines.is_empty() {
            paragraphs.push(Paragraph {
                lines,
                page: page_index + 1,
                page_start,
            });
        }
    }

    paragraphs
}

fn collapse_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Numbered and all-caps lines count as headings even when body text
/// follows on the next line; title-like lines only when they stand alone.
fn is_heading(line: &str, stands_alone: bool) -> bool {
    if line.chars().count() > MAX_HEADING_CHARS || !line.chars().any(char::is_alphabetic) {
        return false;
    }
    if ends_like_sentence(line) {
        return false;
    }

    NUMBERED_HEADING.is_match(line) || is_all_caps(line) || (stands_alone && is_title_like(line))
}

fn ends_like_sentence(line: &str) -> bool {
    line.ends_with(['.', ',', ';', '!', '?'])
}

fn is_all_caps(line: &str) -> bool {
    let letters: Vec<char> = line.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() >= 3 && letters.iter().all(|c| c.is_uppercase())
}

fn is_title_like(line: &str) -> bool {
    if line.chars().count() > MAX_TITLE_CHARS || line.ends_with(':') {
        return false;
    }
    if line.split_whitespace().count() > MAX_TITLE_WORDS {
        return false;
    }
    line.chars().next().is_some_and(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_whitespace(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    fn assert_reconstructs(input: &str) {
        let sections = normalize_text(input);
        let bodies: String = sections.iter().map(|s| s.body.as_str()).collect();
        assert_eq!(strip_whitespace(&bodies), strip_whitespace(input));
        assert!(sections.iter().all(|s| !s.body.trim().is_empty()));
        for (i, section) in sections.iter().enumerate() {
            assert_eq!(section.order, i);
        }
    }

    #[test]
    fn test_empty_input_gives_no_sections() {
        assert!(normalize_text("").is_empty());
        assert!(normalize_text("  \n\n\t \x0C \n").is_empty());
    }

    #[test]
    fn test_headed_sections() {
        let text = "Photosynthesis\n\nPlants convert light into chemical energy.\nThis happens in chloroplasts.\n\nThe Calvin Cycle\n\nCarbon is fixed into sugars.";
        let sections = normalize_text(text);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].heading.as_deref(), Some("Photosynthesis"));
        assert_eq!(sections[0].slug, "photosynthesis");
        assert_eq!(
            sections[0].body,
            "Photosynthesis\n\nPlants convert light into chemical energy. This happens in chloroplasts."
        );
        assert_eq!(sections[1].heading.as_deref(), Some("The Calvin Cycle"));
        assert_eq!(sections[1].slug, "the-calvin-cycle");
        assert_reconstructs(text);
    }

    #[test]
    fn test_numbered_heading_followed_by_body_line() {
        let text = "1.2 Cell Structure\nCells have membranes and organelles that carry out work.";
        let sections = normalize_text(text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].heading.as_deref(), Some("1.2 Cell Structure"));
    }

    #[test]
    fn test_sentences_are_not_headings() {
        let text = "The mitochondria is the powerhouse of the cell.\n\nIt produces ATP.";
        let sections = normalize_text(text);
        assert_eq!(sections.len(), 1);
        assert!(sections[0].heading.is_none());
        assert_eq!(sections[0].slug, "section-1");
    }

    #[test]
    fn test_all_caps_heading() {
        let text = "intro text that has no heading at all and keeps going\n\nCHAPTER SUMMARY\nwe covered a lot of ground here";
        let sections = normalize_text(text);
        assert_eq!(sections.len(), 2);
        assert!(sections[0].heading.is_none());
        assert_eq!(sections[1].heading.as_deref(), Some("CHAPTER SUMMARY"));
        assert_reconstructs(text);
    }

    #[test]
    fn test_page_breaks_split_unheaded_text() {
        let text = "first page text, nothing special here\x0Csecond page text, also plain";
        let sections = normalize_text(text);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].page, 1);
        assert_eq!(sections[1].page, 2);
        assert_reconstructs(text);
    }

    #[test]
    fn test_headed_section_continues_across_pages() {
        let text = "Introduction\n\nthe story begins on one page\x0Cand carries on to the next one";
        let sections = normalize_text(text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].page, 1);
    }

    #[test]
    fn test_long_text_respects_budget() {
        let paragraph = "word ".repeat(150);
        let text = vec![paragraph.trim(); 10].join("\n\n");
        let sections = normalize_text(&text);
        assert!(sections.len() > 1);
        for section in &sections {
            assert!(section.body.len() <= MAX_SECTION_CHARS + paragraph.len());
        }
        assert_reconstructs(&text);
    }

    #[test]
    fn test_duplicate_headings_get_unique_slugs() {
        let text = "Summary\n\nfirst part\n\nSummary\n\nsecond part";
        let sections = normalize_text(text);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].slug, "summary");
        assert_eq!(sections[1].slug, "summary-1");
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        let sections = normalize_text("  lots   of\tspace \r\n here  ");
        assert_eq!(sections[0].body, "lots of space here");
    }

    #[test]
    fn test_reconstruction_on_messy_input() {
        assert_reconstructs("A\n\n\n\nB  C\x0C\x0C\nD\r\n\r\n1. Intro\nstuff\n\nIII. Methods\n\n\tend.");
        assert_reconstructs("x");
        assert_reconstructs("\x0C");
    }
}
