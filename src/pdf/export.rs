use std::collections::BTreeMap;

use super::frontmatter::{Frontmatter, SectionMeta};
use super::normalize::NormalizedSection;
use super::upload::ProcessedUpload;

const UNTITLED: &str = "Untitled document";

/// Renders a processed upload as markdown with a YAML frontmatter block,
/// one `##` heading per section.
pub fn serialize_upload(upload: &ProcessedUpload) -> anyhow::Result<String> {
    let title = upload.metadata.title.as_deref().unwrap_or(UNTITLED);

    let fallback_titles: Vec<String> = upload
        .sections
        .iter()
        .map(|s| format!("Section {}", s.order + 1))
        .collect();

    let mut fm: BTreeMap<&str, Frontmatter> = BTreeMap::new();
    fm.insert("title", Frontmatter::Title(title));
    fm.insert("author", Frontmatter::Author(upload.metadata.author.as_deref()));
    fm.insert("page_count", Frontmatter::PageCount(upload.metadata.page_count));
    fm.insert("needs_ocr", Frontmatter::NeedsOcr(upload.needs_ocr));
    fm.insert("message", Frontmatter::Message(upload.message.as_deref()));
    fm.insert("ocr", Frontmatter::Ocr(upload.ocr.as_ref()));

    let mut sections = Vec::<SectionMeta>::new();
    let mut body = String::with_capacity(upload.text.len() + 64 * upload.sections.len());

    upload
        .sections
        .iter()
        .zip(fallback_titles.iter())
        .for_each(|(section, fallback)| {
            let (section_title, show_header) = match section.heading.as_deref() {
                Some(heading) => (heading, true),
                None => (fallback.as_str(), false),
            };
            sections.push(SectionMeta::new(
                section_title,
                section.slug.as_str(),
                section.page,
                show_header,
            ));

            let header_class = if show_header { "" } else { " .sr-only" };
            body.push_str(&format!(
                "## {} {{#{}{}}}\n\n{}\n\n",
                section_title,
                section.slug,
                header_class,
                section_content(section)
            ));
        });

    fm.insert("sections", Frontmatter::Sections(sections));

    Ok(format!(
        r#"---
{}---

{}"#,
        serde_yaml_ng::to_string(&fm)?,
        body
    ))
}

// the heading is already rendered as the markdown header
fn section_content(section: &NormalizedSection) -> &str {
    match section.heading.as_deref() {
        Some(heading) => section
            .body
            .strip_prefix(heading)
            .map(str::trim_start)
            .unwrap_or(section.body.as_str()),
        None => &section.body,
    }
}
