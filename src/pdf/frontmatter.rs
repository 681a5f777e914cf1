use serde::Serialize;

use super::upload::OcrSummary;

#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum Frontmatter<'a> {
    Title(&'a str),
    Author(Option<&'a str>),
    PageCount(usize),
    NeedsOcr(bool),
    Message(Option<&'a str>),
    Ocr(Option<&'a OcrSummary>),
    Sections(Vec<SectionMeta<'a>>),
}

#[derive(Serialize, Debug)]
pub struct SectionMeta<'a> {
    title: &'a str,
    slug: &'a str,
    page: usize,
    /// false for sections that were cut without a detected heading
    show_header: bool,
}

impl<'a> SectionMeta<'a> {
    pub fn new(title: &'a str, slug: &'a str, page: usize, show_header: bool) -> Self {
        Self {
            title,
            slug,
            page,
            show_header,
        }
    }
}
