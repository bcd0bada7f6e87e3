//! Parse free-form model output back into the six answer sections.
//!
//! # Rules
//!
//! - A line opens a section only when, after trimming, it equals a header
//!   token exactly. Case differences or trailing text make it content.
//! - Non-blank lines are kept verbatim; blank lines are dropped, so spacing
//!   inside a section is not preserved. Lines before the first header are
//!   dropped.
//! - A section is committed only if it collected content. Otherwise its
//!   default text stays.
//! - A repeated header overwrites the earlier occurrence.
//! - Citations are read from the final `tax_citations` text, one per
//!   `name | url` line. Malformed lines are skipped.
//!
//! Parsing never fails: the worst case is all defaults and no citations.

use taxlaw_core::{CitationRecord, ParsedSections, Section};
use tracing::debug;

/// Converts raw model output into sections and citations.
///
/// The bracketed header protocol is one implementation; a structured-output
/// model could supply another without changing the pipeline.
pub trait SectionParser: Send + Sync {
    fn parse(&self, raw: &str) -> (ParsedSections, Vec<CitationRecord>);
}

/// Parser for the `[HEADER]`-per-line protocol produced by [`crate::build_prompt`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderParser;

impl SectionParser for HeaderParser {
    fn parse(&self, raw: &str) -> (ParsedSections, Vec<CitationRecord>) {
        parse_response(raw)
    }
}

/// Split `raw` into sections and extract citations.
pub fn parse_response(raw: &str) -> (ParsedSections, Vec<CitationRecord>) {
    let sections = parse_sections(raw);
    let citations = extract_citations(&sections.tax_citations);
    debug!(
        defaulted = Section::ALL
            .iter()
            .filter(|s| sections.get(**s) == s.default_text())
            .count(),
        citations = citations.len(),
        "parsed model response"
    );
    (sections, citations)
}

fn parse_sections(raw: &str) -> ParsedSections {
    let mut sections = ParsedSections::default();
    let mut current: Option<Section> = None;
    let mut buffer: Vec<&str> = Vec::new();

    for line in raw.lines() {
        if let Some(next) = Section::from_header(line) {
            if let Some(open) = current {
                commit(&mut sections, open, &buffer);
            }
            current = Some(next);
            buffer.clear();
        } else if current.is_some() && !line.trim().is_empty() {
            buffer.push(line);
        }
    }

    if let Some(open) = current {
        commit(&mut sections, open, &buffer);
    }
    sections
}

fn commit(sections: &mut ParsedSections, section: Section, buffer: &[&str]) {
    let joined = buffer.join("\n");
    let text = joined.trim();
    if !text.is_empty() {
        sections.set(section, text.to_string());
    }
}

/// Extract `name | url` citations, splitting each line on its first `|`.
pub fn extract_citations(text: &str) -> Vec<CitationRecord> {
    text.lines()
        .filter_map(|line| {
            let (name, url) = line.split_once('|')?;
            let (name, url) = (name.trim(), url.trim());
            (!name.is_empty() && !url.is_empty()).then(|| CitationRecord {
                citations_name: name.to_string(),
                citation_url: url.to_string(),
            })
        })
        .collect()
}
