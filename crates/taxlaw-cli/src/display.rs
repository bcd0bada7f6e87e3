//! Vertical card display for answers.

use taxlaw_core::{AnswerResult, Section};

const MAX_LIST_ITEMS: usize = 10;

/// Print an answer as a card grouped by section.
pub fn print_answer_card(result: &AnswerResult) {
    print!("{}", render_answer_card(result));
}

pub fn render_answer_card(result: &AnswerResult) -> String {
    let mut out = format!("=== {} ===\n\n", result.sections.title);

    for section in Section::ALL.into_iter().skip(1) {
        out.push_str(heading(section));
        out.push('\n');
        for line in result.sections.get(section).lines() {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }

    if !result.citations.is_empty() {
        out.push_str("Citations\n");
        for citation in result.citations.iter().take(MAX_LIST_ITEMS) {
            out.push_str(&format!(
                "  {:<26} {}\n",
                citation.citations_name, citation.citation_url
            ));
        }
        if result.citations.len() > MAX_LIST_ITEMS {
            out.push_str(&format!(
                "  ... and {} more\n",
                result.citations.len() - MAX_LIST_ITEMS
            ));
        }
        out.push('\n');
    }
    out
}

fn heading(section: Section) -> &'static str {
    match section {
        Section::Title => "Title",
        Section::TaxResearch => "Research",
        Section::TaxCitations => "Cited Legislation",
        Section::DraftClientResponse => "Draft Client Response",
        Section::ClarifyingQuestions => "Clarifying Questions",
        Section::Confirmation => "Confirmation",
    }
}
