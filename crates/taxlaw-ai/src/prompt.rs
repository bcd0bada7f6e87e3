//! The six-section prompt template.
//!
//! The preamble is the whole contract with the model: there is no structured
//! output enforcement, so the parser relies on the model echoing the header
//! tokens exactly as written here. Interpolated values are not escaped.

use taxlaw_core::{Section, TaxQuery};

const PREAMBLE: &str = "\
You are an expert tax law research assistant. Answer the client's question using \
the legislation excerpts provided as context.

Respond using exactly the six section headers shown below, in exactly the order shown, \
each header exactly once and alone on its own line. Do not add any other headers, \
markdown headings, or text outside the sections.

In the [TAX_CITATIONS] section, list one citation per line in the form:
<legislation name and section> | <url>

The text under each header is a placeholder showing what belongs in that section. \
Replace it with your own content.";

const TITLE_DIRECTIVE: &str =
    "Write a short descriptive title for the answer to the following question.";

/// Render the prompt for one question and its retrieved context.
pub fn build_prompt(query: &TaxQuery, context: &str) -> String {
    let mut prompt = String::with_capacity(PREAMBLE.len() + context.len() + 512);
    prompt.push_str(PREAMBLE);
    prompt.push_str("\n\n");

    for section in Section::ALL {
        prompt.push_str(section.header());
        prompt.push('\n');
        if section == Section::Title {
            prompt.push_str(TITLE_DIRECTIVE);
            prompt.push_str("\nQuestion: ");
            prompt.push_str(&query.query);
            prompt.push_str("\n\nContext:\n");
            prompt.push_str(context);
            prompt.push_str("\n\n");
        }
        prompt.push_str(section.seed(query));
        prompt.push_str("\n\n");
    }

    prompt.truncate(prompt.trim_end().len());
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> TaxQuery {
        TaxQuery {
            query: "Is software a capital asset?".into(),
            title: "<title>".into(),
            tax_research: "<research>".into(),
            tax_citations: "<name> | <url>".into(),
            draft_client_response: "<draft>".into(),
            clarifying_questions: "<questions>".into(),
            confirmation: "<confirmation>".into(),
        }
    }

    /// Positions of lines that are exactly a header token.
    fn header_lines(prompt: &str) -> Vec<(usize, Section)> {
        prompt
            .lines()
            .enumerate()
            .filter_map(|(i, line)| {
                Section::ALL
                    .into_iter()
                    .find(|s| s.header() == line)
                    .map(|s| (i, s))
            })
            .collect()
    }

    #[test]
    fn headers_appear_once_each_in_order() {
        let prompt = build_prompt(&query(), "Section: ITAA 1997 s40-30\nSoftware may be...");
        let sections: Vec<Section> = header_lines(&prompt).into_iter().map(|(_, s)| s).collect();
        assert_eq!(sections, Section::ALL.to_vec());
    }

    #[test]
    fn seeds_follow_their_headers() {
        let prompt = build_prompt(&query(), "ctx");
        let lines: Vec<&str> = prompt.lines().collect();
        for (i, section) in header_lines(&prompt) {
            if section == Section::Title {
                continue;
            }
            assert_eq!(lines[i + 1], section.seed(&query()), "{section:?}");
        }
    }

    #[test]
    fn title_section_carries_question_and_context() {
        let prompt = build_prompt(&query(), "Section: ITAA 1997 s40-30\nSoftware may be...");
        let title_at = prompt.find("\n[TITLE]\n").unwrap();
        let research_at = prompt.find("\n[TAX_RESEARCH]\n").unwrap();
        let title_block = &prompt[title_at..research_at];
        assert!(title_block.contains(TITLE_DIRECTIVE));
        assert!(title_block.contains("Question: Is software a capital asset?"));
        assert!(title_block.contains("Section: ITAA 1997 s40-30\nSoftware may be..."));
        assert!(title_block.contains("<title>"));
    }

    #[test]
    fn empty_context_is_tolerated() {
        let prompt = build_prompt(&query(), "");
        assert!(prompt.contains("Context:\n"));
        assert_eq!(header_lines(&prompt).len(), 6);
    }

    #[test]
    fn deterministic() {
        assert_eq!(build_prompt(&query(), "ctx"), build_prompt(&query(), "ctx"));
    }

    #[test]
    fn ends_with_confirmation_seed() {
        let prompt = build_prompt(&query(), "ctx");
        assert!(prompt.ends_with("[CONFIRMATION]\n<confirmation>"));
    }

    #[test]
    fn preamble_describes_citation_format() {
        let prompt = build_prompt(&query(), "");
        assert!(prompt.contains("one citation per line"));
        assert!(prompt.starts_with("You are an expert tax law research assistant."));
    }
}
