//! Prompt construction for transcript analysis.

use crate::types::analysis::Request;

const RESPONSE_SCHEMA: &str = r#"{
  "summary": "A concise narrative summary of the meeting (2-4 paragraphs)",
  "topics": [
    {"title": "Topic title", "description": "What was discussed", "importance": 3}
  ],
  "keyPoints": [
    {"point": "An important statement or decision", "context": "Optional context", "speaker": "Optional speaker name or label"}
  ],
  "actionItems": [
    {"item": "What needs to be done", "assignee": "Optional person responsible", "priority": "high | medium | low"}
  ],
  "speakerNames": [
    {"speakerIndex": 0, "name": "Name of the person speaking as Speaker 0"}
  ],
  "meetingDocument": "A well structured Markdown document covering the whole meeting"
}"#;

/// Builds the single prompt sent to the analysis model.
pub fn build_analysis_prompt(request: &Request) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "You are an assistant that analyzes meeting transcripts. \
         Each transcript line is prefixed with the speaker, for example `[Speaker 0]:`.\n\n",
    );
    prompt.push_str(&format!(
        "Write every part of your answer in {} ({}).\n\n",
        request.language.name(),
        request.language.code()
    ));

    prompt.push_str("Instructions:\n");
    prompt.push_str(
        "- Extract ALL relevant topics, key points and action items. Do not limit the \
         number of entries; include everything of substance.\n",
    );
    prompt.push_str("- Rate each topic's importance from 1 (minor) to 5 (central).\n");
    prompt.push_str(
        "- Give every action item a priority of high, medium or low, and an assignee \
         only when one is stated in the meeting.\n",
    );
    prompt.push_str(
        "- Only fill speakerNames when a speaker explicitly introduces themselves or is \
         directly addressed by name. Never guess a name. Omit speakers you cannot \
         identify.\n",
    );

    if let Some(instructions) = request
        .custom_instructions
        .as_deref()
        .map(str::trim)
        .filter(|i| !i.is_empty())
    {
        prompt.push_str(&format!(
            "\nAdditional instructions from the user:\n{instructions}\n"
        ));
    }

    prompt.push_str(
        "\nRespond with exactly one JSON object and nothing else, using this structure:\n",
    );
    prompt.push_str(RESPONSE_SCHEMA);
    prompt.push_str("\n\nTranscript:\n");
    prompt.push_str(&request.transcript_text);
    prompt.push('\n');

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity::language::Language;

    fn request(custom_instructions: Option<&str>) -> Request {
        Request {
            transcript_text: "[Speaker 0]: Guten Morgen.".to_string(),
            language: Language::De,
            custom_instructions: custom_instructions.map(str::to_string),
        }
    }

    #[test]
    fn prompt_names_the_target_language_and_includes_the_transcript() {
        let prompt = build_analysis_prompt(&request(None));
        assert!(prompt.contains("German (de)"));
        assert!(prompt.contains("[Speaker 0]: Guten Morgen."));
        assert!(prompt.contains("\"speakerNames\""));
        assert!(!prompt.contains("Additional instructions"));
    }

    #[test]
    fn prompt_includes_custom_instructions_when_present() {
        let prompt = build_analysis_prompt(&request(Some("Focus on hiring decisions")));
        assert!(prompt.contains("Additional instructions from the user:\nFocus on hiring decisions"));
    }

    #[test]
    fn blank_custom_instructions_are_ignored() {
        let prompt = build_analysis_prompt(&request(Some("   ")));
        assert!(!prompt.contains("Additional instructions"));
    }
}
