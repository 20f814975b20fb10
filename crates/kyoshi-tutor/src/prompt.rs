//! Prompt text for the Gemini tutor. The grammar prompt pins down the
//! response format the segment parser relies on: the fixed preamble line,
//! one bold form line per pattern, and `---` between patterns.

use kyoshi_types::GrammarInput;

pub const SYSTEM_PROMPT: &str = "You are a friendly and expert Japanese language tutor, fluent in both Japanese and conversational Burmese. Your student is from Myanmar and is learning Japanese from English textbooks. Your explanations must be in natural, everyday Burmese that a young person would use, not overly formal or academic.

Follow the specific formatting instructions for each task precisely. Use markdown for emphasis where appropriate.
";

const GRAMMAR_PROMPT: &str = r#"Analyze the following Japanese content. Identify every grammar pattern present, including simple particles, verb conjugations, and complex structures. Handle multiple and overlapping patterns.

Start your entire response with the exact line: "Grammar form. Found."

Then, for each distinct grammar pattern you identify, provide the following format:
- A line with the grammar structure in its general, dictionary form, enclosed in bold markdown (e.g., **V-る + 始める**, **N + から**).
- Following that, a concise explanation (3-8 sentences) in natural, conversational Burmese about the grammar's meaning and usage.

Separate each grammar pattern entry with a horizontal rule (---).

Example for input "朝8時から富士山に登る始めた。":
Grammar form. Found.

**N(time) + から**
(Explanation in Burmese...)
---
**V-る + 始める**
(Explanation in Burmese...)

Content to analyze is below:
---
"#;

/// Instruction text for a grammar request. For text input the content is
/// appended inline; for an image the instruction stands alone and the image
/// travels as a separate part.
pub fn grammar_prompt(input: &GrammarInput) -> String {
    match input {
        GrammarInput::Text(text) => format!("{GRAMMAR_PROMPT}{text}"),
        GrammarInput::Image { .. } => GRAMMAR_PROMPT.to_string(),
    }
}

pub fn vocabulary_prompt(word: &str) -> String {
    format!(
        "Explain the Japanese vocabulary word: **{word}**

Provide the following:
1.  **Definition (Burmese):** A clear definition in natural, conversational Burmese. Explain any nuances.
2.  **Example Sentences:** Provide two distinct examples of how to use this word. For each example, include:
    *   Japanese sentence (with furigana).
    *   Romaji transliteration.
    *   A natural Burmese translation.
"
    )
}
