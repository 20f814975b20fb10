use kyoshi_types::PatternRecord;

/// Separator the tutor places between grammar-pattern segments.
pub const DELIMITER: &str = "---";

/// Fixed first line of a grammar response, stripped before segmentation.
pub const PREAMBLE_MARKER: &str = "Grammar form. Found.";

pub const UNKNOWN_FORM: &str = "Unknown Form";

/// Incremental segmentation of a streamed grammar explanation.
///
/// Fragments arrive with arbitrary boundaries, so everything goes through a
/// persistent buffer; the delimiter or the preamble marker may be split
/// across fragments and only completes once the rest arrives. A record is
/// emitted exactly once, the moment its trailing delimiter is observed.
#[derive(Debug, Default)]
pub struct SegmentParser {
    buffer: String,
    preamble_stripped: bool,
}

impl SegmentParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one fragment; returns the records it completed, in stream order.
    pub fn push(&mut self, fragment: &str) -> Vec<PatternRecord> {
        self.buffer.push_str(fragment);

        if !self.preamble_stripped {
            if let Some(pos) = self.buffer.find(PREAMBLE_MARKER) {
                self.buffer
                    .replace_range(pos..pos + PREAMBLE_MARKER.len(), "");
                self.buffer = self.buffer.trim().to_string();
                self.preamble_stripped = true;
            }
        }

        let mut records = Vec::new();
        while let Some(pos) = self.buffer.find(DELIMITER) {
            let segment = self.buffer[..pos].to_string();
            self.buffer.drain(..pos + DELIMITER.len());
            if let Some(record) = split_segment(&segment) {
                records.push(record);
            }
        }
        records
    }

    /// Flush whatever remains after the stream ends, using the same
    /// splitting rule as a delimited segment.
    pub fn finish(mut self) -> Option<PatternRecord> {
        let rest = std::mem::take(&mut self.buffer);
        split_segment(&rest)
    }
}

/// First non-empty line becomes the form, the remaining lines the
/// explanation. Segments with no explanation text are dropped.
fn split_segment(segment: &str) -> Option<PatternRecord> {
    let segment = segment.trim();
    if segment.is_empty() {
        return None;
    }

    let mut lines = segment.lines();
    let form = lines
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .unwrap_or(UNKNOWN_FORM);
    let explanation = lines.collect::<Vec<_>>().join("\n").trim().to_string();
    if explanation.is_empty() {
        return None;
    }

    Some(PatternRecord {
        form: form.to_string(),
        explanation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(fragments: &[&str]) -> Vec<PatternRecord> {
        let mut parser = SegmentParser::new();
        let mut records = Vec::new();
        for fragment in fragments {
            records.extend(parser.push(fragment));
        }
        records.extend(parser.finish());
        records
    }

    #[test]
    fn splits_delimited_segments_across_fragment_boundary() {
        let records = collect(&[
            "**N+から**\nExplanation one.\n--",
            "-\n**V+始める**\nExplanation two.",
        ]);

        assert_eq!(
            records,
            vec![
                PatternRecord {
                    form: "**N+から**".to_string(),
                    explanation: "Explanation one.".to_string(),
                },
                PatternRecord {
                    form: "**V+始める**".to_string(),
                    explanation: "Explanation two.".to_string(),
                },
            ]
        );
    }

    #[test]
    fn chunking_does_not_change_the_result() {
        let text = "Grammar form. Found.\n\n**N(time) + から**\nから shows a starting point.\n---\n**V-る + 始める**\n始める marks the start of an action.\n---\n**に + 登る**\nDirection particle with a motion verb.";

        let whole = collect(&[text]);
        assert_eq!(whole.len(), 3);

        // every split point, including mid-delimiter and mid-marker
        for split in 1..text.len() {
            if !text.is_char_boundary(split) {
                continue;
            }
            let (a, b) = text.split_at(split);
            assert_eq!(collect(&[a, b]), whole, "split at byte {split}");
        }
    }

    #[test]
    fn preamble_marker_is_stripped_once() {
        let records = collect(&["Grammar form. Fo", "und.\n**形**\nBody text."]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].form, "**形**");
        assert_eq!(records[0].explanation, "Body text.");
    }

    #[test]
    fn empty_segments_are_discarded() {
        let records = collect(&["---\n   \n---\n**A**\nkeeps this one\n---"]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].form, "**A**");
    }

    #[test]
    fn segment_without_explanation_is_dropped() {
        let records = collect(&["**lonely form**\n---\n**B**\nhas a body"]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].form, "**B**");
    }

    #[test]
    fn residual_buffer_is_flushed_on_finish() {
        let mut parser = SegmentParser::new();
        assert!(parser.push("**C**\ntail explanation").is_empty());
        let last = parser.finish().expect("flushed record");
        assert_eq!(last.form, "**C**");
        assert_eq!(last.explanation, "tail explanation");
    }

    #[test]
    fn multiline_explanations_keep_interior_newlines() {
        let records = collect(&["**D**\nline one\nline two\n---"]);
        assert_eq!(records[0].explanation, "line one\nline two");
    }

    #[test]
    fn empty_stream_yields_nothing() {
        assert!(collect(&[]).is_empty());
        assert!(collect(&["", "  ", "\n"]).is_empty());
    }
}
