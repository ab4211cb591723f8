//! Fenced-code-block extraction from completed message bodies.

/// The fence marker for a code block.
const FENCE: &str = "```";

/// Find all the fenced code blocks in the provided markdown string, in order
/// of appearance.
///
/// An opening fence is any line starting with three backticks (a language tag
/// may follow); a closing fence is a line that is exactly three backticks.
/// Each line inside a block is reproduced verbatim with a trailing newline.
/// A block left unterminated at end of input is dropped.
pub fn extract_code_blocks(s: &str) -> Vec<String> {
    let mut output = Vec::new();
    let mut current: Option<String> = None;
    for line in s.split('\n') {
        if let Some(mut block) = current.take() {
            if line == FENCE {
                output.push(block);
            } else {
                block.push_str(line);
                block.push('\n');
                current = Some(block);
            }
        } else if line.starts_with(FENCE) {
            current = Some(String::new());
        }
    }
    output
}
