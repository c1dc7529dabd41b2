pub const THINK_OPEN: &str = "<think>";
pub const THINK_CLOSE: &str = "</think>";

/// Removes `<think>...</think>` blocks and trims the remainder.
///
/// Each opening marker pairs with the nearest closing marker after it, and
/// the block may span any number of lines. An opening marker without a
/// closing one is left in the text. Removal repeats until no complete block
/// remains, so the result is stable under a second pass.
pub fn strip_reasoning(raw: &str) -> String {
    let mut text = strip_blocks(raw);
    loop {
        let next = strip_blocks(&text);
        if next == text {
            break;
        }
        text = next;
    }
    text.trim().to_string()
}

fn strip_blocks(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(open) = rest.find(THINK_OPEN) {
        let after_open = &rest[open + THINK_OPEN.len()..];
        match after_open.find(THINK_CLOSE) {
            Some(close) => {
                out.push_str(&rest[..open]);
                rest = &after_open[close + THINK_CLOSE.len()..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_reasoning_block() {
        assert_eq!(
            strip_reasoning("<think>...details...</think>Consult a Cardiologist."),
            "Consult a Cardiologist."
        );
    }

    #[test]
    fn strips_multiline_block_and_surrounding_whitespace() {
        let raw = "<think>\nChest pain and cough.\nLungs, probably.\n</think>\n\nConsult a Pulmonologist.\n";
        assert_eq!(strip_reasoning(raw), "Consult a Pulmonologist.");
    }

    #[test]
    fn strips_every_block_non_greedily() {
        let raw = "<think>a</think>Consult a <think>b</think>Neurologist.";
        assert_eq!(strip_reasoning(raw), "Consult a Neurologist.");
    }

    #[test]
    fn plain_text_is_only_trimmed() {
        assert_eq!(
            strip_reasoning("  Consult a Dermatologist.\n"),
            "Consult a Dermatologist."
        );
    }

    #[test]
    fn unterminated_block_is_kept() {
        assert_eq!(
            strip_reasoning(" <think>still thinking "),
            "<think>still thinking"
        );
    }

    #[test]
    fn reasoning_only_output_becomes_empty() {
        assert_eq!(strip_reasoning("<think>hmm</think>   "), "");
    }

    #[test]
    fn sanitizing_twice_changes_nothing() {
        let inputs = [
            "<think>x</think> Consult an ENT specialist. ",
            "<th<think>x</think>ink>y</think>Consult a Urologist.",
            "<think>open only",
            "   ",
        ];
        for raw in inputs {
            let once = strip_reasoning(raw);
            assert_eq!(strip_reasoning(&once), once, "input: {raw:?}");
        }
    }

    #[test]
    fn nested_marker_created_by_removal_is_removed_too() {
        assert_eq!(
            strip_reasoning("<th<think>x</think>ink>y</think>Consult a Urologist."),
            "Consult a Urologist."
        );
    }
}
