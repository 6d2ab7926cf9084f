/// Split a unit into sentences for read aloud.
///
/// Whitespace runs collapse to a single space, then the text breaks after
/// `.`, `!` or `?` wherever whitespace follows. Terminators stay with their
/// sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);

        if word.ends_with(['.', '!', '?']) {
            sentences.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        sentences.push(current);
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_each_terminator() {
        assert_eq!(
            split_sentences("Stop. Go now! Really?"),
            vec!["Stop.", "Go now!", "Really?"]
        );
    }

    #[test]
    fn collapses_whitespace_and_keeps_tail() {
        assert_eq!(
            split_sentences("  One\n\ttwo.   Three   four "),
            vec!["One two.", "Three four"]
        );
    }

    #[test]
    fn terminator_without_following_space_does_not_split() {
        assert_eq!(split_sentences("v1.2 is out.Next"), vec!["v1.2 is out.Next"]);
        assert_eq!(split_sentences("Wait...what? Yes."), vec!["Wait...what?", "Yes."]);
    }

    #[test]
    fn empty_and_blank_input() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences(" \n\t ").is_empty());
    }

    #[test]
    fn joined_sentences_reconstruct_normalized_text() {
        let inputs = [
            "Hello there.  General\nKenobi! You are a bold one?",
            "no terminator at all",
            "A. B. C.",
            "  Ends with space after bang!   ",
        ];
        for input in inputs {
            let normalized = input.split_whitespace().collect::<Vec<_>>().join(" ");
            assert_eq!(split_sentences(input).join(" "), normalized, "input: {input:?}");
        }
    }
}
