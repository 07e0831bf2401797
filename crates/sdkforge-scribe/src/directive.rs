//! Scanner for the inline directive syntax embedded in generated text:
//!
//! - `(( fragmentName : fragmentPath ))` renders a named fragment template;
//! - `((#operationName)) ... ((/operationName))` pipes the enclosed text
//!   through a named transform.
//!
//! A single forward pass: scan for `((`, classify, scan to the first
//! closing delimiter. Directives never nest; anything that does not form a
//! complete directive is plain text.

/// One scanned piece of the input.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment<'a> {
    Text(&'a str),
    Fragment { name: String, path: String },
    Block { name: String, body: &'a str },
}

const OPEN: &str = "((";
const CLOSE: &str = "))";

pub fn scan(input: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = input;

    while let Some(open) = rest.find(OPEN) {
        let after = &rest[open + OPEN.len()..];
        let Some(end) = after.find(CLOSE) else {
            // No closing delimiter anywhere: the rest is plain text.
            break;
        };
        let content = &after[..end];

        if let Some(op_name) = content.trim().strip_prefix('#') {
            let name = op_name.trim();
            let tail = &after[end + CLOSE.len()..];
            let closer = format!("((/{name}))");
            if let Some(body_end) = tail.find(&closer) {
                push_text(&mut segments, &rest[..open]);
                segments.push(Segment::Block {
                    name: name.to_string(),
                    body: &tail[..body_end],
                });
                rest = &tail[body_end + closer.len()..];
            } else {
                // Unterminated block: emit through the head as plain text.
                push_text(&mut segments, &rest[..open + OPEN.len() + end + CLOSE.len()]);
                rest = tail;
            }
        } else if let Some((name, path)) = content.split_once(':') {
            push_text(&mut segments, &rest[..open]);
            segments.push(Segment::Fragment {
                name: name.trim().to_string(),
                path: path.trim().to_string(),
            });
            rest = &after[end + CLOSE.len()..];
        } else {
            // Parenthesised text that is not a directive.
            push_text(&mut segments, &rest[..open + OPEN.len() + end + CLOSE.len()]);
            rest = &after[end + CLOSE.len()..];
        }
    }

    push_text(&mut segments, rest);
    segments
}

fn push_text<'a>(segments: &mut Vec<Segment<'a>>, text: &'a str) {
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(scan("no directives"), vec![Segment::Text("no directives")]);
        assert_eq!(scan(""), Vec::<Segment>::new());
    }

    #[test]
    fn test_fragment_directive() {
        let segments = scan("before (( header : models/widget )) after");
        assert_eq!(
            segments,
            vec![
                Segment::Text("before "),
                Segment::Fragment {
                    name: "header".to_string(),
                    path: "models/widget".to_string(),
                },
                Segment::Text(" after"),
            ]
        );
    }

    #[test]
    fn test_adjacent_fragments_resolve_independently() {
        let segments = scan("(( f : p )) (( g : q ))");
        assert_eq!(
            segments,
            vec![
                Segment::Fragment {
                    name: "f".to_string(),
                    path: "p".to_string(),
                },
                Segment::Text(" "),
                Segment::Fragment {
                    name: "g".to_string(),
                    path: "q".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_block_directive() {
        let segments = scan("x ((#comment))two\nlines((/comment)) y");
        assert_eq!(
            segments,
            vec![
                Segment::Text("x "),
                Segment::Block {
                    name: "comment".to_string(),
                    body: "two\nlines",
                },
                Segment::Text(" y"),
            ]
        );
    }

    #[test]
    fn test_no_nesting_inside_path() {
        // The inner open delimiter lands in the path; the scan stops at
        // the first close, it is never parsed recursively.
        let segments = scan("(( f : (( g )) ))");
        assert_eq!(
            segments,
            vec![
                Segment::Fragment {
                    name: "f".to_string(),
                    path: "(( g".to_string(),
                },
                Segment::Text(" ))"),
            ]
        );
    }

    #[test]
    fn test_unterminated_directive_is_text() {
        assert_eq!(
            scan("text (( broken"),
            vec![Segment::Text("text (( broken")]
        );
    }

    #[test]
    fn test_unterminated_block_is_text() {
        assert_eq!(
            scan("((#upper)) never closed"),
            vec![
                Segment::Text("((#upper))"),
                Segment::Text(" never closed"),
            ]
        );
    }

    #[test]
    fn test_parenthesised_text_is_not_a_directive() {
        assert_eq!(
            scan("math (( x )) here"),
            vec![Segment::Text("math (( x ))"), Segment::Text(" here")]
        );
    }

    #[test]
    fn test_block_body_is_not_rescanned() {
        let segments = scan("((#keep))inner (( f : p ))((/keep))");
        assert_eq!(
            segments,
            vec![Segment::Block {
                name: "keep".to_string(),
                body: "inner (( f : p ))",
            }]
        );
    }
}
