//! Argument extraction under LaTeX grouping rules.
//!
//! All indices are byte offsets into the input. Every extractor returns an index
//! `next` with `start <= next <= input.len()` when `start` is in bounds, also on
//! unterminated groups, so callers always make progress.

/// Characters that form a one-character control sequence after a backslash
const PUNCTUATION_ESCAPES: &[u8] = b",!;";

/// A required or optional argument: its content and the index just past it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argument<'a> {
    pub content: &'a str,
    pub next: usize,
}

/// Subscript and superscript found after a command, keyed by role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubSup<'a> {
    pub lower: Option<Argument<'a>>,
    pub upper: Option<Argument<'a>>,
    pub next: usize,
}

/// Length of the control sequence starting at `start`: a backslash followed by
/// ASCII letters or by one of the punctuation escapes.
pub fn control_sequence_len(input: &str, start: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    if bytes.get(start) != Some(&b'\\') {
        return None;
    }

    let letters = bytes[start + 1..]
        .iter()
        .take_while(|b| b.is_ascii_alphabetic())
        .count();
    if letters > 0 {
        return Some(1 + letters);
    }

    match bytes.get(start + 1) {
        Some(b) if PUNCTUATION_ESCAPES.contains(b) => Some(2),
        _ => None,
    }
}

/// The token at `start`: a control sequence, a lone backslash, or one character.
/// Returns `None` at the end of input or off a character boundary.
pub fn token_at(input: &str, start: usize) -> Option<&str> {
    if let Some(len) = control_sequence_len(input, start) {
        return Some(&input[start..start + len]);
    }
    let c = input.get(start..)?.chars().next()?;
    Some(&input[start..start + c.len_utf8()])
}

fn skip_spaces(input: &str, start: usize) -> usize {
    let bytes = input.as_bytes();
    let mut i = start;
    while bytes.get(i) == Some(&b' ') {
        i += 1;
    }
    i
}

/// Extract the group opened at `open_at`, counting nested `open`/`close` pairs.
/// An unterminated group runs to the end of input.
fn extract_group(input: &str, open_at: usize, open: u8, close: u8) -> Argument<'_> {
    let content_start = open_at + 1;
    let mut depth = 1usize;

    for (offset, &b) in input.as_bytes()[content_start..].iter().enumerate() {
        if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                let end = content_start + offset;
                return Argument {
                    content: &input[content_start..end],
                    next: end + 1,
                };
            }
        }
    }

    Argument {
        content: &input[content_start..],
        next: input.len(),
    }
}

/// Extract the next argument at `start`.
///
/// Leading spaces are skipped. The argument is then one of:
/// - a whole control sequence such as `\alpha`
/// - the contents of a brace group, up to the matching `}`
/// - the single next character
pub fn extract_argument(input: &str, start: usize) -> Argument<'_> {
    if start >= input.len() {
        return Argument {
            content: "",
            next: start,
        };
    }

    let i = skip_spaces(input, start);
    if input.as_bytes().get(i) == Some(&b'{') {
        return extract_group(input, i, b'{', b'}');
    }

    match token_at(input, i) {
        Some(token) => Argument {
            content: token,
            next: i + token.len(),
        },
        // Only spaces were left
        None => Argument {
            content: "",
            next: i.min(input.len()),
        },
    }
}

/// Extract a bracketed optional argument at `start`, if there is one
pub fn extract_optional(input: &str, start: usize) -> Option<Argument<'_>> {
    let i = skip_spaces(input, start);
    (input.as_bytes().get(i) == Some(&b'['))
        .then(|| extract_group(input, i, b'[', b']'))
}

impl<'a> SubSup<'a> {
    fn place(&mut self, marker: u8, arg: Argument<'a>) {
        if marker == b'_' {
            self.lower = Some(arg);
        } else {
            self.upper = Some(arg);
        }
        self.next = arg.next;
    }
}

/// A `_` or `^` after optional spaces, with the argument that follows it
fn script_at(input: &str, start: usize) -> Option<(u8, Argument<'_>)> {
    let i = skip_spaces(input, start);
    let marker = *input
        .as_bytes()
        .get(i)
        .filter(|b| matches!(b, b'_' | b'^'))?;
    Some((marker, extract_argument(input, i + 1)))
}

/// Extract a subscript and/or superscript at `start`, in either order.
///
/// `_a^b` and `^b_a` both give `lower = a` and `upper = b`. If neither is
/// present `next` is `start` unchanged.
pub fn extract_subsup(input: &str, start: usize) -> SubSup<'_> {
    let mut result = SubSup {
        lower: None,
        upper: None,
        next: start,
    };

    let Some((first, arg)) = script_at(input, start) else {
        return result;
    };
    result.place(first, arg);

    // A repeated marker is not a partner and stays unconsumed
    if let Some((second, arg)) = script_at(input, result.next).filter(|(m, _)| *m != first) {
        result.place(second, arg);
    }
    result
}
