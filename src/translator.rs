use std::io::{self, BufRead, Read};
use std::path::Path;

use log::{trace, warn};

use crate::args::{self, extract_argument};
use crate::entry::{Entry, Template, TemplatePart};
use crate::error::Result;
use crate::procedures;
use crate::table::CommandTable;

/// Output buffer that never doubles a separator the engine emitted itself.
///
/// `trailing_separator` is set only while the buffer ends with a separator
/// pushed by `push_separator`. Source text and procedure output never set it.
struct Output<'s> {
    buf: String,
    separator: &'s str,
    trailing_separator: bool,
}

impl<'s> Output<'s> {
    fn new(separator: &'s str) -> Self {
        Self {
            buf: String::new(),
            separator,
            trailing_separator: false,
        }
    }

    /// Append a piece, dropping its leading separator if the engine just
    /// emitted one
    fn push(&mut self, piece: &str) {
        if piece.is_empty() {
            return;
        }
        let piece = if self.trailing_separator {
            piece.strip_prefix(self.separator).unwrap_or(piece)
        } else {
            piece
        };
        self.trailing_separator = false;
        self.buf.push_str(piece);
    }

    /// Append a piece exactly as given
    fn push_verbatim(&mut self, piece: &str) {
        if piece.is_empty() {
            return;
        }
        self.trailing_separator = false;
        self.buf.push_str(piece);
    }

    fn push_separator(&mut self) {
        if self.trailing_separator {
            return;
        }
        self.buf.push_str(self.separator);
        self.trailing_separator = !self.separator.is_empty();
    }

    fn finish(self) -> String {
        self.buf
    }
}

/// LaTeX to braille/speech translator.
///
/// Scans its input left to right and looks every control sequence or character
/// up in its [`CommandTable`]. Unknown tokens pass through unchanged.
/// Configuration changes need `&mut self`, so they can never race a running
/// translation.
#[derive(Debug, Clone)]
pub struct Translator {
    table: CommandTable,
    separator: String,
    remove_dollars: bool,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

impl Translator {
    /// Translator with the builtin procedures (`\text`, `\displaystyle`,
    /// `\phantom`, `$`, ...) registered
    pub fn new() -> Self {
        let mut translator = Self::with_table(CommandTable::new());
        procedures::register_builtins(&mut translator.table);
        translator
    }

    /// Translator using exactly `table`, no builtins
    pub fn with_table(table: CommandTable) -> Self {
        Self {
            table,
            separator: String::new(),
            remove_dollars: false,
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_remove_dollars(mut self, remove_dollars: bool) -> Self {
        self.remove_dollars = remove_dollars;
        self
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut CommandTable {
        &mut self.table
    }

    /// Swap in a new table, returning the previous one
    pub fn set_table(&mut self, table: CommandTable) -> CommandTable {
        std::mem::replace(&mut self.table, table)
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn set_separator(&mut self, separator: impl Into<String>) {
        self.separator = separator.into();
    }

    pub fn remove_dollars(&self) -> bool {
        self.remove_dollars
    }

    pub fn set_remove_dollars(&mut self, remove_dollars: bool) {
        self.remove_dollars = remove_dollars;
    }

    /// Flip dollar suppression, returning the new setting
    pub fn toggle_remove_dollars(&mut self) -> bool {
        self.remove_dollars = !self.remove_dollars;
        self.remove_dollars
    }

    /// Load a table file into this translator's table
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        self.table.load_file(path)
    }

    /// Load several table files in order, later files overriding earlier ones.
    /// Returns the total number of entries read.
    pub fn load_files<I, P>(&mut self, paths: I) -> Result<usize>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut total = 0;
        for path in paths {
            total += self.table.load_file(path)?;
        }
        Ok(total)
    }

    /// Translate a string of LaTeX (main entry point)
    pub fn translate(&self, input: &str) -> String {
        let mut output = Output::new(&self.separator);
        self.translate_into(input, &mut output);
        output.finish()
    }

    /// Format a template entry whose command ended at `start`.
    ///
    /// Returns the translated fragment and the index past the last consumed
    /// argument.
    pub fn general_command(
        &self,
        input: &str,
        start: usize,
        template: &Template,
    ) -> (String, usize) {
        let mut output = Output::new(&self.separator);
        let next = self.format_template(input, start, template, &mut output);
        (output.finish(), next)
    }

    // Nested arguments are written into the caller's buffer, so separators
    // collapse across recursion levels.
    fn translate_into(&self, input: &str, output: &mut Output<'_>) {
        let mut i = 0;

        while let Some(token) = args::token_at(input, i) {
            let after = i + token.len();
            i = match self.table.get(token) {
                None => {
                    output.push(token);
                    after
                }
                Some(Entry::Literal(value)) => {
                    trace!("{token}: literal");
                    output.push_separator();
                    output.push(value);
                    output.push_separator();
                    after
                }
                Some(Entry::Template(template)) => {
                    trace!("{token}: template with {} arguments", template.arity());
                    self.format_template(input, after, template, output)
                }
                Some(Entry::Procedure(procedure)) => {
                    trace!("{token}: procedure");
                    let (fragment, next) = procedure.call(self, input, after);
                    output.push_verbatim(&fragment);
                    clamp_next(input, token, after, next)
                }
            };
        }
    }

    fn format_template(
        &self,
        input: &str,
        start: usize,
        template: &Template,
        output: &mut Output<'_>,
    ) -> usize {
        let mut next = start;

        match template {
            Template::Delimiters(delimiters) => {
                let Some((first, rest)) = delimiters.split_first() else {
                    return start;
                };
                output.push_separator();
                output.push(first);
                output.push_separator();
                for delimiter in rest {
                    let arg = extract_argument(input, next);
                    self.translate_into(arg.content, output);
                    output.push_separator();
                    output.push(delimiter);
                    output.push_separator();
                    next = arg.next;
                }
            }
            Template::Indexed { arity, parts } => {
                let mut arguments = Vec::with_capacity(*arity);
                for _ in 0..*arity {
                    let arg = extract_argument(input, next);
                    arguments.push(arg.content);
                    next = arg.next;
                }

                output.push_separator();
                for part in parts {
                    match part {
                        TemplatePart::Text(text) => output.push(text),
                        TemplatePart::Arg(n) => {
                            let Some(content) = n.checked_sub(1).and_then(|k| arguments.get(k))
                            else {
                                warn!("template argument {n} out of range 1..={arity}");
                                continue;
                            };
                            self.translate_into(content, output);
                        }
                    }
                    output.push_separator();
                }
            }
        }

        next
    }
}

/// Keep a procedure's returned index within `after..=input.len()` and on a
/// character boundary.
fn clamp_next(input: &str, token: &str, after: usize, next: usize) -> usize {
    let mut clamped = next.clamp(after, input.len());
    if clamped != next {
        warn!("procedure for {token} returned index {next}, clamped to {clamped}");
    }
    while !input.is_char_boundary(clamped) {
        clamped += 1;
    }
    clamped
}

/// A reader that translates a LaTeX source one line at a time
pub struct TranslatingReader<'t, R: BufRead> {
    inner: R,
    translator: &'t Translator,
    buffer: Vec<u8>,
    buffer_pos: usize,
    done: bool,
}

impl<'t, R: BufRead> TranslatingReader<'t, R> {
    pub fn new(inner: R, translator: &'t Translator) -> Self {
        Self {
            inner,
            translator,
            buffer: Vec::new(),
            buffer_pos: 0,
            done: false,
        }
    }

    fn fill_buffer(&mut self) -> io::Result<()> {
        let mut line = String::new();
        // Fails with InvalidData on non UTF-8 input
        if self.inner.read_line(&mut line)? == 0 {
            self.done = true;
            return Ok(());
        }

        let (body, terminator) = match line.strip_suffix('\n') {
            Some(rest) => match rest.strip_suffix('\r') {
                Some(body) => (body, "\r\n"),
                None => (rest, "\n"),
            },
            None => (line.as_str(), ""),
        };

        self.buffer.clear();
        self.buffer_pos = 0;
        self.buffer
            .extend_from_slice(self.translator.translate(body).as_bytes());
        self.buffer.extend_from_slice(terminator.as_bytes());
        Ok(())
    }
}

impl<R: BufRead> Read for TranslatingReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // A line may translate to nothing, keep going until there is output
        while self.buffer_pos >= self.buffer.len() && !self.done {
            self.fill_buffer()?;
        }

        if self.buffer_pos >= self.buffer.len() {
            return Ok(0);
        }

        let available = self.buffer.len() - self.buffer_pos;
        let to_copy = std::cmp::min(available, buf.len());
        buf[..to_copy].copy_from_slice(&self.buffer[self.buffer_pos..self.buffer_pos + to_copy]);
        self.buffer_pos += to_copy;

        Ok(to_copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> Translator {
        Translator::with_table(CommandTable::new())
    }

    #[test]
    fn test_plain_text_passes_through() {
        let translator = Translator::new();
        let input = "x + y = 3 (mod 7), naïve!";
        assert_eq!(translator.translate(input), input);
        assert_eq!(translator.translate(""), "");
    }

    #[test]
    fn test_unregistered_command_passes_through() {
        let translator = empty();
        assert_eq!(translator.translate("\\unknowncmd{x}"), "\\unknowncmd{x}");
        assert_eq!(translator.translate("a\\\\b\\"), "a\\\\b\\");
    }

    #[test]
    fn test_literal_with_separator() {
        let mut translator = empty().with_separator(" ");
        translator.table_mut().insert("\\alpha", "ALPHA");
        assert_eq!(translator.translate("a\\alpha b"), "a ALPHA b");
    }

    #[test]
    fn test_literal_without_separator() {
        let mut translator = empty();
        translator.table_mut().insert("\\alpha", "ALPHA");
        translator.table_mut().insert("\\,", "");
        assert_eq!(translator.translate("a\\alpha b\\,c"), "aALPHA bc");
    }

    #[test]
    fn test_separator_not_doubled() {
        let mut translator = empty().with_separator(" ");
        translator.table_mut().insert("\\alpha", "ALPHA");
        translator.table_mut().insert("\\beta", "BETA");
        assert_eq!(translator.translate("\\alpha\\beta"), " ALPHA BETA ");
        // Spaces from the source are never removed
        assert_eq!(translator.translate("x \\alpha"), "x  ALPHA ");
    }

    #[test]
    fn test_plain_text_keeps_spacing_with_separator() {
        let translator = empty().with_separator(" ");
        assert_eq!(translator.translate("x  y"), "x  y");
        assert_eq!(translator.translate(" a ,  b "), " a ,  b ");
    }

    #[test]
    fn test_separator_collapses_across_nested_arguments() {
        let mut translator = empty().with_separator(" ");
        translator.table_mut().insert("\\alpha", "ALPHA");
        translator
            .table_mut()
            .insert("\\frac", Template::delimiters(["(", "/", ")"]));
        assert_eq!(
            translator.translate("\\frac{\\alpha}{\\alpha\\alpha}"),
            " ( ALPHA / ALPHA ALPHA ) "
        );
        let frac = Template::delimiters(["(", "/", ")"]);
        let (fragment, next) = translator.general_command("\\frac\\alpha b", 5, &frac);
        assert_eq!((fragment.as_str(), next), (" ( ALPHA / b ) ", 13));
    }

    #[test]
    fn test_procedure_output_is_not_collapsed() {
        let mut translator = Translator::new().with_separator(" ");
        translator.table_mut().insert("\\alpha", "ALPHA");
        assert_eq!(
            translator.translate("\\alpha\\text{  and  }"),
            " ALPHA   and  "
        );
        assert_eq!(translator.translate("\\text{ x }\\alpha"), " x  ALPHA ");
    }

    #[test]
    fn test_single_character_override() {
        let mut translator = empty();
        translator.table_mut().insert("=", " equals ");
        assert_eq!(translator.translate("a=b"), "a equals b");
    }

    #[test]
    fn test_indexed_template_reorders_arguments() {
        let mut translator = empty();
        translator.table_mut().insert(
            "\\pair",
            Template::indexed(
                2,
                [
                    TemplatePart::from("("),
                    TemplatePart::Arg(2),
                    ",".into(),
                    TemplatePart::Arg(1),
                    ")".into(),
                ],
            ),
        );
        assert_eq!(translator.translate("\\pair{X}{Y}"), "(Y,X)");
        assert_eq!(translator.translate("\\pair ab!"), "(b,a)!");
    }

    #[test]
    fn test_indexed_template_repeats_and_skips() {
        let mut translator = empty();
        translator.table_mut().insert(
            "\\twice",
            Template::indexed(
                2,
                [
                    TemplatePart::Arg(1),
                    TemplatePart::from("-"),
                    TemplatePart::Arg(1),
                ],
            ),
        );
        assert_eq!(translator.translate("\\twice{ab}{cd}e"), "ab-abe");
    }

    #[test]
    fn test_indexed_template_out_of_range_reference() {
        let mut translator = empty();
        translator.table_mut().insert(
            "\\bad",
            Template::indexed(
                1,
                [
                    TemplatePart::Arg(0),
                    TemplatePart::from("<"),
                    TemplatePart::Arg(3),
                    TemplatePart::Arg(1),
                ],
            ),
        );
        assert_eq!(translator.translate("\\bad{x}"), "<x");
    }

    #[test]
    fn test_delimiter_template() {
        let mut translator = empty();
        translator.table_mut().insert("\\alpha", "ALPHA");
        translator
            .table_mut()
            .insert("\\frac", Template::delimiters(["(", "/", ")"]));
        assert_eq!(translator.translate("\\frac{1}{2}"), "(1/2)");
        // Arguments are translated recursively
        assert_eq!(translator.translate("\\frac{\\frac ab}\\alpha"), "((a/b)/ALPHA)");
    }

    #[test]
    fn test_delimiter_template_with_separator() {
        let mut translator = empty().with_separator(" ");
        translator
            .table_mut()
            .insert("\\binom", Template::delimiters(["(", "choose", ")"]));
        assert_eq!(translator.translate("\\binom{n}{k}"), " ( n choose k ) ");
    }

    #[test]
    fn test_empty_delimiter_template_consumes_nothing() {
        let mut translator = empty();
        translator
            .table_mut()
            .insert("\\nothing", Template::delimiters(Vec::<String>::new()));
        assert_eq!(
            translator.general_command("\\nothing{x}", 8, &Template::Delimiters(vec![])),
            (String::new(), 8)
        );
        assert_eq!(translator.translate("\\nothing{x}"), "{x}");
    }

    #[test]
    fn test_template_on_unterminated_group() {
        let mut translator = empty();
        translator
            .table_mut()
            .insert("\\frac", Template::delimiters(["(", "/", ")"]));
        assert_eq!(translator.translate("\\frac{1"), "(1/)");
        assert_eq!(translator.translate("\\frac"), "(/)");
    }

    #[test]
    fn test_procedure_recursion() {
        let mut translator = empty();
        translator.table_mut().insert("x", "X");
        translator.table_mut().insert(
            "\\bold",
            Entry::procedure(|t: &Translator, input: &str, start| {
                let arg = extract_argument(input, start);
                (format!("<{}>", t.translate(arg.content)), arg.next)
            }),
        );
        assert_eq!(translator.translate("\\bold{x+\\bold x}y"), "<X+<X>>y");
    }

    #[test]
    fn test_procedure_index_is_clamped() {
        let mut translator = empty();
        translator
            .table_mut()
            .insert("\\back", Entry::procedure(|_, _, _| ("!".to_string(), 0)));
        translator
            .table_mut()
            .insert("\\far", Entry::procedure(|_, _, _| ("?".to_string(), usize::MAX)));
        assert_eq!(translator.translate("a\\back b"), "a! b");
        assert_eq!(translator.translate("a\\far b"), "a?");
    }

    #[test]
    fn test_procedure_index_snaps_to_char_boundary() {
        let mut translator = empty();
        translator
            .table_mut()
            .insert("\\skip", Entry::procedure(|_, _, start| (String::new(), start + 1)));
        // `é` is two bytes, the returned index falls inside it
        assert_eq!(translator.translate("\\skipéz"), "z");
    }

    #[test]
    fn test_set_table_between_calls() {
        let mut translator = empty();
        translator.table_mut().insert("\\pi", "PI");
        assert_eq!(translator.translate("\\pi"), "PI");

        let mut speech = CommandTable::new();
        speech.insert("\\pi", "pie");
        let previous = translator.set_table(speech);
        assert!(previous.contains("\\pi"));
        assert_eq!(translator.translate("\\pi"), "pie");
    }

    #[test]
    fn test_configuration_toggles() {
        let mut translator = Translator::new();
        assert_eq!(translator.separator(), "");
        assert!(!translator.remove_dollars());
        assert!(translator.toggle_remove_dollars());
        assert_eq!(translator.translate("$x$"), "x");
        assert!(!translator.toggle_remove_dollars());
        assert_eq!(translator.translate("$x$"), "$x$");

        translator.set_separator("|");
        translator.table_mut().insert("\\pi", "PI");
        assert_eq!(translator.translate("2\\pi"), "2|PI|");
    }

    #[test]
    fn test_translating_reader() {
        let mut translator = empty();
        translator.table_mut().insert("\\pi", "PI");
        translator.table_mut().insert("\\phantom", Entry::procedure(procedures::remove));

        let input = "2\\pi r\r\n\\phantom{x}\nend";
        let mut reader = TranslatingReader::new(input.as_bytes(), &translator);

        let mut output = String::new();
        reader.read_to_string(&mut output).unwrap();

        assert_eq!(output, "2PI r\r\n\nend");
    }

    #[test]
    fn test_translating_reader_rejects_invalid_utf8() {
        let translator = empty();
        let input: &[u8] = b"ok\n\xff\xfe\n";
        let mut reader = TranslatingReader::new(input, &translator);

        let mut output = String::new();
        let err = reader.read_to_string(&mut output).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
