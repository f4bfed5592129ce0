//! Stock procedures every [`Translator`] starts with.

use crate::args::extract_argument;
use crate::entry::Entry;
use crate::table::CommandTable;
use crate::translator::Translator;

/// Commands whose argument is plain text and is emitted untranslated
pub const TEXT_COMMANDS: &[&str] = &[
    "\\mbox", "\\text", "\\textrm", "\\textit", "\\textbf", "\\mathrm",
];

/// Emit the argument as is, as in `\mbox` and `\text`
pub fn text(_: &Translator, input: &str, start: usize) -> (String, usize) {
    let arg = extract_argument(input, start);
    (arg.content.to_owned(), arg.next)
}

/// Drop the command but translate its argument
pub fn displaystyle(translator: &Translator, input: &str, start: usize) -> (String, usize) {
    let arg = extract_argument(input, start);
    (translator.translate(arg.content), arg.next)
}

/// Drop the command and its argument entirely, as for `\phantom`
pub fn remove(_: &Translator, input: &str, start: usize) -> (String, usize) {
    let arg = extract_argument(input, start);
    (String::new(), arg.next)
}

/// Emit or suppress a `$`, depending on the translator's configuration
pub fn dollar(translator: &Translator, _: &str, start: usize) -> (String, usize) {
    let output = if translator.remove_dollars() { "" } else { "$" };
    (output.to_owned(), start)
}

pub(crate) fn register_builtins(table: &mut CommandTable) {
    for &command in TEXT_COMMANDS {
        table.insert(command, Entry::procedure(text));
    }
    table.insert("\\displaystyle", Entry::procedure(displaystyle));
    table.insert("\\phantom", Entry::procedure(remove));
    table.insert("$", Entry::procedure(dollar));
}
