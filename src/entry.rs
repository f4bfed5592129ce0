use std::fmt;
use std::sync::Arc;

use crate::translator::Translator;

/// Signature of a custom procedure: receives the translator, the full input and
/// the index just past the command, returns the produced fragment and the index
/// just past everything it consumed.
pub type ProcedureFn = dyn Fn(&Translator, &str, usize) -> (String, usize) + Send + Sync;

/// Shared handle to a custom translation procedure
#[derive(Clone)]
pub struct Procedure(Arc<ProcedureFn>);

impl Procedure {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Translator, &str, usize) -> (String, usize) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, translator: &Translator, input: &str, start: usize) -> (String, usize) {
        (self.0)(translator, input, start)
    }
}

impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Procedure(..)")
    }
}

/// One element of an indexed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    /// Literal fragment, emitted as is
    Text(String),
    /// 1-based reference to an extracted argument, translated on emission
    Arg(usize),
}

impl From<&str> for TemplatePart {
    fn from(text: &str) -> Self {
        TemplatePart::Text(text.to_owned())
    }
}

impl From<String> for TemplatePart {
    fn from(text: String) -> Self {
        TemplatePart::Text(text)
    }
}

impl From<usize> for TemplatePart {
    fn from(index: usize) -> Self {
        TemplatePart::Arg(index)
    }
}

/// Argument-formatting rule for commands like `\frac` or `\sqrt`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Template {
    /// `d0 a1 d1 a2 d2 ...`: one argument between each pair of neighbouring delimiters
    Delimiters(Vec<String>),
    /// Extract `arity` arguments, then emit `parts` in order.
    /// Arguments may be referenced any number of times and in any order.
    Indexed {
        arity: usize,
        parts: Vec<TemplatePart>,
    },
}

impl Template {
    pub fn delimiters<I, S>(delimiters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Template::Delimiters(delimiters.into_iter().map(Into::into).collect())
    }

    pub fn indexed<I>(arity: usize, parts: I) -> Self
    where
        I: IntoIterator<Item = TemplatePart>,
    {
        Template::Indexed {
            arity,
            parts: parts.into_iter().collect(),
        }
    }

    /// Number of arguments consumed after the command
    pub fn arity(&self) -> usize {
        match self {
            Template::Delimiters(delimiters) => delimiters.len().saturating_sub(1),
            Template::Indexed { arity, .. } => *arity,
        }
    }
}

/// What a command (or a single special character) translates to
#[derive(Debug, Clone)]
pub enum Entry {
    /// Fixed substitution, consumes no arguments
    Literal(String),
    Template(Template),
    Procedure(Procedure),
}

impl Entry {
    pub fn literal(value: impl Into<String>) -> Self {
        Entry::Literal(value.into())
    }

    pub fn procedure<F>(f: F) -> Self
    where
        F: Fn(&Translator, &str, usize) -> (String, usize) + Send + Sync + 'static,
    {
        Entry::Procedure(Procedure::new(f))
    }
}

impl From<&str> for Entry {
    fn from(value: &str) -> Self {
        Entry::Literal(value.to_owned())
    }
}

impl From<String> for Entry {
    fn from(value: String) -> Self {
        Entry::Literal(value)
    }
}

impl From<Template> for Entry {
    fn from(template: Template) -> Self {
        Entry::Template(template)
    }
}

impl From<Procedure> for Entry {
    fn from(procedure: Procedure) -> Self {
        Entry::Procedure(procedure)
    }
}
