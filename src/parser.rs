use pest::{Parser, iterators::Pair};
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "src/table.pest"]
pub struct TableParser;

/// One `key value` line of a translation table file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLine<'a> {
    pub key: &'a str,
    /// Everything after the first space, may be empty or contain spaces
    pub value: &'a str,
}

impl TableParser {
    /// Parse table source into its entry lines, in file order.
    /// Comment and blank lines produce nothing.
    pub fn parse_table<'a>(
        source: &'a str,
    ) -> Result<Vec<TableLine<'a>>, pest::error::Error<Rule>> {
        let mut pairs = TableParser::parse(Rule::file, source)?;
        let Some(file) = pairs.next() else {
            return Ok(Vec::new());
        };

        Ok(file
            .into_inner()
            .filter(|p| p.as_rule() == Rule::entry)
            .map(Self::parse_entry)
            .collect())
    }

    fn parse_entry<'a>(pair: Pair<'a, Rule>) -> TableLine<'a> {
        let mut line = TableLine { key: "", value: "" };
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::key => line.key = inner.as_str(),
                Rule::value => line.value = inner.as_str(),
                _ => {}
            }
        }
        line
    }
}
