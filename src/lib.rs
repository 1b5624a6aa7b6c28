//! A parser for the openCypher graph query language.
//!
//! Source text goes in, a fully-typed, range-annotated AST comes out
//! alongside a list of recoverable diagnostics — malformed input never fails
//! the call outright, it just shows up as `ERROR` nodes and [`ParseError`]s
//! threaded through an otherwise-complete tree (§7). A second, much cheaper
//! entry point ([`quick_parse`]) only segments input into statement/command
//! boundaries without building a tree at all.
//!
//! ```
//! use cypher_parser::parse;
//!
//! let result = parse("MATCH (n:Person) RETURN n.name;");
//! assert_eq!(result.directives().len(), 1);
//! assert!(result.errors().is_empty());
//! ```

mod ast;
mod error;
mod input;
mod kind;
mod lexer;
mod limit;
mod operator;
mod parser;
mod position;
mod render;
mod result;
mod segmenter;

pub use ast::{Arena, AstNode, NodeFlags, NodeId, Payload};
pub use error::{ErrorTracker, HostError, ParseError};
pub use input::Source;
pub use kind::{Category, NodeKind};
pub use limit::LimitTracker;
pub use operator::{Associativity, Operator};
pub use parser::{ParseFlags, Parser, ParserConfig};
pub use position::{InputPosition, InputRange};
pub use render::{render, ColorScheme, Pair};
pub use result::ParseResult;
pub use segmenter::{quick_parse, Segment};

use std::io;

/// Parse a complete in-memory Cypher source buffer with default
/// configuration and flags (§6).
pub fn parse(input: &str) -> ParseResult {
    Parser::new(input).parse()
}

/// Parse a complete in-memory Cypher source buffer with caller-supplied
/// configuration and flags (§6).
pub fn parse_with(input: &str, config: ParserConfig, flags: ParseFlags) -> ParseResult {
    Parser::with_config(input, config).flags(flags).parse()
}

/// Parse Cypher source read from a byte stream, buffering it up front
/// (§4.1, §6) — backtracking needs random access, so there's no streaming
/// variant that avoids this.
pub fn parse_stream<R: io::Read>(reader: R) -> Result<ParseResult, HostError> {
    let source = Source::from_reader(reader)?;
    Ok(Parser::new(source.as_str()).parse())
}

/// [`parse_stream`] with caller-supplied configuration and flags.
pub fn parse_stream_with<R: io::Read>(
    reader: R,
    config: ParserConfig,
    flags: ParseFlags,
) -> Result<ParseResult, HostError> {
    let source = Source::from_reader(reader)?;
    Ok(Parser::with_config(source.as_str(), config).flags(flags).parse())
}

/// [`quick_parse`] over a byte stream, buffering it up front like
/// [`parse_stream`].
pub fn quick_parse_stream<R: io::Read>(
    reader: R,
    flags: ParseFlags,
    callback: impl FnMut(Segment) -> i32,
) -> Result<i32, HostError> {
    let source = Source::from_reader(reader)?;
    Ok(quick_parse(source.as_str(), flags, callback))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_parse_matches_scenario_3() {
        let result = parse("CYPHER 3.0 PROFILE RETURN 1;");
        assert_eq!(result.directives().len(), 1);
        assert!(result.errors().is_empty());
    }

    #[test]
    fn parse_stream_reads_a_buffer() {
        let result = parse_stream("RETURN 1;".as_bytes()).unwrap();
        assert_eq!(result.directives().len(), 1);
    }

    #[test]
    fn quick_parse_stream_counts_segments() {
        let mut count = 0;
        quick_parse_stream("return 1; return 2;".as_bytes(), ParseFlags::DEFAULT, |_| {
            count += 1;
            0
        })
        .unwrap();
        assert_eq!(count, 2);
    }
}
