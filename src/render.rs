//! AST renderer (§4.8, §6, C8).
//!
//! Produces the test oracle's dump format:
//! ```text
//! @<ordinal>  <start>..<end>  <indent>> <kind-name>  <detail>
//! ```
//! Deterministic: the same tree always renders to the same bytes, which is
//! what lets tests assert on it with plain string equality (matching the
//! teacher's own `SyntaxTree`'s `Debug` impl, the direct ancestor of this
//! format — see `syntax_tree.rs`'s `KIND@range "text"` dump, generalized
//! here with an ordinal column and kind-specific detail rendering).

use std::fmt::Write as _;

use crate::ast::{Arena, NodeId};
use crate::error::escape_char;
use crate::kind::NodeKind;

/// One `(open, close)` byte-sequence pair per colorized role (§6).
#[derive(Debug, Clone, Copy, Default)]
pub struct Pair {
    pub open: &'static str,
    pub close: &'static str,
}

impl Pair {
    const EMPTY: Pair = Pair { open: "", close: "" };

    fn wrap(self, s: &str) -> String {
        format!("{}{}{}", self.open, s, self.close)
    }
}

/// The nine colorized roles a renderer call can wrap output fields in (§6).
#[derive(Debug, Clone, Copy)]
pub struct ColorScheme {
    pub normal: Pair,
    pub error: Pair,
    pub error_token: Pair,
    pub error_message: Pair,
    pub ast_ordinal: Pair,
    pub ast_range: Pair,
    pub ast_indent: Pair,
    pub ast_type: Pair,
    pub ast_desc: Pair,
}

impl ColorScheme {
    /// No escape sequences at all — the default.
    pub const PLAIN: ColorScheme = ColorScheme {
        normal: Pair::EMPTY,
        error: Pair::EMPTY,
        error_token: Pair::EMPTY,
        error_message: Pair::EMPTY,
        ast_ordinal: Pair::EMPTY,
        ast_range: Pair::EMPTY,
        ast_indent: Pair::EMPTY,
        ast_type: Pair::EMPTY,
        ast_desc: Pair::EMPTY,
    };

    /// Terminal ANSI escapes, for interactive output.
    pub const ANSI: ColorScheme = ColorScheme {
        normal: Pair { open: "\u{1b}[0m", close: "\u{1b}[0m" },
        error: Pair { open: "\u{1b}[31m", close: "\u{1b}[0m" },
        error_token: Pair { open: "\u{1b}[1;31m", close: "\u{1b}[0m" },
        error_message: Pair { open: "\u{1b}[31m", close: "\u{1b}[0m" },
        ast_ordinal: Pair { open: "\u{1b}[36m", close: "\u{1b}[0m" },
        ast_range: Pair { open: "\u{1b}[90m", close: "\u{1b}[0m" },
        ast_indent: Pair { open: "\u{1b}[90m", close: "\u{1b}[0m" },
        ast_type: Pair { open: "\u{1b}[1m", close: "\u{1b}[0m" },
        ast_desc: Pair { open: "\u{1b}[32m", close: "\u{1b}[0m" },
    };
}

impl Default for ColorScheme {
    fn default() -> Self {
        ColorScheme::PLAIN
    }
}

/// Render `roots` (and everything beneath them) as the ordinal-ordered
/// two-column dump described above, writing to `out`.
///
/// `width`, if non-zero, truncates the detail column so each line fits that
/// many columns total.
pub fn render(
    arena: &Arena,
    roots: &[NodeId],
    out: &mut dyn std::fmt::Write,
    width: usize,
    colors: ColorScheme,
) -> std::fmt::Result {
    let mut rows = Vec::new();
    for &root in roots {
        collect_rows(arena, root, 0, &mut rows);
    }
    rows.sort_by_key(|r| r.0);

    let ordinal_width = rows.iter().map(|r| digit_len(r.0)).max().unwrap_or(1);
    let range_width = rows
        .iter()
        .map(|r| format!("{}..{}", r.2.start.offset, r.2.end.offset).len())
        .max()
        .unwrap_or(1);
    let kind_width = rows.iter().map(|r| r.3.name().len()).max().unwrap_or(1);

    for (ordinal, depth, range, kind, detail) in rows {
        let ordinal_col = colors.ast_ordinal.wrap(&format!("@{ordinal:<ordinal_width$}"));
        let range_str = format!("{}..{}", range.start.offset, range.end.offset);
        let range_col = colors.ast_range.wrap(&format!("{range_str:<range_width$}"));
        let indent = colors.ast_indent.wrap(&"> ".repeat(depth));
        let kind_col = colors.ast_type.wrap(&format!("{:<kind_width$}", kind.name()));
        let mut detail = detail;
        if width > 0 && detail.len() > width {
            detail.truncate(width);
        }
        let detail_col = colors.ast_desc.wrap(&detail);
        writeln!(out, "{ordinal_col}  {range_col}  {indent}{kind_col}  {detail_col}")?;
    }
    Ok(())
}

type Row = (u32, usize, crate::position::InputRange, NodeKind, String);

fn collect_rows(arena: &Arena, id: NodeId, depth: usize, rows: &mut Vec<Row>) {
    let node = arena.get(id);
    rows.push((node.ordinal(), depth, node.range(), node.kind(), detail(arena, id)));
    for &child in node.children() {
        collect_rows(arena, child, depth + 1, rows);
    }
}

fn digit_len(n: u32) -> usize {
    n.to_string().len()
}

/// The kind-specific detail text (§4.8): sibling references render as `@N`,
/// operators verbatim, string literals in `"..."`, identifier-shaped leaves
/// in backticks, numeric literals as their preserved source lexeme.
fn detail(arena: &Arena, id: NodeId) -> String {
    use NodeKind::*;
    let node = arena.get(id);
    match node.kind() {
        String => format!("\"{}\"", escape_text(node.text().unwrap_or(""))),
        Integer | Float => node.text().unwrap_or("").to_string(),
        Identifier | Label | RelType | PropName | FunctionName | IndexName | ProcName => {
            format!("`{}`", node.text().unwrap_or(""))
        }
        Parameter => format!("${}", node.text().unwrap_or("")),
        True => "true".to_string(),
        False => "false".to_string(),
        Null => "null".to_string(),
        LineComment => format!("//{}", node.text().unwrap_or("")),
        BlockComment => format!("/*{}*/", node.text().unwrap_or("")),
        Command => node.text().unwrap_or("").to_string(),
        UnaryOperator | BinaryOperator | ApplyOperator | ApplyAllOperator | PropertyOperator
        | SubscriptOperator | SliceOperator | LabelsOperator => {
            let op = node.operator().map(|o| o.symbol()).unwrap_or("?");
            let refs = child_refs(arena, node);
            if refs.is_empty() {
                op.to_string()
            } else {
                format!("{op} {refs}")
            }
        }
        Comparison => {
            let ops: Vec<_> = node.operators().iter().map(|o| o.symbol()).collect();
            format!("{} {}", ops.join(" "), child_refs(arena, node))
        }
        _ => child_refs(arena, node),
    }
}

/// Sibling references render as the *ordinal* the referenced node was
/// assigned, `@N` — callers must run [`Arena::assign_ordinals`] before
/// calling [`render`], since this reads ordinals straight off each child.
fn child_refs(arena: &Arena, node: &crate::ast::AstNode) -> String {
    node.children()
        .iter()
        .map(|&c| format!("@{}", arena.get(c).ordinal()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if c.is_control() => out.push_str(&escape_char(c)),
            c => out.push(c),
        }
    }
    out
}
