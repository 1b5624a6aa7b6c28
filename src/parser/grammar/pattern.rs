//! Graph patterns (§3's `PATTERN_PATH`/`NODE_PATTERN`/`REL_PATTERN`, §E).
//!
//! The original source keeps `path_pattern` in several partially duplicated
//! forms (`ast_path_pattern*.c`); SPEC_FULL.md §E settles on one coherent
//! shape instead: an odd-length alternating `node, rel, node, rel, ..., node`
//! sequence (`PatternPath`), optionally named (`NamedPath`) or wrapped in a
//! `shortestPath`/`allShortestPaths` call (`ShortestPath`).

use crate::ast::{NodeFlags, NodeId, Payload};
use crate::kind::NodeKind;
use crate::lexer::TokenKind;
use crate::parser::Parser;
use crate::position::InputRange;

use super::literal;

/// One pattern element, as it appears after `MATCH`/`MERGE`/`CREATE` or in a
/// comma-separated pattern list: a bare path, a named path (`p = (a)-->(b)`),
/// or a bare `shortestPath`/`allShortestPaths` call.
pub fn pattern_element(p: &mut Parser) -> NodeId {
    if p.peek_kind() == TokenKind::Identifier {
        if p.at_keyword("shortestpath") || p.at_keyword("allshortestpaths") {
            return shortest_path(p);
        }
        if p.peek_nth(1).kind == TokenKind::Eq {
            return named_path(p);
        }
    }
    pattern_path(p)
}

/// Every constructor below builds from a plain `Vec<NodeId>` rather than an
/// open frame: `pattern_element` (and with it every production here) can be
/// returned to a caller in `clause.rs` that itself `push_child`s the result,
/// so an auto-attaching frame would double-attach once that caller's own
/// `push_child` ran (the same hazard `literal::collection`/`map_literal`
/// avoid this way).

/// `ident '=' (patternPath | shortestPath)` — `NamedPath` (§3).
pub fn named_path(p: &mut Parser) -> NodeId {
    let start = p.current_pos();
    let var = literal::identifier(p);
    p.expect_token(TokenKind::Eq, "'='");
    let body = if p.at_keyword("shortestpath") || p.at_keyword("allshortestpaths") {
        shortest_path(p)
    } else {
        pattern_path(p)
    };
    let end = p.arena.get(body).range().end;
    p.build_node(NodeKind::NamedPath, InputRange::new(start, end), vec![var, body], Payload::None)
}

/// `(shortestPath|allShortestPaths) '(' patternPath ')'` — `ShortestPath`
/// (§3). `NodeFlags::SINGLE` distinguishes the two spellings: set for
/// `shortestPath` (one path), unset for `allShortestPaths`.
pub fn shortest_path(p: &mut Parser) -> NodeId {
    let start = p.current_pos();
    let single = p.at_keyword("shortestpath");
    if single {
        p.bump();
    } else {
        p.expect_keyword("allShortestPaths");
    }
    p.expect_token(TokenKind::LParen, "'('");
    let path = pattern_path(p);
    p.expect_token(TokenKind::RParen, "')'");
    let end = p.last_end_pos();
    let flags = if single { NodeFlags::SINGLE } else { NodeFlags::NONE };
    p.build_node(NodeKind::ShortestPath, InputRange::new(start, end), vec![path], Payload::Flags(flags))
}

/// `nodePattern (relPattern nodePattern)*` — `PatternPath` (§3): the
/// alternating node/rel/node/.../node sequence every path shape in this
/// grammar bottoms out at.
pub fn pattern_path(p: &mut Parser) -> NodeId {
    let start = p.current_pos();
    let first = node_pattern(p);
    let mut children = vec![first];
    while matches!(p.peek_kind(), TokenKind::Minus | TokenKind::Lt) {
        children.push(rel_pattern(p));
        children.push(node_pattern(p));
    }
    let end = p.last_end_pos();
    p.build_node(NodeKind::PatternPath, InputRange::new(start, end), children, Payload::None)
}

/// `'(' identifier? (':' label)* map? ')'` — `NodePattern` (§3). A variable
/// is unambiguous from the labels that may follow it: labels are always
/// introduced by a leading `:`, so "next token is an identifier" alone means
/// "this is the variable".
pub fn node_pattern(p: &mut Parser) -> NodeId {
    let start = p.current_pos();
    p.expect_token(TokenKind::LParen, "'('");
    let mut children = Vec::new();
    if p.peek_kind() == TokenKind::Identifier {
        children.push(literal::identifier(p));
    }
    while p.eat_token(TokenKind::Colon) {
        children.push(literal::label(p));
    }
    if p.peek_kind() == TokenKind::LBrace {
        children.push(literal::map_literal(p));
    }
    p.expect_token(TokenKind::RParen, "')'");
    let end = p.last_end_pos();
    p.build_node(NodeKind::NodePattern, InputRange::new(start, end), children, Payload::None)
}

/// `('<')? '-' ('[' identifier? (':' relType ('|' ':'? relType)*)? range? map? ']')? '-' ('>')?`
/// — `RelPattern` (§3). Direction is carried as a flag rather than a
/// dedicated child: `REVERSE` for `<-...-`, `UNDIRECTED` for `-...-`, neither
/// for the default `-...->`.
pub fn rel_pattern(p: &mut Parser) -> NodeId {
    let start = p.current_pos();
    let inbound = p.eat_token(TokenKind::Lt);
    p.expect_token(TokenKind::Minus, "'-'");

    let mut children = Vec::new();
    if p.peek_kind() == TokenKind::LBracket {
        p.bump();
        if p.peek_kind() == TokenKind::Identifier {
            children.push(literal::identifier(p));
        }
        if p.eat_token(TokenKind::Colon) {
            children.push(literal::reltype(p));
            while p.eat_token(TokenKind::Pipe) {
                p.eat_token(TokenKind::Colon);
                children.push(literal::reltype(p));
            }
        }
        if p.peek_kind() == TokenKind::Star {
            children.push(varlength_range(p));
        }
        if p.peek_kind() == TokenKind::LBrace {
            children.push(literal::map_literal(p));
        }
        p.expect_token(TokenKind::RBracket, "']'");
    }

    p.expect_token(TokenKind::Minus, "'-'");
    let outbound = p.eat_token(TokenKind::Gt);

    let flags = if inbound && !outbound {
        NodeFlags::REVERSE
    } else if !inbound && !outbound {
        NodeFlags::UNDIRECTED
    } else {
        NodeFlags::NONE
    };
    let end = p.last_end_pos();
    p.build_node(NodeKind::RelPattern, InputRange::new(start, end), children, Payload::Flags(flags))
}

/// `'*' integer? ('..' integer?)?` — varlength `Range` (§3). See
/// [`crate::ast::payload::NodeFlags::VARLENGTH`]/`MIN_OPEN` for how the 0-2
/// `Integer` children combine with these two flags to cover all four forms
/// (`*`, `*N`, `*N..`, `*..N`, `*N..M`).
fn varlength_range(p: &mut Parser) -> NodeId {
    let start = p.current_pos();
    p.bump(); // '*'
    let mut children = Vec::new();
    let mut flags = NodeFlags::NONE;
    let mut has_min = false;
    if p.peek_kind() == TokenKind::Integer {
        children.push(literal::integer_literal(p));
        has_min = true;
    }
    if p.eat_token(TokenKind::DotDot) {
        flags = flags.with(NodeFlags::VARLENGTH);
        if p.peek_kind() == TokenKind::Integer {
            children.push(literal::integer_literal(p));
            if !has_min {
                flags = flags.with(NodeFlags::MIN_OPEN);
            }
        }
    }
    let end = p.last_end_pos();
    p.build_node(NodeKind::Range, InputRange::new(start, end), children, Payload::Flags(flags))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::NodeKind;

    #[test]
    fn simple_node_pattern_with_label_and_var() {
        let mut p = Parser::new("(n:Person)");
        let id = node_pattern(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.kind(), NodeKind::NodePattern);
        assert_eq!(node.nchildren(), 2);
        assert_eq!(p.arena.get(node.child(0).unwrap()).kind(), NodeKind::Identifier);
        assert_eq!(p.arena.get(node.child(1).unwrap()).kind(), NodeKind::Label);
    }

    #[test]
    fn outbound_rel_pattern_has_no_direction_flag() {
        let mut p = Parser::new("-[:KNOWS]->");
        let id = rel_pattern(&mut p);
        assert_eq!(p.arena.get(id).flags(), NodeFlags::NONE);
    }

    #[test]
    fn inbound_rel_pattern_sets_reverse() {
        let mut p = Parser::new("<-[:KNOWS]-");
        let id = rel_pattern(&mut p);
        assert!(p.arena.get(id).flags().contains(NodeFlags::REVERSE));
    }

    #[test]
    fn undirected_rel_pattern_sets_undirected() {
        let mut p = Parser::new("-[:KNOWS]-");
        let id = rel_pattern(&mut p);
        assert!(p.arena.get(id).flags().contains(NodeFlags::UNDIRECTED));
    }

    #[test]
    fn full_pattern_path_alternates_node_and_rel() {
        let mut p = Parser::new("(a)-[:KNOWS]->(b)");
        let id = pattern_path(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.nchildren(), 3);
        assert_eq!(p.arena.get(node.child(0).unwrap()).kind(), NodeKind::NodePattern);
        assert_eq!(p.arena.get(node.child(1).unwrap()).kind(), NodeKind::RelPattern);
        assert_eq!(p.arena.get(node.child(2).unwrap()).kind(), NodeKind::NodePattern);
    }

    #[test]
    fn varlength_exact() {
        let mut p = Parser::new("-[*3]-");
        let id = rel_pattern(&mut p);
        let rel = p.arena.get(id);
        let range = p.arena.get(rel.child(0).unwrap());
        assert_eq!(range.kind(), NodeKind::Range);
        assert_eq!(range.nchildren(), 1);
        assert_eq!(range.flags(), NodeFlags::NONE);
    }

    #[test]
    fn varlength_open_max() {
        let mut p = Parser::new("-[*3..]-");
        let id = rel_pattern(&mut p);
        let range = p.arena.get(p.arena.get(id).child(0).unwrap());
        assert_eq!(range.nchildren(), 1);
        assert!(range.flags().contains(NodeFlags::VARLENGTH));
        assert!(!range.flags().contains(NodeFlags::MIN_OPEN));
    }

    #[test]
    fn varlength_open_min() {
        let mut p = Parser::new("-[*..5]-");
        let id = rel_pattern(&mut p);
        let range = p.arena.get(p.arena.get(id).child(0).unwrap());
        assert_eq!(range.nchildren(), 1);
        assert!(range.flags().contains(NodeFlags::VARLENGTH));
        assert!(range.flags().contains(NodeFlags::MIN_OPEN));
    }

    #[test]
    fn named_path_sets_variable_and_body() {
        let mut p = Parser::new("p = (a)-->(b)");
        let id = named_path(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.nchildren(), 2);
        assert_eq!(p.arena.get(node.child(0).unwrap()).kind(), NodeKind::Identifier);
        assert_eq!(p.arena.get(node.child(1).unwrap()).kind(), NodeKind::PatternPath);
    }

    #[test]
    fn shortest_path_sets_single_flag() {
        let mut p = Parser::new("shortestPath((a)-->(b))");
        let id = shortest_path(&mut p);
        assert!(p.arena.get(id).flags().contains(NodeFlags::SINGLE));
    }

    #[test]
    fn all_shortest_paths_has_no_single_flag() {
        let mut p = Parser::new("allShortestPaths((a)-->(b))");
        let id = shortest_path(&mut p);
        assert!(!p.arena.get(id).flags().contains(NodeFlags::SINGLE));
    }
}
