//! Expressions (§3's expression kinds, §4.4's operator table, §9's
//! precedence-climbing note).
//!
//! One named function per precedence level in [`crate::operator::Operator`],
//! from loosest (`or_expr`) to tightest (`postfix_expr`), rather than a
//! generic table-driven loop — the level count is small and fixed, and
//! naming each level after the operators it binds reads closer to the
//! grammar it implements than a parameterized climber would.
//!
//! [`expression`] itself is the one packrat-memoized rule in this grammar
//! (DESIGN NOTES): it is reachable from enough overlapping contexts (map
//! values, collection elements, call arguments, pattern property maps) that
//! the same span can otherwise be re-descended many times over.

use crate::ast::{NodeFlags, NodeId, Payload};
use crate::kind::NodeKind;
use crate::lexer::TokenKind;
use crate::operator::Operator;
use crate::parser::Parser;
use crate::position::InputRange;

use super::literal;

/// Entry point for every expression in the grammar (§3). Memoized per
/// start position so the same span parsed from two different alternatives
/// doesn't redo the descent.
pub fn expression(p: &mut Parser) -> NodeId {
    let start = p.mark();
    if let Some((id, end)) = p.expr_memo.get(&start).copied().flatten() {
        p.restore(end);
        return id;
    }
    let id = if p.enter() {
        let id = or_expr(p);
        p.exit();
        id
    } else {
        let pos = p.current_pos();
        p.alloc_leaf(NodeKind::Error, InputRange::new(pos, pos), Payload::None)
    };
    let end = p.mark();
    p.expr_memo.insert(start, Some((id, end)));
    id
}

fn binary(p: &mut Parser, left: NodeId, right: NodeId, op: Operator) -> NodeId {
    let start = p.arena.get(left).range().start;
    let end = p.arena.get(right).range().end;
    p.build_node(NodeKind::BinaryOperator, InputRange::new(start, end), vec![left, right], Payload::Operator(op))
}

/// `orExpr (OR xorExpr)*` — precedence 1 (lowest).
fn or_expr(p: &mut Parser) -> NodeId {
    let mut left = xor_expr(p);
    while p.at_keyword("or") {
        p.bump();
        let right = xor_expr(p);
        left = binary(p, left, right, Operator::Or);
    }
    left
}

/// `xorExpr (XOR andExpr)*` — precedence 2.
fn xor_expr(p: &mut Parser) -> NodeId {
    let mut left = and_expr(p);
    while p.at_keyword("xor") {
        p.bump();
        let right = and_expr(p);
        left = binary(p, left, right, Operator::Xor);
    }
    left
}

/// `andExpr (AND notExpr)*` — precedence 3.
fn and_expr(p: &mut Parser) -> NodeId {
    let mut left = not_expr(p);
    while p.at_keyword("and") {
        p.bump();
        let right = not_expr(p);
        left = binary(p, left, right, Operator::And);
    }
    left
}

/// `NOT* comparisonExpr` — precedence 4. Chains (`NOT NOT x`) recurse into
/// themselves rather than looping, since `NOT` is a prefix, not an infix,
/// operator.
fn not_expr(p: &mut Parser) -> NodeId {
    if p.at_keyword("not") {
        let start = p.current_pos();
        p.bump();
        let operand = not_expr(p);
        let end = p.arena.get(operand).range().end;
        p.build_node(NodeKind::UnaryOperator, InputRange::new(start, end), vec![operand], Payload::Operator(Operator::Not))
    } else {
        comparison_expr(p)
    }
}

/// `partialExpr (cmpOp partialExpr)*` — precedence 5. Two or more
/// comparisons in sequence (`a < b <= c`) collapse into one `Comparison`
/// node with every operand as a child and every operator in
/// [`Payload::Operators`], rather than nesting binary operators, since
/// Cypher's comparison chaining has "all pairs true" semantics that a
/// left-nested tree wouldn't read off directly.
fn comparison_expr(p: &mut Parser) -> NodeId {
    let first = partial_expr(p);
    let mut operands = vec![first];
    let mut ops = Vec::new();
    loop {
        let op = match p.peek_kind() {
            TokenKind::Eq => Operator::Equal,
            TokenKind::Neq => Operator::NotEqual,
            TokenKind::Lt => Operator::LessThan,
            TokenKind::Gt => Operator::GreaterThan,
            TokenKind::Lte => Operator::LessThanOrEqual,
            TokenKind::Gte => Operator::GreaterThanOrEqual,
            _ => break,
        };
        p.bump();
        ops.push(op);
        operands.push(partial_expr(p));
    }
    if ops.is_empty() {
        return operands.pop().unwrap();
    }
    let start = p.arena.get(operands[0]).range().start;
    let end = p.arena.get(*operands.last().unwrap()).range().end;
    p.build_node(NodeKind::Comparison, InputRange::new(start, end), operands, Payload::Operators(ops))
}

/// `additiveExpr ((REGEX_EQ | IN | STARTS WITH | CONTAINS | IS NULL | IS NOT NULL) additiveExpr?)*`
/// — precedence 6. `IS [NOT] NULL` is the only postfix-unary pair at this
/// level; everything else here is binary.
fn partial_expr(p: &mut Parser) -> NodeId {
    let mut left = additive_expr(p);
    loop {
        if p.eat_token(TokenKind::RegexEq) {
            let right = additive_expr(p);
            left = binary(p, left, right, Operator::RegexMatch);
        } else if p.at_keyword("in") {
            p.bump();
            let right = additive_expr(p);
            left = binary(p, left, right, Operator::In);
        } else if p.at_keyword("starts") && p.at_keyword_nth(1, "with") {
            p.bump();
            p.bump();
            let right = additive_expr(p);
            left = binary(p, left, right, Operator::StartsWith);
        } else if p.at_keyword("contains") {
            p.bump();
            let right = additive_expr(p);
            left = binary(p, left, right, Operator::Contains);
        } else if p.at_keyword("is") && p.at_keyword_nth(1, "not") && p.at_keyword_nth(2, "null") {
            p.bump();
            p.bump();
            p.bump();
            left = postfix_unary(p, left, Operator::IsNotNull);
        } else if p.at_keyword("is") && p.at_keyword_nth(1, "null") {
            p.bump();
            p.bump();
            left = postfix_unary(p, left, Operator::IsNull);
        } else {
            break;
        }
    }
    left
}

fn postfix_unary(p: &mut Parser, operand: NodeId, op: Operator) -> NodeId {
    let start = p.arena.get(operand).range().start;
    let end = p.last_end_pos();
    p.build_node(NodeKind::UnaryOperator, InputRange::new(start, end), vec![operand], Payload::Operator(op))
}

/// `multiplicativeExpr ((+|-) multiplicativeExpr)*` — precedence 7.
fn additive_expr(p: &mut Parser) -> NodeId {
    let mut left = multiplicative_expr(p);
    loop {
        let op = match p.peek_kind() {
            TokenKind::Plus => Operator::Add,
            TokenKind::Minus => Operator::Subtract,
            _ => break,
        };
        p.bump();
        let right = multiplicative_expr(p);
        left = binary(p, left, right, op);
    }
    left
}

/// `powerExpr ((*|/|%) powerExpr)*` — precedence 8.
fn multiplicative_expr(p: &mut Parser) -> NodeId {
    let mut left = power_expr(p);
    loop {
        let op = match p.peek_kind() {
            TokenKind::Star => Operator::Multiply,
            TokenKind::Slash => Operator::Divide,
            TokenKind::Percent => Operator::Modulo,
            _ => break,
        };
        p.bump();
        let right = power_expr(p);
        left = binary(p, left, right, op);
    }
    left
}

/// `unaryExpr ('^' powerExpr)?` — precedence 9, right-associative: the
/// right-hand side recurses into `power_expr` itself rather than
/// `unary_expr`, so `2 ^ 3 ^ 2` groups as `2 ^ (3 ^ 2)`.
fn power_expr(p: &mut Parser) -> NodeId {
    let left = unary_expr(p);
    if p.eat_token(TokenKind::Caret) {
        let right = power_expr(p);
        binary(p, left, right, Operator::Power)
    } else {
        left
    }
}

/// `(+|-)* postfixExpr` — precedence 10.
fn unary_expr(p: &mut Parser) -> NodeId {
    let op = match p.peek_kind() {
        TokenKind::Plus => Some(Operator::UnaryPlus),
        TokenKind::Minus => Some(Operator::UnaryMinus),
        _ => None,
    };
    match op {
        Some(op) => {
            let start = p.current_pos();
            p.bump();
            let operand = unary_expr(p);
            let end = p.arena.get(operand).range().end;
            p.build_node(NodeKind::UnaryOperator, InputRange::new(start, end), vec![operand], Payload::Operator(op))
        }
        None => postfix_expr(p),
    }
}

/// `atom ('.' propName | ':' label+ | '[' subscriptOrSlice ']')*` —
/// precedence 11 (highest). Function application (`Apply`/`ApplyAll`) is
/// handled in [`atom`] instead of here: it only ever follows a bare
/// function name, never an arbitrary postfix chain, so it is a primary
/// shape rather than a true postfix operator.
fn postfix_expr(p: &mut Parser) -> NodeId {
    let mut left = atom(p);
    loop {
        match p.peek_kind() {
            TokenKind::Dot => {
                let start = p.arena.get(left).range().start;
                p.bump();
                let prop = literal::prop_name(p);
                let end = p.arena.get(prop).range().end;
                left = p.build_node(
                    NodeKind::PropertyOperator,
                    InputRange::new(start, end),
                    vec![left, prop],
                    Payload::None,
                );
            }
            TokenKind::Colon => {
                let start = p.arena.get(left).range().start;
                let mut children = vec![left];
                while p.eat_token(TokenKind::Colon) {
                    children.push(literal::label(p));
                }
                let end = p.last_end_pos();
                left = p.build_node(NodeKind::LabelsOperator, InputRange::new(start, end), children, Payload::None);
            }
            TokenKind::LBracket => {
                left = subscript_or_slice(p, left);
            }
            _ => break,
        }
    }
    left
}

/// `'[' (expr | expr? '..' expr?) ']'` — `SubscriptOperator`/`SliceOperator`
/// (§3). A single bound with no `..` is a subscript; `..` anywhere makes it
/// a slice, whose one-or-two `Integer`/expression bound children are
/// disambiguated the same way a varlength `Range` is (see
/// [`crate::ast::payload::NodeFlags::MAX_OPEN`]): present with no flag
/// means *lower* bound, present with the flag means *upper* bound, both
/// present needs no flag at all.
fn subscript_or_slice(p: &mut Parser, left: NodeId) -> NodeId {
    let start = p.arena.get(left).range().start;
    p.bump(); // '['
    if p.eat_token(TokenKind::DotDot) {
        let mut children = vec![left];
        let mut flags = NodeFlags::NONE;
        if p.peek_kind() != TokenKind::RBracket {
            children.push(expression(p));
            flags = flags.with(NodeFlags::MAX_OPEN);
        }
        p.expect_token(TokenKind::RBracket, "']'");
        let end = p.last_end_pos();
        return p.build_node(NodeKind::SliceOperator, InputRange::new(start, end), children, Payload::Flags(flags));
    }

    let first = expression(p);
    if p.eat_token(TokenKind::DotDot) {
        let mut children = vec![left, first];
        if p.peek_kind() != TokenKind::RBracket {
            children.push(expression(p));
        }
        p.expect_token(TokenKind::RBracket, "']'");
        let end = p.last_end_pos();
        return p.build_node(NodeKind::SliceOperator, InputRange::new(start, end), children, Payload::Flags(NodeFlags::NONE));
    }

    p.expect_token(TokenKind::RBracket, "']'");
    let end = p.last_end_pos();
    p.build_node(NodeKind::SubscriptOperator, InputRange::new(start, end), vec![left, first], Payload::None)
}

/// The primary expression shapes: literals, parenthesized expressions,
/// collections/maps, variables, function application, and the keyword-led
/// forms (`CASE`, `FILTER`, `EXTRACT`, `REDUCE`, `ALL`, `ANY`, `SINGLE`,
/// `NONE`).
fn atom(p: &mut Parser) -> NodeId {
    match p.peek_kind() {
        TokenKind::LParen => {
            p.bump();
            let inner = expression(p);
            p.expect_token(TokenKind::RParen, "')'");
            inner
        }
        TokenKind::LBracket => list_or_collection(p),
        TokenKind::LBrace => literal::map_literal(p),
        TokenKind::StringLiteral => literal::string_literal(p),
        TokenKind::Integer => literal::integer_literal(p),
        TokenKind::Float => literal::float_literal(p),
        TokenKind::Parameter => literal::parameter(p),
        TokenKind::Identifier => identifier_led_atom(p),
        _ => {
            p.expected("expression");
            let pos = p.current_pos();
            p.alloc_leaf(NodeKind::Error, InputRange::new(pos, pos), Payload::None)
        }
    }
}

fn identifier_led_atom(p: &mut Parser) -> NodeId {
    if p.at_keyword("true") {
        return literal::true_literal(p);
    }
    if p.at_keyword("false") {
        return literal::false_literal(p);
    }
    if p.at_keyword("null") {
        return literal::null_literal(p);
    }
    if p.at_keyword("case") {
        return case_expression(p);
    }
    if p.at_keyword("filter") {
        return comprehension_predicate(p, NodeKind::Filter);
    }
    if p.at_keyword("all") {
        return comprehension_predicate(p, NodeKind::All);
    }
    if p.at_keyword("any") {
        return comprehension_predicate(p, NodeKind::Any);
    }
    if p.at_keyword("single") {
        return comprehension_predicate(p, NodeKind::Single);
    }
    if p.at_keyword("none") {
        return comprehension_predicate(p, NodeKind::None_);
    }
    if p.at_keyword("extract") {
        return extract_function(p);
    }
    if p.at_keyword("reduce") {
        return reduce_function(p);
    }
    if p.peek_nth(1).kind == TokenKind::LParen {
        return function_call(p);
    }
    literal::identifier(p)
}

/// `'[' ident IN expr (WHERE expr)? ('|' expr)? ']'` — `ListComprehension`
/// (§3). Disambiguated from a plain [`literal::collection`] by lookahead:
/// a collection never starts with `ident IN`.
fn list_or_collection(p: &mut Parser) -> NodeId {
    if p.peek_nth(1).kind == TokenKind::Identifier && p.at_keyword_nth(2, "in") {
        list_comprehension(p)
    } else {
        literal::collection(p)
    }
}

/// Every keyword-led atom below (`list_comprehension` through
/// `function_call`) builds from a plain `Vec<NodeId>` rather than an open
/// frame, even though each is a single, contiguous production: `expression`
/// can bottom out at any one of them, and a caller elsewhere in the grammar
/// always `push_child`s `expression`'s return value itself — an open frame
/// here would auto-attach to that caller's enclosing node on `end_node`,
/// double-attaching once the caller's own `push_child` ran too.
fn list_comprehension(p: &mut Parser) -> NodeId {
    let start = p.current_pos();
    p.bump(); // '['
    let var = literal::identifier(p);
    let mut children = vec![var];
    p.expect_keyword("in");
    children.push(expression(p));
    let mut flags = NodeFlags::NONE;
    if p.eat_keyword("where") {
        children.push(expression(p));
        flags = flags.with(NodeFlags::HAS_PREDICATE);
    }
    if p.eat_token(TokenKind::Pipe) {
        children.push(expression(p));
    }
    p.expect_token(TokenKind::RBracket, "']'");
    let end = p.last_end_pos();
    p.build_node(NodeKind::ListComprehension, InputRange::new(start, end), children, Payload::Flags(flags))
}

/// `(FILTER|ALL|ANY|SINGLE|NONE) '(' ident IN expr WHERE expr ')'` — shared
/// shape for the four boolean list predicates plus `FILTER` (§B, kind list).
fn comprehension_predicate(p: &mut Parser, kind: NodeKind) -> NodeId {
    let start = p.current_pos();
    p.bump(); // keyword
    p.expect_token(TokenKind::LParen, "'('");
    let var = literal::identifier(p);
    let mut children = vec![var];
    p.expect_keyword("in");
    children.push(expression(p));
    p.expect_keyword("where");
    children.push(expression(p));
    p.expect_token(TokenKind::RParen, "')'");
    let end = p.last_end_pos();
    p.build_node(kind, InputRange::new(start, end), children, Payload::None)
}

/// `EXTRACT '(' ident IN expr '|' expr ')'` — `Extract` (§3).
fn extract_function(p: &mut Parser) -> NodeId {
    let start = p.current_pos();
    p.bump();
    p.expect_token(TokenKind::LParen, "'('");
    let var = literal::identifier(p);
    let mut children = vec![var];
    p.expect_keyword("in");
    children.push(expression(p));
    p.expect_token(TokenKind::Pipe, "'|'");
    children.push(expression(p));
    p.expect_token(TokenKind::RParen, "')'");
    let end = p.last_end_pos();
    p.build_node(NodeKind::Extract, InputRange::new(start, end), children, Payload::None)
}

/// `REDUCE '(' ident '=' expr ',' ident IN expr '|' expr ')'` — `Reduce`
/// (§3): children are `[accumulator, init, variable, source, body]`.
fn reduce_function(p: &mut Parser) -> NodeId {
    let start = p.current_pos();
    p.bump();
    p.expect_token(TokenKind::LParen, "'('");
    let acc = literal::identifier(p);
    let mut children = vec![acc];
    p.expect_token(TokenKind::Eq, "'='");
    children.push(expression(p));
    p.expect_token(TokenKind::Comma, "','");
    let var = literal::identifier(p);
    children.push(var);
    p.expect_keyword("in");
    children.push(expression(p));
    p.expect_token(TokenKind::Pipe, "'|'");
    children.push(expression(p));
    p.expect_token(TokenKind::RParen, "')'");
    let end = p.last_end_pos();
    p.build_node(NodeKind::Reduce, InputRange::new(start, end), children, Payload::None)
}

/// `CASE expr? (WHEN expr THEN expr)+ (ELSE expr)? END` — `Case` (§3).
/// `HAS_TEST`/`HAS_ELSE` mark the two optional leading/trailing children so
/// the fixed `WHEN`/`THEN` pairs in between can always be read off two at a
/// time regardless of which optional parts are present.
fn case_expression(p: &mut Parser) -> NodeId {
    let start = p.current_pos();
    p.bump(); // CASE
    let mut children = Vec::new();
    let mut flags = NodeFlags::NONE;
    if !p.at_keyword("when") {
        children.push(expression(p));
        flags = flags.with(NodeFlags::HAS_TEST);
    }
    while p.eat_keyword("when") {
        children.push(expression(p));
        p.expect_keyword("then");
        children.push(expression(p));
    }
    if p.eat_keyword("else") {
        children.push(expression(p));
        flags = flags.with(NodeFlags::HAS_ELSE);
    }
    p.expect_keyword("end");
    let end = p.last_end_pos();
    p.build_node(NodeKind::Case, InputRange::new(start, end), children, Payload::Flags(flags))
}

/// `functionName '(' '*' ')'` (`ApplyAllOperator`, e.g. `count(*)`) or
/// `functionName '(' DISTINCT? (expr (',' expr)*)? ')'` (`ApplyOperator`).
fn function_call(p: &mut Parser) -> NodeId {
    let start = p.current_pos();
    if p.peek_nth(2).kind == TokenKind::Star && p.peek_nth(3).kind == TokenKind::RParen {
        let name = literal::function_name(p);
        p.bump(); // '('
        p.bump(); // '*'
        p.expect_token(TokenKind::RParen, "')'");
        let end = p.last_end_pos();
        return p.build_node(NodeKind::ApplyAllOperator, InputRange::new(start, end), vec![name], Payload::None);
    }

    let name = literal::function_name(p);
    let mut children = vec![name];
    p.expect_token(TokenKind::LParen, "'('");
    let distinct = p.eat_keyword("distinct");
    if p.peek_kind() != TokenKind::RParen {
        loop {
            children.push(expression(p));
            if !p.eat_token(TokenKind::Comma) {
                break;
            }
        }
    }
    p.expect_token(TokenKind::RParen, "')'");
    let end = p.last_end_pos();
    let flags = if distinct { NodeFlags::DISTINCT } else { NodeFlags::NONE };
    p.build_node(NodeKind::ApplyOperator, InputRange::new(start, end), children, Payload::Flags(flags))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::NodeKind;

    #[test]
    fn arithmetic_respects_precedence() {
        let mut p = Parser::new("1 + 2 * 3");
        let id = expression(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.kind(), NodeKind::BinaryOperator);
        assert_eq!(node.operator(), Some(Operator::Add));
        let rhs = p.arena.get(node.child(1).unwrap());
        assert_eq!(rhs.operator(), Some(Operator::Multiply));
    }

    #[test]
    fn power_is_right_associative() {
        let mut p = Parser::new("2 ^ 3 ^ 2");
        let id = expression(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.operator(), Some(Operator::Power));
        let rhs = p.arena.get(node.child(1).unwrap());
        assert_eq!(rhs.operator(), Some(Operator::Power));
    }

    #[test]
    fn comparison_chain_collapses_to_one_node() {
        let mut p = Parser::new("a < b <= c");
        let id = expression(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.kind(), NodeKind::Comparison);
        assert_eq!(node.nchildren(), 3);
        assert_eq!(node.operators(), &[Operator::LessThan, Operator::LessThanOrEqual]);
    }

    #[test]
    fn not_binds_tighter_than_and() {
        let mut p = Parser::new("NOT a AND b");
        let id = expression(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.operator(), Some(Operator::And));
        let lhs = p.arena.get(node.child(0).unwrap());
        assert_eq!(lhs.operator(), Some(Operator::Not));
    }

    #[test]
    fn is_not_null_is_one_postfix_node() {
        let mut p = Parser::new("a IS NOT NULL");
        let id = expression(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.kind(), NodeKind::UnaryOperator);
        assert_eq!(node.operator(), Some(Operator::IsNotNull));
        assert_eq!(node.nchildren(), 1);
    }

    #[test]
    fn property_access_chains() {
        let mut p = Parser::new("a.b.c");
        let id = expression(&mut p);
        let outer = p.arena.get(id);
        assert_eq!(outer.kind(), NodeKind::PropertyOperator);
        let inner = p.arena.get(outer.child(0).unwrap());
        assert_eq!(inner.kind(), NodeKind::PropertyOperator);
    }

    #[test]
    fn subscript_is_not_a_slice() {
        let mut p = Parser::new("a[0]");
        let id = expression(&mut p);
        assert_eq!(p.arena.get(id).kind(), NodeKind::SubscriptOperator);
    }

    #[test]
    fn open_upper_slice_has_no_max_open_flag() {
        let mut p = Parser::new("a[1..]");
        let id = expression(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.kind(), NodeKind::SliceOperator);
        assert_eq!(node.nchildren(), 2);
        assert!(!node.flags().contains(NodeFlags::MAX_OPEN));
    }

    #[test]
    fn open_lower_slice_sets_max_open() {
        let mut p = Parser::new("a[..5]");
        let id = expression(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.kind(), NodeKind::SliceOperator);
        assert_eq!(node.nchildren(), 2);
        assert!(node.flags().contains(NodeFlags::MAX_OPEN));
    }

    #[test]
    fn list_comprehension_is_distinguished_from_collection() {
        let mut p = Parser::new("[x IN list WHERE x > 0 | x * 2]");
        let id = expression(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.kind(), NodeKind::ListComprehension);
        assert_eq!(node.nchildren(), 4);
        assert!(node.flags().contains(NodeFlags::HAS_PREDICATE));
    }

    #[test]
    fn plain_collection_is_not_a_comprehension() {
        let mut p = Parser::new("[1, 2, 3]");
        let id = expression(&mut p);
        assert_eq!(p.arena.get(id).kind(), NodeKind::Collection);
    }

    #[test]
    fn case_without_test_has_no_has_test_flag() {
        let mut p = Parser::new("CASE WHEN a THEN 1 ELSE 2 END");
        let id = expression(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.kind(), NodeKind::Case);
        assert!(!node.flags().contains(NodeFlags::HAS_TEST));
        assert!(node.flags().contains(NodeFlags::HAS_ELSE));
        assert_eq!(node.nchildren(), 3);
    }

    #[test]
    fn function_call_with_distinct() {
        let mut p = Parser::new("count(DISTINCT a)");
        let id = expression(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.kind(), NodeKind::ApplyOperator);
        assert!(node.flags().contains(NodeFlags::DISTINCT));
        assert_eq!(node.nchildren(), 2);
    }

    #[test]
    fn count_star_is_apply_all() {
        let mut p = Parser::new("count(*)");
        let id = expression(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.kind(), NodeKind::ApplyAllOperator);
        assert_eq!(node.nchildren(), 1);
    }

    #[test]
    fn labels_operator_chains() {
        let mut p = Parser::new("n:Person:Employee");
        let id = expression(&mut p);
        let node = p.arena.get(id);
        assert_eq!(node.kind(), NodeKind::LabelsOperator);
        assert_eq!(node.nchildren(), 3);
    }
}
