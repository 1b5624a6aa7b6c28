//! Operator table (§3, C4).
//!
//! Binds every operator node to a fixed precedence and associativity, so the
//! expression grammar (`parser/grammar/expression.rs`) can be written as a
//! single precedence-climbing loop instead of one grammar rule per level.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
    /// Comparison chains (`a < b < c`) and unary/postfix forms that don't
    /// recurse into themselves at the same precedence.
    None,
}

/// Every operator a `BinaryOperator`/`UnaryOperator`/`Comparison` node can
/// carry, plus the postfix operators that share the same precedence-climbing
/// loop (property/subscript/slice/label access, and the two "apply" forms
/// used by function calls).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Or,
    Xor,
    And,
    Not,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    RegexMatch,
    In,
    StartsWith,
    Contains,
    IsNull,
    IsNotNull,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    UnaryPlus,
    UnaryMinus,
    /// `expr.prop`
    Property,
    /// `expr[index]`
    Subscript,
    /// `expr[from..to]`
    Slice,
    /// `expr:Label`
    Labels,
    /// `name(args...)`
    Apply,
    /// `name(*)` (§"APPLY_ALL_OPERATOR" in the kind registry)
    ApplyAll,
}

impl Operator {
    /// Surface syntax, as written back out by the renderer's detail line.
    pub fn symbol(self) -> &'static str {
        use Operator::*;
        match self {
            Or => "OR",
            Xor => "XOR",
            And => "AND",
            Not => "NOT",
            Equal => "=",
            NotEqual => "<>",
            LessThan => "<",
            GreaterThan => ">",
            LessThanOrEqual => "<=",
            GreaterThanOrEqual => ">=",
            RegexMatch => "=~",
            In => "IN",
            StartsWith => "STARTS WITH",
            Contains => "CONTAINS",
            IsNull => "IS NULL",
            IsNotNull => "IS NOT NULL",
            Add => "+",
            Subtract => "-",
            Multiply => "*",
            Divide => "/",
            Modulo => "%",
            Power => "^",
            UnaryPlus => "+",
            UnaryMinus => "-",
            Property => ".",
            Subscript => "[]",
            Slice => "[..]",
            Labels => ":",
            Apply => "()",
            ApplyAll => "(*)",
        }
    }

    /// Binding power: higher binds tighter. Levels follow the openCypher
    /// grammar's own precedence table, lowest (`OR`) to highest (postfix
    /// property/subscript/slice/label access).
    pub fn precedence(self) -> u8 {
        use Operator::*;
        match self {
            Or => 1,
            Xor => 2,
            And => 3,
            Not => 4,
            Equal | NotEqual | LessThan | GreaterThan | LessThanOrEqual | GreaterThanOrEqual => 5,
            RegexMatch | In | StartsWith | Contains | IsNull | IsNotNull => 6,
            Add | Subtract => 7,
            Multiply | Divide | Modulo => 8,
            Power => 9,
            UnaryPlus | UnaryMinus => 10,
            Property | Subscript | Slice | Labels | Apply | ApplyAll => 11,
        }
    }

    pub fn associativity(self) -> Associativity {
        use Associativity::*;
        use Operator::*;
        match self {
            Power => Right,
            UnaryPlus | UnaryMinus | Not | IsNull | IsNotNull | Property | Subscript | Slice
            | Labels | Apply | ApplyAll => Associativity::None,
            _ => Left,
        }
    }

    /// Whether this operator takes a single operand (prefix or postfix),
    /// as opposed to two.
    pub fn is_unary(self) -> bool {
        matches!(
            self,
            Operator::Not
                | Operator::UnaryPlus
                | Operator::UnaryMinus
                | Operator::IsNull
                | Operator::IsNotNull
                | Operator::Property
                | Operator::Subscript
                | Operator::Slice
                | Operator::Labels
                | Operator::Apply
                | Operator::ApplyAll
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn or_binds_loosest() {
        assert!(Operator::Or.precedence() < Operator::And.precedence());
        assert!(Operator::And.precedence() < Operator::Add.precedence());
        assert!(Operator::Add.precedence() < Operator::Multiply.precedence());
        assert!(Operator::Multiply.precedence() < Operator::Power.precedence());
    }

    #[test]
    fn power_is_right_associative() {
        assert_eq!(Operator::Power.associativity(), Associativity::Right);
        assert_eq!(Operator::Add.associativity(), Associativity::Left);
    }
}
