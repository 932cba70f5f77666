//! The Lua operator table
//!
//! A closed set: precedence, associativity and the unary/binary kinds for
//! every operator token. `-` is the only operator that is both unary and
//! binary; `..` and `^` are the only right-associative ones.

use crate::ast::{BinaryOpKind, UnaryOpKind};

/// Description of a single operator token
#[derive(Debug, Clone, Copy)]
pub struct OperatorInfo {
    /// The token text of the operator
    pub symbol: &'static str,
    /// Binding strength; higher binds tighter
    pub precedence: u8,
    pub right_associative: bool,
    /// Set if the operator can appear between two operands
    pub binary: Option<BinaryOpKind>,
    /// Set if the operator can prefix a single operand
    pub unary: Option<UnaryOpKind>,
}

const fn binary(symbol: &'static str, kind: BinaryOpKind, precedence: u8) -> OperatorInfo {
    OperatorInfo {
        symbol,
        precedence,
        right_associative: false,
        binary: Some(kind),
        unary: None,
    }
}

const fn unary(symbol: &'static str, kind: UnaryOpKind, precedence: u8) -> OperatorInfo {
    OperatorInfo {
        symbol,
        precedence,
        right_associative: false,
        binary: None,
        unary: Some(kind),
    }
}

/// The builtin Lua operators
pub const OPERATORS: &[OperatorInfo] = &[
    binary("or", BinaryOpKind::Or, 2),
    binary("and", BinaryOpKind::And, 3),
    binary("<", BinaryOpKind::LessThan, 4),
    binary("<=", BinaryOpKind::LessOrEqual, 4),
    binary(">", BinaryOpKind::GreaterThan, 4),
    binary(">=", BinaryOpKind::GreaterOrEqual, 4),
    binary("~=", BinaryOpKind::NotEqual, 4),
    binary("==", BinaryOpKind::Equal, 4),
    OperatorInfo {
        symbol: "..",
        precedence: 5,
        right_associative: true,
        binary: Some(BinaryOpKind::Concat),
        unary: None,
    },
    binary("+", BinaryOpKind::Add, 6),
    OperatorInfo {
        symbol: "-",
        precedence: 6,
        right_associative: false,
        binary: Some(BinaryOpKind::Subtract),
        unary: Some(UnaryOpKind::Negate),
    },
    binary("*", BinaryOpKind::Multiply, 7),
    binary("/", BinaryOpKind::Divide, 7),
    binary("%", BinaryOpKind::Modulo, 7),
    unary("not", UnaryOpKind::Invert, 8),
    unary("#", UnaryOpKind::Length, 8),
    OperatorInfo {
        symbol: "^",
        precedence: 9,
        right_associative: true,
        binary: Some(BinaryOpKind::Power),
        unary: None,
    },
];

/// Look up an operator by its token text
#[must_use]
pub fn lookup(symbol: &str) -> Option<&'static OperatorInfo> {
    OPERATORS.iter().find(|op| op.symbol == symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_basics() {
        assert!(lookup("nonsense").is_none());
        let concat = lookup("..").unwrap();
        assert!(concat.right_associative);
        assert_eq!(concat.precedence, 5);
    }

    #[test]
    fn minus_is_both() {
        let minus = lookup("-").unwrap();
        assert_eq!(minus.binary, Some(BinaryOpKind::Subtract));
        assert_eq!(minus.unary, Some(UnaryOpKind::Negate));
    }

    #[test]
    fn not_is_unary_only() {
        let not = lookup("not").unwrap();
        assert!(not.binary.is_none());
        assert_eq!(not.unary, Some(UnaryOpKind::Invert));
    }

    #[test]
    fn symbol_round_trip() {
        for op in OPERATORS {
            if let Some(kind) = op.binary {
                assert_eq!(kind.as_str(), op.symbol);
                assert_eq!(BinaryOpKind::from_symbol(op.symbol), Some(kind));
            }
            if let Some(kind) = op.unary {
                assert_eq!(UnaryOpKind::from_symbol(op.symbol), Some(kind));
            }
        }
    }
}
