//! Binding strength of binary operators
//!
//! Higher binds tighter. Unary operators bind tighter than every entry here,
//! and delimiters (`()`, `[]`, `{}`, argument lists) tighter still.

use crate::lexer::Operator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
    /// Exactly one operand pair; `a .. b .. c` is rejected
    NonAssociative,
}

pub const ASSIGNMENT: u8 = 1;
pub const LOGICAL_OR: u8 = 2;
pub const LOGICAL_AND: u8 = 3;
pub const COMPARISON: u8 = 4;
pub const RANGE: u8 = 5;
pub const BITWISE_OR: u8 = 6;
pub const BITWISE_AND: u8 = 7;
pub const SHIFT: u8 = 8;
pub const ADDITIVE: u8 = 9;
pub const MULTIPLICATIVE: u8 = 10;
pub const EXPONENT: u8 = 11;

/// Precedence and associativity of `op` in infix position, or `None` for
/// operators that are prefix-only (`!`, `~`)
pub fn binary_binding(op: Operator) -> Option<(u8, Associativity)> {
    use Operator::*;

    let binding = match op {
        Assign | PlusAssign | MinusAssign | StarAssign | SlashAssign | PercentAssign | StarStarAssign => {
            (ASSIGNMENT, Associativity::Right)
        }
        OrOr => (LOGICAL_OR, Associativity::Left),
        AndAnd => (LOGICAL_AND, Associativity::Left),
        Equal | NotEqual | Greater | Less | GreaterEqual | LessEqual | Spaceship | CaseEqual => {
            (COMPARISON, Associativity::Left)
        }
        DotDot | DotDotDot => (RANGE, Associativity::NonAssociative),
        Pipe | Caret => (BITWISE_OR, Associativity::Left),
        Ampersand => (BITWISE_AND, Associativity::Left),
        ShiftLeft | ShiftRight => (SHIFT, Associativity::Left),
        Plus | Minus => (ADDITIVE, Associativity::Left),
        Star | Slash | Percent => (MULTIPLICATIVE, Associativity::Left),
        StarStar => (EXPONENT, Associativity::Right),
        Bang | Tilde => return None,
    };

    Some(binding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_matches_binding_strength() {
        let order = [
            Operator::StarStar,
            Operator::Star,
            Operator::Plus,
            Operator::ShiftLeft,
            Operator::Ampersand,
            Operator::Pipe,
            Operator::DotDot,
            Operator::Less,
            Operator::AndAnd,
            Operator::OrOr,
            Operator::Assign,
        ];

        for pair in order.windows(2) {
            let (tighter, _) = binary_binding(pair[0]).unwrap();
            let (looser, _) = binary_binding(pair[1]).unwrap();
            assert!(tighter > looser, "{} should bind tighter than {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_associativity() {
        assert_eq!(binary_binding(Operator::StarStar).unwrap().1, Associativity::Right);
        assert_eq!(binary_binding(Operator::PlusAssign).unwrap().1, Associativity::Right);
        assert_eq!(binary_binding(Operator::Minus).unwrap().1, Associativity::Left);
        assert_eq!(binary_binding(Operator::DotDotDot).unwrap().1, Associativity::NonAssociative);
    }

    #[test]
    fn test_prefix_only_operators() {
        assert_eq!(binary_binding(Operator::Bang), None);
        assert_eq!(binary_binding(Operator::Tilde), None);
    }
}
