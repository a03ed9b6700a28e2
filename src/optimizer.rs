// src/optimizer.rs

use tracing::debug;

use crate::ast::{BinOp, Node};
use crate::math::{self, DIVISION_EPSILON};

/// Bottom-up constant folding.
///
/// Children are optimized first, then the node itself is replaced by a
/// `Number` when its operands are literals and the operation is foldable.
/// Division by a near-zero literal is left in place so the evaluator still
/// produces NaN for it, unary functions fold only per their catalog policy,
/// and derivatives are never folded.
pub fn optimize(node: Node) -> Node {
    match node {
        Node::Number(_) | Node::Var | Node::Identifier(_) => node,

        Node::BinaryOp(op, left, right) => {
            let left = optimize(*left);
            let right = optimize(*right);
            match (left.as_number(), right.as_number()) {
                (Some(a), Some(b)) => match fold_binary(op, a, b) {
                    Some(value) => {
                        debug!(%op, a, b, value, "folded binary op");
                        Node::Number(value)
                    }
                    None => Node::binary(op, left, right),
                },
                _ => Node::binary(op, left, right),
            }
        }

        Node::Negate(operand) => match optimize(*operand) {
            Node::Number(value) => Node::Number(-value),
            operand => Node::negate(operand),
        },

        Node::Function1(func, arg) => {
            let arg = optimize(*arg);
            match arg.as_number().and_then(|value| func.try_fold(value)) {
                Some(value) => {
                    debug!(%func, value, "folded unary function");
                    Node::Number(value)
                }
                None => Node::function1(func, arg),
            }
        }

        Node::Function2(func, a, b) => {
            let a = optimize(*a);
            let b = optimize(*b);
            match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => Node::Number(func.apply(x, y)),
                _ => Node::function2(func, a, b),
            }
        }

        Node::Derivative(name, arg) => Node::derivative(name, optimize(*arg)),
    }
}

fn fold_binary(op: BinOp, a: f64, b: f64) -> Option<f64> {
    match op {
        BinOp::Add => Some(a + b),
        BinOp::Sub => Some(a - b),
        BinOp::Mul => Some(a * b),
        BinOp::Div if b.abs() > DIVISION_EPSILON => Some(math::checked_div(a, b)),
        BinOp::Div => None,
        BinOp::Pow => Some(a.powf(b)),
    }
}

impl Node {
    /// Constant-folds the tree in place.
    pub fn optimize_in_place(&mut self) {
        let node = std::mem::replace(self, Node::Var);
        *self = optimize(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::BinaryFunc;

    fn num(n: f64) -> Node {
        Node::number(n)
    }

    #[test]
    fn test_folds_arithmetic() {
        let node = Node::binary(BinOp::Mul, Node::binary(BinOp::Add, num(2.0), num(3.0)), num(4.0));
        assert_eq!(optimize(node), num(20.0));
        assert_eq!(optimize(Node::binary(BinOp::Pow, num(2.0), num(10.0))), num(1024.0));
        assert_eq!(optimize(Node::binary(BinOp::Div, num(7.0), num(2.0))), num(3.5));
    }

    #[test]
    fn test_leaves_division_by_zero_unfolded() {
        let node = Node::binary(BinOp::Div, num(10.0), Node::binary(BinOp::Sub, num(1.0), num(1.0)));
        assert_eq!(optimize(node), Node::binary(BinOp::Div, num(10.0), num(0.0)));
    }

    #[test]
    fn test_folds_negation_and_function2() {
        assert_eq!(optimize(Node::negate(num(3.0))), num(-3.0));
        assert_eq!(optimize(Node::function2(BinaryFunc::Max, num(1.0), num(-2.0))), num(1.0));
        assert_eq!(optimize(Node::function2(BinaryFunc::Min, num(1.0), num(-2.0))), num(-2.0));
        let partial = Node::function2(BinaryFunc::Min, Node::var(), Node::binary(BinOp::Add, num(1.0), num(1.0)));
        assert_eq!(optimize(partial), Node::function2(BinaryFunc::Min, Node::var(), num(2.0)));
    }

    #[test]
    fn test_function1_folding_is_selective() {
        assert_eq!(optimize(Node::call1("sin", num(0.0)).unwrap()), num(0.0));
        assert_eq!(optimize(Node::call1("sqrt", num(16.0)).unwrap()), num(4.0));
        assert_eq!(optimize(Node::call1("abs", num(-2.5)).unwrap()), num(2.5));
        // sqrt of a negative literal and names outside the foldable subset stay.
        let sqrt_neg = Node::call1("sqrt", num(-1.0)).unwrap();
        assert_eq!(optimize(sqrt_neg.clone()), sqrt_neg);
        let log = Node::call1("log", num(100.0)).unwrap();
        assert_eq!(optimize(log.clone()), log);
        let floor = Node::call1("floor", Node::binary(BinOp::Add, num(1.2), num(1.0))).unwrap();
        assert_eq!(optimize(floor), Node::call1("floor", num(1.2 + 1.0)).unwrap());
    }

    #[test]
    fn test_derivative_is_never_folded() {
        let node = Node::derivative("deriv", Node::binary(BinOp::Add, num(1.0), num(2.0)));
        assert_eq!(optimize(node), Node::derivative("deriv", num(3.0)));
    }

    #[test]
    fn test_variable_trees_survive() {
        let node = Node::binary(BinOp::Add, Node::var(), Node::binary(BinOp::Mul, num(2.0), num(3.0)));
        assert_eq!(optimize(node), Node::binary(BinOp::Add, Node::var(), num(6.0)));
        let ident = Node::binary(BinOp::Mul, Node::identifier("a"), num(1.0));
        assert_eq!(optimize(ident.clone()), ident);
    }

    #[test]
    fn test_optimize_in_place_and_idempotence() {
        let mut node = Node::binary(
            BinOp::Sub,
            Node::call1("cos", num(0.0)).unwrap(),
            Node::binary(BinOp::Mul, Node::var(), Node::negate(num(2.0))),
        );
        node.optimize_in_place();
        assert_eq!(node, Node::binary(BinOp::Sub, num(1.0), Node::binary(BinOp::Mul, Node::var(), num(-2.0))));
        let again = optimize(node.clone());
        assert_eq!(again, node);
    }
}
