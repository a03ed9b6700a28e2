// src/ast.rs

use std::fmt;

use crate::functions::{BinaryFunc, UnaryFunc};

/// Arithmetic operators carried by `Node::BinaryOp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    pub fn symbol(self) -> char {
        match self {
            BinOp::Add => '+',
            BinOp::Sub => '-',
            BinOp::Mul => '*',
            BinOp::Div => '/',
            BinOp::Pow => '^',
        }
    }

    pub fn from_symbol(c: char) -> Option<BinOp> {
        match c {
            '+' => Some(BinOp::Add),
            '-' => Some(BinOp::Sub),
            '*' => Some(BinOp::Mul),
            '/' => Some(BinOp::Div),
            '^' => Some(BinOp::Pow),
            _ => None,
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

// AST Definition
//
// Children are boxed and exclusively owned, so a tree can never share a
// subtree between two parents and dropping the root frees everything once.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Number(f64),
    /// The free variable `x`.
    Var,
    Identifier(String),
    BinaryOp(BinOp, Box<Node>, Box<Node>),
    Negate(Box<Node>),
    Function1(UnaryFunc, Box<Node>),
    Function2(BinaryFunc, Box<Node>, Box<Node>),
    /// The name tag is carried for display only.
    Derivative(String, Box<Node>),
}

// --- Constructors ---
impl Node {
    pub fn number(value: f64) -> Node {
        Node::Number(value)
    }

    pub fn var() -> Node {
        Node::Var
    }

    pub fn identifier(name: impl Into<String>) -> Node {
        Node::Identifier(name.into())
    }

    pub fn binary(op: BinOp, left: Node, right: Node) -> Node {
        Node::BinaryOp(op, Box::new(left), Box::new(right))
    }

    pub fn negate(operand: Node) -> Node {
        Node::Negate(Box::new(operand))
    }

    pub fn function1(func: UnaryFunc, arg: Node) -> Node {
        Node::Function1(func, Box::new(arg))
    }

    pub fn function2(func: BinaryFunc, a: Node, b: Node) -> Node {
        Node::Function2(func, Box::new(a), Box::new(b))
    }

    pub fn derivative(name: impl Into<String>, arg: Node) -> Node {
        Node::Derivative(name.into(), Box::new(arg))
    }

    /// Builds a `Function1` node by catalog name.
    pub fn call1(name: &str, arg: Node) -> Option<Node> {
        UnaryFunc::from_name(name).map(|func| Node::function1(func, arg))
    }

    /// Builds a `Function2` node by catalog name.
    pub fn call2(name: &str, a: Node, b: Node) -> Option<Node> {
        BinaryFunc::from_name(name).map(|func| Node::function2(func, a, b))
    }
}

// --- Queries ---
impl Node {
    pub fn is_number(&self) -> bool {
        matches!(self, Node::Number(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Node::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Number(_) | Node::Var | Node::Identifier(_))
    }

    /// The node's children, left to right.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Number(_) | Node::Var | Node::Identifier(_) => Vec::new(),
            Node::Negate(child) | Node::Function1(_, child) | Node::Derivative(_, child) => {
                vec![child.as_ref()]
            }
            Node::BinaryOp(_, left, right) | Node::Function2(_, left, right) => {
                vec![left.as_ref(), right.as_ref()]
            }
        }
    }

    /// True if the free variable occurs anywhere in the tree. Identifiers are
    /// not resolved.
    pub fn depends_on_var(&self) -> bool {
        matches!(self, Node::Var) || self.children().into_iter().any(Node::depends_on_var)
    }

    pub fn node_count(&self) -> usize {
        1 + self.children().into_iter().map(Node::node_count).sum::<usize>()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Number(n) => write!(f, "{}", n),
            Node::Var => write!(f, "x"),
            Node::Identifier(name) => write!(f, "{}", name),
            Node::BinaryOp(op, left, right) => write!(f, "({} {} {})", left, op, right),
            Node::Negate(operand) => write!(f, "-({})", operand),
            Node::Function1(func, arg) => write!(f, "{}({})", func, arg),
            Node::Function2(func, a, b) => write!(f, "{}({}, {})", func, a, b),
            Node::Derivative(name, arg) => write!(f, "{}({})", name, arg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x_squared_plus_one() -> Node {
        Node::binary(
            BinOp::Add,
            Node::binary(BinOp::Pow, Node::var(), Node::number(2.0)),
            Node::number(1.0),
        )
    }

    #[test]
    fn test_constructors_fill_expected_slots() {
        let node = Node::function2(BinaryFunc::Max, Node::var(), Node::identifier("a"));
        match node {
            Node::Function2(BinaryFunc::Max, a, b) => {
                assert_eq!(*a, Node::Var);
                assert_eq!(*b, Node::Identifier("a".to_string()));
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_call_by_name() {
        assert_eq!(
            Node::call1("sin", Node::var()),
            Some(Node::Function1(UnaryFunc::Sin, Box::new(Node::Var)))
        );
        assert_eq!(Node::call1("frobnicate", Node::var()), None);
        assert!(Node::call2("min", Node::var(), Node::number(0.0)).is_some());
        assert!(Node::call2("sin", Node::var(), Node::number(0.0)).is_none());
    }

    #[test]
    fn test_display_is_parenthesised_infix() {
        assert_eq!(x_squared_plus_one().to_string(), "((x ^ 2) + 1)");
        let node = Node::derivative("deriv", Node::negate(Node::call1("ln", Node::var()).unwrap()));
        assert_eq!(node.to_string(), "deriv(-(ln(x)))");
    }

    #[test]
    fn test_queries() {
        let tree = x_squared_plus_one();
        assert_eq!(tree.node_count(), 5);
        assert!(tree.depends_on_var());
        assert!(!Node::binary(BinOp::Mul, Node::identifier("a"), Node::number(2.0)).depends_on_var());
        assert!(Node::Var.is_leaf());
        assert!(!tree.is_leaf());
        assert_eq!(Node::number(4.5).as_number(), Some(4.5));
        assert_eq!(Node::Var.as_number(), None);
    }

    #[test]
    fn test_binop_symbols() {
        for op in [BinOp::Add, BinOp::Sub, BinOp::Mul, BinOp::Div, BinOp::Pow] {
            assert_eq!(BinOp::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(BinOp::from_symbol('%'), None);
    }
}
