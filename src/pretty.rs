// src/pretty.rs

// Box-drawing dump of a tree, used by the `tree` and `show` commands.

use std::fmt::Write;

use crate::ast::Node;

pub fn render_tree(node: &Node) -> String {
    let mut out = String::new();
    render_into(&mut out, node, "", false);
    out
}

fn label(node: &Node) -> String {
    match node {
        Node::Number(n) => format!("NUMBER: {:.4}", n),
        Node::Var => "VAR: x".to_string(),
        Node::Identifier(name) => format!("ID: {}", name),
        Node::BinaryOp(op, _, _) => format!("OP: {}", op),
        Node::Negate(_) => "NEG".to_string(),
        Node::Function1(func, _) => format!("FUNC: {}", func),
        Node::Function2(func, _, _) => format!("FUNC2: {}", func),
        Node::Derivative(name, _) => format!("DERIV: {}", name),
    }
}

fn render_into(out: &mut String, node: &Node, prefix: &str, has_sibling: bool) {
    let branch = if has_sibling { "├── " } else { "└── " };
    // Writing to a String cannot fail.
    let _ = writeln!(out, "{}{}{}", prefix, branch, label(node));

    let child_prefix = format!("{}{}", prefix, if has_sibling { "│   " } else { "    " });
    let children = node.children();
    let last = children.len().saturating_sub(1);
    for (i, child) in children.into_iter().enumerate() {
        render_into(out, child, &child_prefix, i < last);
    }
}
