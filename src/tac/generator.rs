// src/tac/generator.rs

use tracing::{debug, trace};

use crate::ast::{BinOp, Node};
use crate::math::DERIVATIVE_STEP;
use crate::tac::instruction::{Instruction, Operand, TacSink, Temp};
use crate::tac::session::{Stencil, TacSession};

/// Linearizes `node` into three-address code written to `sink`, children
/// before parents, and returns the operand holding the node's value.
///
/// Temporaries are numbered from `session`, so consecutive calls on the same
/// session continue the numbering and share one derivative stencil.
pub fn generate_tac(node: &Node, sink: &mut dyn TacSink, session: &mut TacSession) -> Operand {
    let var = Operand::Name(session.variable().to_string());
    let mut generator = Generator { session, sink };
    generator.lower(node, &var)
}

struct Generator<'a> {
    session: &'a mut TacSession,
    sink: &'a mut dyn TacSink,
}

impl Generator<'_> {
    // `var` is the token the free variable lowers to. Derivatives re-lower
    // their operand with it replaced by the stencil's x+h and x-h.
    fn lower(&mut self, node: &Node, var: &Operand) -> Operand {
        match node {
            Node::Number(n) => Operand::Literal(*n),
            Node::Var => var.clone(),
            Node::Identifier(name) => Operand::Name(name.clone()),

            Node::BinaryOp(op, left, right) => {
                let lhs = self.lower(left, var);
                let rhs = self.lower(right, var);
                let dst = self.session.new_temp();
                self.emit(Instruction::Binary { dst, op: *op, lhs, rhs })
            }

            Node::Negate(operand) => {
                let src = self.lower(operand, var);
                let dst = self.session.new_temp();
                self.emit(Instruction::Negate { dst, src })
            }

            Node::Function1(func, arg) => {
                let arg = self.lower(arg, var);
                let dst = self.session.new_temp();
                self.emit(Instruction::Call { dst, func: func.name(), args: vec![arg] })
            }

            Node::Function2(func, a, b) => {
                let a = self.lower(a, var);
                let b = self.lower(b, var);
                let dst = self.session.new_temp();
                self.emit(Instruction::Call { dst, func: func.name(), args: vec![a, b] })
            }

            Node::Derivative(_, arg) => {
                let stencil = self.stencil(var);
                let plus = self.lower(arg, &Operand::from(stencil.plus));
                let minus = self.lower(arg, &Operand::from(stencil.minus));

                let diff = self.session.new_temp();
                let diff = self.emit(Instruction::Binary { dst: diff, op: BinOp::Sub, lhs: plus, rhs: minus });
                let dst = self.session.new_temp();
                self.emit(Instruction::Binary {
                    dst,
                    op: BinOp::Div,
                    lhs: diff,
                    rhs: stencil.two_h.into(),
                })
            }
        }
    }

    /// Returns the session's stencil, emitting it on first use.
    fn stencil(&mut self, var: &Operand) -> Stencil {
        if let Some(stencil) = self.session.stencil() {
            return stencil;
        }

        let h = self.session.new_temp();
        self.emit(Instruction::Copy { dst: h, src: Operand::Literal(DERIVATIVE_STEP) });
        let plus = self.session.new_temp();
        self.emit(Instruction::Binary { dst: plus, op: BinOp::Add, lhs: var.clone(), rhs: h.into() });
        let minus = self.session.new_temp();
        self.emit(Instruction::Binary { dst: minus, op: BinOp::Sub, lhs: var.clone(), rhs: h.into() });
        let two_h = self.session.new_temp();
        self.emit(Instruction::Binary { dst: two_h, op: BinOp::Mul, lhs: Operand::Literal(2.0), rhs: h.into() });

        let stencil = Stencil { h, plus, minus, two_h };
        debug!(?stencil, "emitted derivative stencil");
        self.session.set_stencil(stencil);
        stencil
    }

    fn emit(&mut self, instruction: Instruction) -> Operand {
        let dst: Temp = instruction.dst();
        trace!(%instruction, "emit");
        self.sink.emit(instruction);
        dst.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::BinaryFunc;
    use pretty_assertions::assert_eq;

    fn lines(node: &Node, session: &mut TacSession) -> (Vec<String>, String) {
        let mut out: Vec<Instruction> = Vec::new();
        let result = generate_tac(node, &mut out, session);
        (out.iter().map(|i| i.to_string()).collect(), result.to_string())
    }

    fn square() -> Node {
        Node::binary(BinOp::Pow, Node::var(), Node::number(2.0))
    }

    #[test]
    fn test_x_squared_plus_one() {
        let node = Node::binary(BinOp::Add, square(), Node::number(1.0));
        let (code, result) = lines(&node, &mut TacSession::new());
        assert_eq!(code, vec!["t0 = x ^ 2", "t1 = t0 + 1"]);
        assert_eq!(result, "t1");
    }

    #[test]
    fn test_leaves_lower_without_instructions() {
        let mut session = TacSession::new();
        assert_eq!(lines(&Node::number(2.5), &mut session), (vec![], "2.5".to_string()));
        assert_eq!(lines(&Node::var(), &mut session), (vec![], "x".to_string()));
        assert_eq!(lines(&Node::identifier("a"), &mut session), (vec![], "a".to_string()));
        assert_eq!(session.temps_allocated(), 0);
    }

    #[test]
    fn test_functions_and_negation() {
        let node = Node::function2(
            BinaryFunc::Max,
            Node::negate(Node::call1("sin", Node::var()).unwrap()),
            Node::identifier("k"),
        );
        let (code, result) = lines(&node, &mut TacSession::new());
        assert_eq!(code, vec!["t0 = sin(x)", "t1 = - t0", "t2 = max(t1, k)"]);
        assert_eq!(result, "t2");
    }

    #[test]
    fn test_derivative_expansion() {
        let node = Node::derivative("deriv", square());
        let (code, result) = lines(&node, &mut TacSession::new());
        assert_eq!(
            code,
            vec![
                "t0 = 1e-5",
                "t1 = x + t0",
                "t2 = x - t0",
                "t3 = 2 * t0",
                "t4 = t1 ^ 2",
                "t5 = t2 ^ 2",
                "t6 = t4 - t5",
                "t7 = t6 / t3",
            ]
        );
        assert_eq!(result, "t7");
    }

    #[test]
    fn test_stencil_is_emitted_once_per_session() {
        let node = Node::binary(
            BinOp::Add,
            Node::derivative("deriv", Node::var()),
            Node::derivative("deriv", Node::call1("sin", Node::var()).unwrap()),
        );
        let mut session = TacSession::new();
        let (code, result) = lines(&node, &mut session);
        assert_eq!(
            code,
            vec![
                "t0 = 1e-5",
                "t1 = x + t0",
                "t2 = x - t0",
                "t3 = 2 * t0",
                "t4 = t1 - t2",
                "t5 = t4 / t3",
                "t6 = sin(t1)",
                "t7 = sin(t2)",
                "t8 = t6 - t7",
                "t9 = t8 / t3",
                "t10 = t5 + t9",
            ]
        );
        assert_eq!(result, "t10");

        // Without a reset the next run continues numbering and reuses the stencil.
        let (code, _) = lines(&Node::derivative("deriv", Node::var()), &mut session);
        assert_eq!(code, vec!["t11 = t1 - t2", "t12 = t11 / t3"]);

        session.reset();
        let (code, result) = lines(&Node::derivative("deriv", Node::var()), &mut session);
        assert_eq!(code[0], "t0 = 1e-5");
        assert_eq!(code.len(), 6);
        assert_eq!(result, "t5");
    }

    #[test]
    fn test_nested_derivative_reuses_session_stencil() {
        let node = Node::derivative("deriv", Node::derivative("deriv", Node::var()));
        let (code, result) = lines(&node, &mut TacSession::new());
        assert_eq!(
            code,
            vec![
                "t0 = 1e-5",
                "t1 = x + t0",
                "t2 = x - t0",
                "t3 = 2 * t0",
                // inner derivative lowered with x -> t1; the stencil ignores the substitution
                "t4 = t1 - t2",
                "t5 = t4 / t3",
                // inner derivative lowered with x -> t2
                "t6 = t1 - t2",
                "t7 = t6 / t3",
                "t8 = t5 - t7",
                "t9 = t8 / t3",
            ]
        );
        assert_eq!(result, "t9");
        // Both inner runs compute the same difference, so the outer one is zero.
        assert_eq!(code[4], code[6].replace("t6", "t4"));
    }

    #[test]
    fn test_custom_variable_and_text_sink() {
        let mut session = TacSession::with_variable("u");
        let mut out = String::new();
        let node = Node::binary(BinOp::Mul, Node::number(3.0), Node::var());
        let result = generate_tac(&node, &mut out, &mut session);
        assert_eq!(out, "t0 = 3 * u\n");
        assert_eq!(result, Operand::Temp(Temp(0)));
    }
}
