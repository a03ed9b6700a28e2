// src/tac/instruction.rs

use std::fmt;

use crate::ast::BinOp;

/// A compiler temporary, printed as `t<index>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Temp(pub usize);

impl fmt::Display for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// The token holding a value: a temporary, a literal, or a bare name
/// (the free variable or an unresolved identifier).
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Temp(Temp),
    Literal(f64),
    Name(String),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Temp(t) => write!(f, "{}", t),
            Operand::Literal(n) => f.write_str(&literal_text(*n)),
            Operand::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Shortest text that parses back to `n`: plain or exponent form,
/// preferring plain on a tie (`2`, `0.1`, `1e-5`, `1e300`).
fn literal_text(n: f64) -> String {
    let plain = format!("{}", n);
    let exponent = format!("{:e}", n);
    if exponent.len() < plain.len() {
        exponent
    } else {
        plain
    }
}

impl From<Temp> for Operand {
    fn from(t: Temp) -> Self {
        Operand::Temp(t)
    }
}

/// One three-address instruction. Every instruction defines a fresh temporary.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// `dst = src`
    Copy { dst: Temp, src: Operand },
    /// `dst = - src`
    Negate { dst: Temp, src: Operand },
    /// `dst = lhs op rhs`
    Binary { dst: Temp, op: BinOp, lhs: Operand, rhs: Operand },
    /// `dst = func(args...)`
    Call { dst: Temp, func: &'static str, args: Vec<Operand> },
}

impl Instruction {
    pub fn dst(&self) -> Temp {
        match self {
            Instruction::Copy { dst, .. }
            | Instruction::Negate { dst, .. }
            | Instruction::Binary { dst, .. }
            | Instruction::Call { dst, .. } => *dst,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Copy { dst, src } => write!(f, "{} = {}", dst, src),
            Instruction::Negate { dst, src } => write!(f, "{} = - {}", dst, src),
            Instruction::Binary { dst, op, lhs, rhs } => write!(f, "{} = {} {} {}", dst, lhs, op, rhs),
            Instruction::Call { dst, func, args } => {
                write!(f, "{} = {}(", dst, func)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Append-only destination for emitted instructions.
pub trait TacSink {
    fn emit(&mut self, instruction: Instruction);
}

impl TacSink for Vec<Instruction> {
    fn emit(&mut self, instruction: Instruction) {
        self.push(instruction);
    }
}

/// Renders one instruction per line.
impl TacSink for String {
    fn emit(&mut self, instruction: Instruction) {
        self.push_str(&instruction.to_string());
        self.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_text() {
        let binary = Instruction::Binary {
            dst: Temp(0),
            op: BinOp::Pow,
            lhs: Operand::Name("x".to_string()),
            rhs: Operand::Literal(2.0),
        };
        assert_eq!(binary.to_string(), "t0 = x ^ 2");

        let call = Instruction::Call {
            dst: Temp(3),
            func: "max",
            args: vec![Operand::Temp(Temp(1)), Operand::Literal(-0.5)],
        };
        assert_eq!(call.to_string(), "t3 = max(t1, -0.5)");

        let neg = Instruction::Negate { dst: Temp(2), src: Operand::Name("a".to_string()) };
        assert_eq!(neg.to_string(), "t2 = - a");
        assert_eq!(neg.dst(), Temp(2));

        let copy = Instruction::Copy { dst: Temp(4), src: Operand::Literal(1e-5) };
        assert_eq!(copy.to_string(), "t4 = 1e-5");
    }

    #[test]
    fn test_literals_use_shortest_text() {
        let text = |n: f64| Operand::Literal(n).to_string();
        assert_eq!(text(2.0), "2");
        assert_eq!(text(0.1), "0.1");
        assert_eq!(text(-0.5), "-0.5");
        assert_eq!(text(250.0), "250");
        assert_eq!(text(1e-5), "1e-5");
        assert_eq!(text(1e300), "1e300");
        assert_eq!(text(-2.5e-12), "-2.5e-12");
        for n in [1e300, 1e-5, 0.1, 123456.789, -2.5e-12] {
            assert_eq!(text(n).parse::<f64>().unwrap(), n);
        }
    }

    #[test]
    fn test_string_sink_writes_lines() {
        let mut out = String::new();
        out.emit(Instruction::Copy { dst: Temp(0), src: Operand::Literal(0.1) });
        out.emit(Instruction::Negate { dst: Temp(1), src: Operand::Temp(Temp(0)) });
        assert_eq!(out, "t0 = 0.1\nt1 = - t0\n");
    }
}
