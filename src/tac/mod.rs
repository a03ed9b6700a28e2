// src/tac/mod.rs

// Three-address code emission.
pub mod instruction;
pub mod session;
pub mod generator;

pub use generator::generate_tac;
pub use instruction::{Instruction, Operand, TacSink, Temp};
pub use session::{Stencil, TacSession};
