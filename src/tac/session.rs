// src/tac/session.rs

use crate::tac::instruction::Temp;

/// The temporaries shared by every derivative in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stencil {
    /// `h = 1e-5`
    pub h: Temp,
    /// `<var> + h`
    pub plus: Temp,
    /// `<var> - h`
    pub minus: Temp,
    /// `2 * h`
    pub two_h: Temp,
}

/// Mutable state of one generation run: the temporary counter and the
/// lazily emitted derivative stencil.
///
/// Sessions are independent values. Reuse one across runs only after
/// [`TacSession::reset`], otherwise numbering continues and later derivatives
/// refer to the earlier run's stencil.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TacSession {
    next_temp: usize,
    stencil: Option<Stencil>,
    variable: String,
}

impl Default for TacSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TacSession {
    pub fn new() -> Self {
        Self::with_variable("x")
    }

    /// A session whose free variable lowers to `variable` instead of `x`.
    pub fn with_variable(variable: impl Into<String>) -> Self {
        TacSession { next_temp: 0, stencil: None, variable: variable.into() }
    }

    pub fn reset(&mut self) {
        self.next_temp = 0;
        self.stencil = None;
    }

    pub fn new_temp(&mut self) -> Temp {
        let temp = Temp(self.next_temp);
        self.next_temp += 1;
        temp
    }

    pub fn temps_allocated(&self) -> usize {
        self.next_temp
    }

    pub fn stencil(&self) -> Option<Stencil> {
        self.stencil
    }

    pub(crate) fn set_stencil(&mut self, stencil: Stencil) {
        self.stencil = Some(stencil);
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }
}
