// src/symtab.rs

use indexmap::IndexMap;

use crate::ast::Node;
use crate::error::{SymbolError, SymbolKind};

pub const MAX_VARS: usize = 100;
pub const MAX_FUNCS: usize = 50;

/// Variable and function bindings consulted by the evaluator.
///
/// Both maps are last-write-wins and keep insertion order for listing.
/// A new name is refused once a map is at capacity; overwriting an existing
/// name always succeeds.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    variables: IndexMap<String, f64>,
    functions: IndexMap<String, Node>,
    max_vars: usize,
    max_funcs: usize,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::with_capacity(MAX_VARS, MAX_FUNCS)
    }

    pub fn with_capacity(max_vars: usize, max_funcs: usize) -> Self {
        SymbolTable {
            variables: IndexMap::new(),
            functions: IndexMap::new(),
            max_vars,
            max_funcs,
        }
    }

    // --- Variables ---

    pub fn store_variable(&mut self, name: &str, value: f64) -> Result<(), SymbolError> {
        if let Some(slot) = self.variables.get_mut(name) {
            *slot = value;
            return Ok(());
        }
        if self.variables.len() >= self.max_vars {
            return Err(SymbolError::CapacityExceeded {
                kind: SymbolKind::Variable,
                name: name.to_string(),
                capacity: self.max_vars,
            });
        }
        self.variables.insert(name.to_string(), value);
        Ok(())
    }

    pub fn lookup_variable(&self, name: &str) -> Option<f64> {
        self.variables.get(name).copied()
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, f64)> {
        self.variables.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    // --- Functions ---

    /// Takes ownership of `body`. A previous definition under the same name is
    /// dropped.
    pub fn store_function(&mut self, name: &str, body: Node) -> Result<(), SymbolError> {
        if let Some(slot) = self.functions.get_mut(name) {
            *slot = body;
            return Ok(());
        }
        if self.functions.len() >= self.max_funcs {
            return Err(SymbolError::CapacityExceeded {
                kind: SymbolKind::Function,
                name: name.to_string(),
                capacity: self.max_funcs,
            });
        }
        self.functions.insert(name.to_string(), body);
        Ok(())
    }

    pub fn lookup_function(&self, name: &str) -> Option<&Node> {
        self.functions.get(name)
    }

    pub fn functions(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.functions.iter().map(|(name, body)| (name.as_str(), body))
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn clear(&mut self) {
        self.variables.clear();
        self.functions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinOp;

    #[test]
    fn test_variable_last_write_wins() {
        let mut table = SymbolTable::new();
        table.store_variable("a", 1.0).unwrap();
        table.store_variable("a", 2.0).unwrap();
        assert_eq!(table.lookup_variable("a"), Some(2.0));
        assert_eq!(table.variable_count(), 1);
        assert_eq!(table.lookup_variable("b"), None);
    }

    #[test]
    fn test_function_overwrite_replaces_tree() {
        let mut table = SymbolTable::new();
        table.store_function("f", Node::var()).unwrap();
        table
            .store_function("f", Node::binary(BinOp::Mul, Node::var(), Node::number(2.0)))
            .unwrap();
        assert_eq!(table.function_count(), 1);
        assert_eq!(table.lookup_function("f").unwrap().to_string(), "(x * 2)");
    }

    #[test]
    fn test_tables_are_independent() {
        let mut table = SymbolTable::new();
        table.store_variable("f", 3.0).unwrap();
        table.store_function("f", Node::var()).unwrap();
        assert_eq!(table.lookup_variable("f"), Some(3.0));
        assert_eq!(table.lookup_function("f"), Some(&Node::Var));
    }

    #[test]
    fn test_capacity_is_reported() {
        let mut table = SymbolTable::with_capacity(2, 1);
        table.store_variable("a", 1.0).unwrap();
        table.store_variable("b", 2.0).unwrap();
        let err = table.store_variable("c", 3.0).unwrap_err();
        assert_eq!(
            err,
            SymbolError::CapacityExceeded {
                kind: SymbolKind::Variable,
                name: "c".to_string(),
                capacity: 2
            }
        );
        assert_eq!(table.lookup_variable("c"), None);
        // Overwrites still succeed on a full table.
        table.store_variable("a", 10.0).unwrap();
        assert_eq!(table.lookup_variable("a"), Some(10.0));

        table.store_function("f", Node::var()).unwrap();
        assert!(table.store_function("g", Node::var()).is_err());
        assert!(table.store_function("f", Node::number(1.0)).is_ok());
    }

    #[test]
    fn test_enumeration_keeps_insertion_order() {
        let mut table = SymbolTable::new();
        for (name, value) in [("z", 1.0), ("a", 2.0), ("m", 3.0)] {
            table.store_variable(name, value).unwrap();
        }
        let names: Vec<&str> = table.variables().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["z", "a", "m"]);

        table.store_function("g", Node::var()).unwrap();
        table.clear();
        assert_eq!(table.variable_count(), 0);
        assert_eq!(table.function_count(), 0);
    }
}
