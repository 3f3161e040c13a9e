//! Write-once variable type table

use crate::error::{AnalysisError, Result};
use indexmap::IndexMap;
use serde::Serialize;
use yolol_ast::Type;

/// Read access to known variable types
pub trait TypeLookup {
    /// The type recorded for `name`, or `None` when nothing is known yet
    fn type_of(&self, name: &str) -> Option<Type>;
}

impl<F> TypeLookup for F
where
    F: Fn(&str) -> Option<Type>,
{
    fn type_of(&self, name: &str) -> Option<Type> {
        self(name)
    }
}

/// Maps variable names to types. Each name can be assigned once; a second
/// assignment means the input had two write sites for that name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TypeAssignmentTable {
    types: IndexMap<String, Type>,
}

impl TypeAssignmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the type of `name`.
    ///
    /// The error flag is dropped when a value kind remains, so
    /// `number|error` is stored as `number`; a bare `error` is kept.
    pub fn assign(&mut self, name: &str, ty: Type) -> Result<()> {
        if let Some(&existing) = self.types.get(name) {
            return Err(AnalysisError::DuplicateTypeAssignment {
                name: name.to_string(),
                existing,
                attempted: ty,
            });
        }

        let stored = if ty.without_error().is_unassigned() {
            ty
        } else {
            ty.without_error()
        };
        self.types.insert(name.to_string(), stored);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Entries in assignment order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Type)> {
        self.types.iter().map(|(name, ty)| (name.as_str(), *ty))
    }
}

impl TypeLookup for TypeAssignmentTable {
    fn type_of(&self, name: &str) -> Option<Type> {
        self.types.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_once() {
        let mut table = TypeAssignmentTable::new();
        table.assign("a", Type::NUMBER).unwrap();

        assert_eq!(table.type_of("a"), Some(Type::NUMBER));
        assert_eq!(table.type_of("b"), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_double_assignment_is_rejected() {
        let mut table = TypeAssignmentTable::new();
        table.assign("a", Type::NUMBER).unwrap();

        let err = table.assign("a", Type::NUMBER).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::DuplicateTypeAssignment {
                name: "a".to_string(),
                existing: Type::NUMBER,
                attempted: Type::NUMBER,
            }
        );
        // First value survives
        assert_eq!(table.type_of("a"), Some(Type::NUMBER));
    }

    #[test]
    fn test_error_flag_masked() {
        let mut table = TypeAssignmentTable::new();
        table.assign("q", Type::NUMBER | Type::ERROR).unwrap();
        table.assign("bad", Type::ERROR).unwrap();

        assert_eq!(table.type_of("q"), Some(Type::NUMBER));
        assert_eq!(table.type_of("bad"), Some(Type::ERROR));
    }

    #[test]
    fn test_closure_lookup() {
        let lookup = |name: &str| (name == "s").then_some(Type::STRING);
        assert_eq!(lookup.type_of("s"), Some(Type::STRING));
        assert_eq!(lookup.type_of("t"), None);
    }

    #[test]
    fn test_iter_in_assignment_order() {
        let mut table = TypeAssignmentTable::new();
        table.assign("z", Type::STRING).unwrap();
        table.assign("a", Type::NUMBER).unwrap();

        let entries: Vec<_> = table.iter().collect();
        assert_eq!(entries, vec![("z", Type::STRING), ("a", Type::NUMBER)]);
    }
}
