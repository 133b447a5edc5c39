//! Surface syntax for the prefix-notation ontology language: nested
//! `Name(arg1 arg2 ...)` predicates, the shape OWL functional-style syntax
//! documents use. Ported from `examples/original_source/parser.go`'s
//! `DLPredicate`.

/// A predicate application: a name with zero or more nested arguments.
/// A leaf (an identifier or a quoted-string value with no following `(`)
/// has an empty `arguments` vec.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub name: String,
    pub arguments: Vec<Predicate>,
}

impl Predicate {
    pub fn leaf(name: impl Into<String>) -> Self {
        Predicate {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    /// Finds the first direct child named `Ontology`, the document's real
    /// root - the outermost parse result is itself an anonymous wrapper.
    pub fn find_ontology(&self) -> Option<&Predicate> {
        self.arguments.iter().find(|p| p.name == "Ontology")
    }
}
