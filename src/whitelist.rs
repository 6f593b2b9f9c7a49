//! The fixed vocabulary an expression may reference.
//!
//! The table is a `static` slice, so nothing can add to it at runtime.

use crate::ast::{Function, Variable};

/// The role a whitelisted name plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Bound to the sample index array.
    Variable(Variable),
    /// Elementwise function of one argument.
    Function1(Function),
    /// Elementwise function of two arguments.
    Function2(Function),
}

impl Binding {
    pub fn function(self) -> Option<Function> {
        match self {
            Binding::Variable(_) => None,
            Binding::Function1(f) | Binding::Function2(f) => Some(f),
        }
    }
}

pub static WHITELIST: &[(&str, Binding)] = &[
    ("t", Binding::Variable(Variable::Time)),
    ("sin", Binding::Function1(Function::Sin)),
    ("cos", Binding::Function1(Function::Cos)),
    ("tan", Binding::Function1(Function::Tan)),
    ("exp", Binding::Function1(Function::Exp)),
    ("sqrt", Binding::Function1(Function::Sqrt)),
    ("log", Binding::Function1(Function::Log)),
    ("abs", Binding::Function1(Function::Abs)),
    ("min", Binding::Function2(Function::Min)),
    ("max", Binding::Function2(Function::Max)),
];

pub fn lookup(name: &str) -> Option<Binding> {
    WHITELIST
        .iter()
        .find(|(entry, _)| *entry == name)
        .map(|(_, binding)| *binding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_function_is_listed_under_its_own_name_and_arity() {
        for (name, binding) in WHITELIST {
            match binding {
                Binding::Variable(_) => assert_eq!(*name, "t"),
                Binding::Function1(f) => {
                    assert_eq!(f.name(), *name);
                    assert_eq!(f.arity(), 1);
                }
                Binding::Function2(f) => {
                    assert_eq!(f.name(), *name);
                    assert_eq!(f.arity(), 2);
                }
            }
        }
    }

    #[test]
    fn lookup_is_exact() {
        assert_eq!(lookup("t"), Some(Binding::Variable(Variable::Time)));
        assert_eq!(lookup("max"), Some(Binding::Function2(Function::Max)));
        assert_eq!(lookup("T"), None);
        assert_eq!(lookup("np"), None);
        assert_eq!(lookup("__import__"), None);
    }
}
