//! Class and method definitions
//!
//! A [`ClassDef`] is built once from its declaration and never changes. Every
//! instance of the class shares the same method table through an `Rc`.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::ast::{ClassDecl, FieldDecl, MethodDecl, Stmt};
use crate::error::{ErrorKind, QuillError, Result};

/// A method ready for dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Stmt,
}

impl MethodDef {
    fn from_decl(decl: &MethodDecl) -> Result<Self> {
        let mut seen = HashSet::new();
        for param in &decl.params {
            if !seen.insert(param.as_str()) {
                return Err(QuillError::at(
                    ErrorKind::DuplicateParameter {
                        method: decl.name.clone(),
                        param: param.clone(),
                    },
                    decl.span,
                ));
            }
        }

        Ok(Self {
            name: decl.name.clone(),
            params: decl.params.clone(),
            body: decl.body.clone(),
        })
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Method name -> definition
pub type MethodTable = HashMap<String, Rc<MethodDef>>;

/// Static template for instances of one class
#[derive(Debug)]
pub struct ClassDef {
    pub name: String,
    /// Field defaults, in declaration order
    pub fields: Vec<FieldDecl>,
    pub methods: Rc<MethodTable>,
}

impl ClassDef {
    /// Build a class definition, rejecting repeated field, method or
    /// parameter names
    pub fn from_decl(decl: &ClassDecl) -> Result<Self> {
        let mut field_names = HashSet::new();
        for field in &decl.fields {
            if !field_names.insert(field.name.as_str()) {
                return Err(QuillError::at(
                    ErrorKind::DuplicateField {
                        class: decl.name.clone(),
                        field: field.name.clone(),
                    },
                    field.span,
                ));
            }
        }

        let mut methods = MethodTable::new();
        for method in &decl.methods {
            if methods.contains_key(&method.name) {
                return Err(QuillError::at(
                    ErrorKind::DuplicateMethod {
                        class: decl.name.clone(),
                        method: method.name.clone(),
                    },
                    method.span,
                ));
            }
            methods.insert(method.name.clone(), Rc::new(MethodDef::from_decl(method)?));
        }

        Ok(Self {
            name: decl.name.clone(),
            fields: decl.fields.clone(),
            methods: Rc::new(methods),
        })
    }

    pub fn method(&self, name: &str) -> Option<Rc<MethodDef>> {
        self.methods.get(name).cloned()
    }
}
