//! Program registry: class name -> definition

use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{ClassDecl, Program};
use crate::class::ClassDef;
use crate::error::{ErrorKind, QuillError, Result};

/// All classes known to a program
#[derive(Debug, Default)]
pub struct Registry {
    classes: HashMap<String, Rc<ClassDef>>,
    /// Names in registration order
    order: Vec<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from every class in a parsed program
    pub fn from_program(program: &Program) -> Result<Self> {
        let mut registry = Self::new();
        for decl in &program.classes {
            registry.register(decl)?;
        }
        Ok(registry)
    }

    /// Build and store one class definition
    pub fn register(&mut self, decl: &ClassDecl) -> Result<Rc<ClassDef>> {
        if self.classes.contains_key(&decl.name) {
            return Err(QuillError::at(
                ErrorKind::DuplicateClass(decl.name.clone()),
                decl.span,
            ));
        }

        let class = Rc::new(ClassDef::from_decl(decl)?);
        tracing::debug!(
            class = %class.name,
            fields = class.fields.len(),
            methods = class.methods.len(),
            "registered class"
        );

        self.classes.insert(decl.name.clone(), Rc::clone(&class));
        self.order.push(decl.name.clone());
        Ok(class)
    }

    pub fn resolve(&self, name: &str) -> Result<Rc<ClassDef>> {
        self.classes
            .get(name)
            .cloned()
            .ok_or_else(|| QuillError::new(ErrorKind::UndefinedClass(name.to_string()), None))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Class names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn clear(&mut self) {
        self.classes.clear();
        self.order.clear();
    }
}
