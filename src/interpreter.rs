//! Tree-walking interpreter for Quill
//!
//! Owns the program registry, the object heap and the call stack. Expression
//! evaluation lives in [`crate::eval`] and statement execution in
//! [`crate::exec`]; both are `impl` blocks on [`Interpreter`].

use std::rc::Rc;

use crate::ast::{ClassDecl, Program};
use crate::class::ClassDef;
use crate::console::{Console, StdConsole};
use crate::error::{ErrorKind, QuillError, Result};
use crate::exec::Flow;
use crate::frame::CallFrame;
use crate::heap::{Handle, Heap, DEFAULT_GC_THRESHOLD};
use crate::registry::Registry;
use crate::token::Span;
use crate::value::Value;

/// Class instantiated by [`Interpreter::run_main`]
pub const ENTRY_CLASS: &str = "main";

/// Method invoked by [`Interpreter::run_main`]
pub const ENTRY_METHOD: &str = "main";

/// Default maximum number of nested invocations
pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

/// Remaining host stack below which evaluation grows the stack
pub(crate) const STACK_RED_ZONE: usize = 128 * 1024;

/// Host stack growth per step
pub(crate) const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Tunables for an interpreter run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Nested invocations allowed before a stack overflow fault
    pub max_call_depth: usize,

    /// Estimated heap bytes that trigger a collection
    pub gc_threshold: usize,
}

impl InterpreterConfig {
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn with_gc_threshold(mut self, bytes: usize) -> Self {
        self.gc_threshold = bytes;
        self
    }
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            gc_threshold: DEFAULT_GC_THRESHOLD,
        }
    }
}

/// The interpreter
pub struct Interpreter<C: Console = StdConsole> {
    pub registry: Registry,

    /// Object arena
    pub heap: Heap,

    /// Call stack; the last frame is the active one
    pub(crate) frames: Vec<CallFrame>,

    /// Values held only by the evaluator itself (operands and arguments
    /// evaluated so far), kept alive across collections
    pub(crate) roots: Vec<Value>,

    pub(crate) console: C,

    config: InterpreterConfig,
}

impl Interpreter<StdConsole> {
    /// An interpreter wired to stdin/stdout
    pub fn stdio() -> Self {
        Self::new(StdConsole)
    }
}

impl<C: Console> Interpreter<C> {
    pub fn new(console: C) -> Self {
        Self::with_config(console, InterpreterConfig::default())
    }

    pub fn with_config(console: C, config: InterpreterConfig) -> Self {
        Self {
            registry: Registry::new(),
            heap: Heap::with_threshold(config.gc_threshold),
            frames: Vec::new(),
            roots: Vec::new(),
            console,
            config,
        }
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn into_console(self) -> C {
        self.console
    }

    /// Register every class of a parsed program
    pub fn load(&mut self, program: &Program) -> Result<()> {
        for decl in &program.classes {
            self.register(decl)?;
        }
        Ok(())
    }

    pub fn register(&mut self, decl: &ClassDecl) -> Result<Rc<ClassDef>> {
        self.registry.register(decl)
    }

    /// Run `main.main`
    pub fn run_main(&mut self) -> Result<Value> {
        self.run(ENTRY_CLASS, ENTRY_METHOD)
    }

    /// Instantiate `class_name` and invoke `method_name` on it with no
    /// arguments. Any state left over from an earlier failed run is dropped.
    pub fn run(&mut self, class_name: &str, method_name: &str) -> Result<Value> {
        self.frames.clear();
        self.roots.clear();

        tracing::debug!(class = class_name, method = method_name, "run");
        let receiver = self.instantiate(class_name)?;
        let result = self.invoke(receiver, method_name, Vec::new(), None);

        self.frames.clear();
        self.roots.clear();
        result
    }

    /// Create a new instance of a registered class
    pub fn instantiate(&mut self, class_name: &str) -> Result<Handle> {
        let class = self.registry.resolve(class_name)?;
        self.instantiate_class(class, None)
    }

    /// Allocate an instance and evaluate its field defaults in declaration
    /// order. Each default only sees the fields initialized before it.
    pub(crate) fn instantiate_class(
        &mut self,
        class: Rc<ClassDef>,
        span: Option<Span>,
    ) -> Result<Handle> {
        self.check_depth(span)?;
        self.maybe_collect();

        let handle = self.heap.alloc_instance(Rc::clone(&class));
        tracing::debug!(class = %class.name, handle = handle.0, "instantiate");

        self.frames.push(CallFrame::for_init(handle));
        let result = self.init_fields(handle, &class);
        self.frames.pop();

        result.map(|()| handle)
    }

    fn init_fields(&mut self, handle: Handle, class: &ClassDef) -> Result<()> {
        for field in &class.fields {
            let value = self.eval_expr(&field.default)?;
            if let Some(instance) = self.heap.get_instance_mut(handle) {
                instance.fields.insert(field.name.clone(), value);
            }
        }
        Ok(())
    }

    /// Invoke a method on an object with already-evaluated arguments. Returns
    /// the method's return value, or `Void` if it finished without one.
    /// `span` is the call site, absent for the entry point.
    #[tracing::instrument(level = "debug", skip(self, args, span), fields(handle = receiver.0))]
    pub fn invoke(
        &mut self,
        receiver: Handle,
        method: &str,
        args: Vec<Value>,
        span: Option<Span>,
    ) -> Result<Value> {
        let class = self
            .heap
            .get_instance(receiver)
            .map(|instance| Rc::clone(&instance.class))
            .ok_or_else(|| QuillError::new(ErrorKind::NullDereference(method.to_string()), span))?;

        let def = class.method(method).ok_or_else(|| {
            QuillError::new(
                ErrorKind::UndefinedMethod {
                    class: class.name.clone(),
                    method: method.to_string(),
                },
                span,
            )
        })?;

        if def.arity() != args.len() {
            return Err(QuillError::new(
                ErrorKind::WrongArity {
                    method: method.to_string(),
                    expected: def.arity(),
                    got: args.len(),
                },
                span,
            ));
        }

        self.check_depth(span)?;

        self.frames.push(CallFrame::new(receiver, method, &def.params, args));
        let flow = self.exec_stmt(&def.body);
        self.frames.pop();

        match flow? {
            Flow::Return(value) => Ok(value),
            Flow::Continue => Ok(Value::Void),
        }
    }

    /// The active call frame
    pub(crate) fn frame(&self) -> &CallFrame {
        self.frames.last().expect("evaluation runs inside a call frame")
    }

    pub(crate) fn frame_mut(&mut self) -> &mut CallFrame {
        self.frames.last_mut().expect("evaluation runs inside a call frame")
    }

    pub fn call_depth(&self) -> usize {
        self.frames.len()
    }

    fn check_depth(&self, span: Option<Span>) -> Result<()> {
        if self.frames.len() >= self.config.max_call_depth {
            return Err(QuillError::new(
                ErrorKind::StackOverflow(self.config.max_call_depth),
                span,
            ));
        }
        Ok(())
    }

    // ==================== Garbage collection ====================

    fn maybe_collect(&mut self) {
        if self.heap.should_collect() {
            self.collect_garbage();
        }
    }

    pub fn collect_garbage(&mut self) {
        // 1. Mark roots
        self.mark_roots();

        // 2. Trace references
        self.heap.trace_references();

        // 3. Sweep
        let freed = self.heap.sweep();
        tracing::debug!(freed, live = self.heap.live_count(), "garbage collected");
    }

    fn mark_roots(&mut self) {
        for frame in &self.frames {
            self.heap.mark(frame.receiver);
            for value in frame.values() {
                self.heap.mark_value(value);
            }
        }

        for value in &self.roots {
            self.heap.mark_value(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::BufferedConsole;
    use crate::error::ErrorCategory;
    use crate::parser::parse_program;

    fn interpreter(source: &str) -> Interpreter<BufferedConsole> {
        let program = parse_program(source).expect("parse failed");
        let mut interp = Interpreter::new(BufferedConsole::new());
        interp.load(&program).expect("load failed");
        interp
    }

    #[test]
    fn test_run_entry_point() {
        let mut interp = interpreter("(class main (method main () (print \"hi\")))");
        assert_eq!(interp.run_main().unwrap(), Value::Void);
        assert_eq!(interp.console().output(), &["hi".to_string()]);
        assert_eq!(interp.call_depth(), 0);
    }

    #[test]
    fn test_missing_entry_class() {
        let mut interp = interpreter("(class other)");
        let err = interp.run_main().unwrap_err();
        assert_eq!(err.kind, ErrorKind::UndefinedClass("main".to_string()));
    }

    #[test]
    fn test_missing_entry_method() {
        let mut interp = interpreter("(class main (method start () (return 1)))");
        let err = interp.run_main().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Name);
        assert_eq!(err.span, None);
        assert_eq!(err.to_string(), "name error: class 'main' has no method 'main'");
    }

    #[test]
    fn test_instantiate_initializes_fields() {
        let mut interp = interpreter("(class point (field x 3) (field y (* x 2)))");
        let handle = interp.instantiate("point").unwrap();
        let instance = interp.heap.get_instance(handle).unwrap();
        assert_eq!(instance.field("x"), Some(&Value::Int(3)));
        assert_eq!(instance.field("y"), Some(&Value::Int(6)));
    }

    #[test]
    fn test_invoke_with_arguments() {
        let mut interp = interpreter("(class adder (method add (a b) (return (+ a b))))");
        let handle = interp.instantiate("adder").unwrap();
        let result = interp
            .invoke(handle, "add", vec![Value::Int(2), Value::Int(40)], None)
            .unwrap();
        assert_eq!(result, Value::Int(42));
    }

    #[test]
    fn test_invoke_wrong_arity() {
        let mut interp = interpreter("(class adder (method add (a b) (return (+ a b))))");
        let handle = interp.instantiate("adder").unwrap();
        let err = interp
            .invoke(handle, "add", vec![Value::Int(2)], None)
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Type);
    }

    #[test]
    fn test_stack_overflow_is_reported() {
        let program = parse_program("(class main (method main () (call me main)))").unwrap();
        let config = InterpreterConfig::default().with_max_call_depth(50);
        let mut interp = Interpreter::with_config(BufferedConsole::new(), config);
        interp.load(&program).unwrap();

        let err = interp.run_main().unwrap_err();
        assert_eq!(err.kind, ErrorKind::StackOverflow(50));
        assert_eq!(err.category(), ErrorCategory::Fault);
    }

    #[test]
    fn test_collect_keeps_reachable_objects() {
        let mut interp = interpreter("(class node (field next null)) (class holder (field keep (new node)))");
        let holder = interp.instantiate("holder").unwrap();
        interp.instantiate("node").unwrap();
        assert_eq!(interp.heap.live_count(), 3);

        interp.roots.push(Value::Object(holder));
        interp.collect_garbage();

        assert_eq!(interp.heap.live_count(), 2);
        assert!(interp.heap.get_instance(holder).is_some());
    }
}
