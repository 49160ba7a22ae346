//! Call frames
//!
//! One frame per method invocation, holding the receiver and the parameter
//! bindings. Frames live on the interpreter's call stack and are never shared,
//! so a recursive call can't disturb its caller's bindings.

use std::collections::HashMap;

use crate::heap::Handle;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct CallFrame {
    /// The object `me` refers to
    pub receiver: Handle,

    /// Method being executed, recorded in trace events
    pub method: String,

    params: HashMap<String, Value>,
}

impl CallFrame {
    /// Bind parameters to arguments positionally. Callers check the arity.
    pub fn new(receiver: Handle, method: &str, params: &[String], args: Vec<Value>) -> Self {
        Self {
            receiver,
            method: method.to_string(),
            params: params.iter().cloned().zip(args).collect(),
        }
    }

    /// Frame used while evaluating field defaults of a new object
    pub fn for_init(receiver: Handle) -> Self {
        Self {
            receiver,
            method: String::from("<init>"),
            params: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Rebind an existing parameter; returns false if `name` isn't one
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        match self.params.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.params.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_and_assign() {
        let params = vec!["a".to_string(), "b".to_string()];
        let mut frame = CallFrame::new(Handle(0), "f", &params, vec![Value::Int(1), Value::Bool(true)]);

        assert_eq!(frame.get("a"), Some(&Value::Int(1)));
        assert!(frame.assign("b", Value::Bool(false)));
        assert_eq!(frame.get("b"), Some(&Value::Bool(false)));
        assert!(!frame.assign("c", Value::Int(0)));
        assert!(!frame.contains("c"));
    }

    #[test]
    fn test_frames_are_independent() {
        let params = vec!["n".to_string()];
        let outer = CallFrame::new(Handle(0), "fact", &params, vec![Value::Int(5)]);
        let mut inner = CallFrame::new(Handle(0), "fact", &params, vec![Value::Int(4)]);
        inner.assign("n", Value::Int(0));

        assert_eq!(outer.method, "fact");
        assert_eq!(outer.get("n"), Some(&Value::Int(5)));
        assert_eq!(inner.get("n"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_init_frame_has_no_params() {
        let frame = CallFrame::for_init(Handle(2));
        assert_eq!(frame.values().count(), 0);
        assert_eq!(frame.receiver, Handle(2));
        assert_eq!(frame.method, "<init>");
    }
}
