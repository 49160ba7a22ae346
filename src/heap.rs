//! Object arena with mark-and-sweep collection
//!
//! Object references are [`Handle`]s into this arena, never owning pointers,
//! so cyclic and self-referencing object graphs need no special treatment.
//! The interpreter supplies the roots; the heap only traces and sweeps.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::class::ClassDef;
use crate::value::Value;

/// Default collection threshold in estimated bytes
pub const DEFAULT_GC_THRESHOLD: usize = 1024 * 1024;

/// A safe handle to a heap-allocated object.
/// This acts as an index into the Heap's object storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(pub usize);

/// A live object: its class and its own field storage
#[derive(Debug)]
pub struct Instance {
    pub class: Rc<ClassDef>,
    pub fields: HashMap<String, Value>,
}

impl Instance {
    pub fn new(class: Rc<ClassDef>) -> Self {
        let capacity = class.fields.len();
        Self {
            class,
            fields: HashMap::with_capacity(capacity),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Overwrite an existing field; returns false if the field does not exist
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        match self.fields.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn children(&self) -> Vec<Handle> {
        self.fields.values().filter_map(Value::handle).collect()
    }

    pub fn size_bytes(&self) -> usize {
        std::mem::size_of::<Instance>()
            + self.fields.len() * (std::mem::size_of::<String>() + std::mem::size_of::<Value>())
    }
}

pub struct Heap {
    objects: Vec<Option<Instance>>,
    free_list: Vec<usize>,
    marked: HashSet<usize>,
    grey_stack: Vec<Handle>,

    pub bytes_allocated: usize,
    pub next_gc: usize,
    threshold: usize,
}

impl Heap {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_GC_THRESHOLD)
    }

    pub fn with_threshold(threshold: usize) -> Self {
        Self {
            objects: Vec::new(),
            free_list: Vec::new(),
            marked: HashSet::new(),
            grey_stack: Vec::new(),
            bytes_allocated: 0,
            next_gc: threshold,
            threshold,
        }
    }

    /// Allocate an instance with an empty field map
    pub fn alloc_instance(&mut self, class: Rc<ClassDef>) -> Handle {
        let obj = Instance::new(class);
        // Charged for its declared fields up front
        let size = obj.size_bytes()
            + obj.class.fields.len() * (std::mem::size_of::<String>() + std::mem::size_of::<Value>());
        self.bytes_allocated += size;

        if let Some(idx) = self.free_list.pop() {
            self.objects[idx] = Some(obj);
            Handle(idx)
        } else {
            let idx = self.objects.len();
            self.objects.push(Some(obj));
            Handle(idx)
        }
    }

    pub fn get_instance(&self, handle: Handle) -> Option<&Instance> {
        self.objects.get(handle.0)?.as_ref()
    }

    pub fn get_instance_mut(&mut self, handle: Handle) -> Option<&mut Instance> {
        self.objects.get_mut(handle.0)?.as_mut()
    }

    /// Number of objects currently alive
    pub fn live_count(&self) -> usize {
        self.objects.len() - self.free_list.len()
    }

    pub fn should_collect(&self) -> bool {
        self.bytes_allocated > self.next_gc
    }

    pub fn mark(&mut self, handle: Handle) {
        if self.marked.contains(&handle.0) {
            return;
        }

        if self.get_instance(handle).is_some() {
            self.marked.insert(handle.0);
            self.grey_stack.push(handle);
        }
    }

    pub fn mark_value(&mut self, value: &Value) {
        if let Some(handle) = value.handle() {
            self.mark(handle);
        }
    }

    pub fn trace_references(&mut self) {
        while let Some(handle) = self.grey_stack.pop() {
            let children = self
                .get_instance(handle)
                .map(Instance::children)
                .unwrap_or_default();

            for child in children {
                self.mark(child);
            }
        }
    }

    /// Free every unmarked object; returns how many were freed
    pub fn sweep(&mut self) -> usize {
        let mut freed = 0;
        let mut freed_bytes = 0;

        for i in 0..self.objects.len() {
            if !self.marked.contains(&i) {
                if let Some(obj) = self.objects[i].take() {
                    freed_bytes += obj.size_bytes();
                    self.free_list.push(i);
                    freed += 1;
                }
            }
        }

        self.bytes_allocated = self.bytes_allocated.saturating_sub(freed_bytes);
        self.marked.clear();

        self.next_gc = std::cmp::max(self.bytes_allocated * 2, self.threshold);
        freed
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}
