use std::collections::HashMap;
use std::sync::Arc;

use crate::entry::{ClassEntry, MethodEntry};

/// What the `EnclosingMethod` attribute recorded for an anonymous or local
/// class.
#[derive(Clone, Debug)]
pub struct EnclosingMethodData {
    pub owner: Arc<ClassEntry>,
    /// Absent when the class is enclosed by an initializer or field
    /// assignment rather than a method.
    pub method: Option<Arc<MethodEntry>>,
}

/// Links anonymous/local classes to the method that encloses them.
#[derive(Default)]
pub struct EnclosingMethodIndex {
    data: HashMap<Arc<ClassEntry>, EnclosingMethodData>,
}

impl EnclosingMethodIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index_enclosing_method(&mut self, entry: &Arc<ClassEntry>, data: EnclosingMethodData) {
        self.data.insert(entry.clone(), data);
    }

    pub fn enclosing_method_data(&self, entry: &ClassEntry) -> Option<&EnclosingMethodData> {
        self.data.get(entry)
    }

    pub fn has_enclosing_method(&self, entry: &ClassEntry) -> bool {
        self.data.contains_key(entry)
    }
}
