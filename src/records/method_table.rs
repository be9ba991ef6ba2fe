//! Method identities referenced by captured stack frames.

use crate::utils::config::{NATIVE_SUFFIX, VM_ALLOC_CLASS, VM_ALLOC_LABEL, VM_ALLOC_METHOD};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a method in the [`MethodTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameId(pub u32);

impl FrameId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One method as reported by the capture feed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodInfo {
    /// Declaring class in VM form
    pub class_name: String,

    pub method_name: String,

    /// VM signature, e.g. `(I)V`
    #[serde(default)]
    pub signature: String,

    /// Native methods are shown with a suffix
    #[serde(default)]
    pub native: bool,
}

impl MethodInfo {
    pub fn new(class_name: impl Into<String>, method_name: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
            signature: signature.into(),
            native: false,
        }
    }

    pub fn native(mut self) -> Self {
        self.native = true;
        self
    }

    /// The synthetic frame the agent reports for allocations made by the VM
    /// itself rather than by bytecode
    pub fn is_vm_allocation(&self) -> bool {
        self.class_name == VM_ALLOC_CLASS && self.method_name == VM_ALLOC_METHOD
    }

    /// Name shown for a frame: `Class.method`, `Class.method [native]`, or a
    /// fixed label for VM allocations
    pub fn display_name(&self) -> String {
        if self.is_vm_allocation() {
            return VM_ALLOC_LABEL.to_string();
        }
        let name = format!("{}.{}", self.class_name.replace('/', "."), self.method_name);
        if self.native {
            format!("{} {}", name, NATIVE_SUFFIX)
        } else {
            name
        }
    }
}

/// All methods referenced by the stacks of one capture
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodTable {
    methods: Vec<MethodInfo>,
}

impl MethodTable {
    pub fn new(methods: Vec<MethodInfo>) -> Self {
        Self { methods }
    }

    /// Register a method and return its frame id
    pub fn push(&mut self, method: MethodInfo) -> FrameId {
        self.methods.push(method);
        FrameId((self.methods.len() - 1) as u32)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn get(&self, id: FrameId) -> Option<&MethodInfo> {
        self.methods.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &MethodInfo> {
        self.methods.iter()
    }

    pub fn contains(&self, id: FrameId) -> bool {
        id.index() < self.methods.len()
    }

    pub fn display_name(&self, id: FrameId) -> String {
        match self.get(id) {
            Some(method) => method.display_name(),
            None => format!("<unresolved {}>", id),
        }
    }
}
