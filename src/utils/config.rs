//! Configuration and constants shared across the crate.

/// Current capture file schema version
pub const CAPTURE_SCHEMA_VERSION: &str = "1.0.0";

/// Default number of rows printed by the table commands
pub const DEFAULT_TOP_ROWS: usize = 25;

/// Number of records grouped between two cancellation checks during expansion
pub const CANCEL_CHECK_INTERVAL: usize = 4096;

/// Frame the profiler agent reports for allocations made by the VM itself
/// (reflection, JNI, array cloning). Rendered with [`VM_ALLOC_LABEL`].
pub const VM_ALLOC_CLASS: &str = "org.netbeans.lib.profiler.server.ProfilerRuntimeMemory";
pub const VM_ALLOC_METHOD: &str = "traceVMObjectAlloc";
pub const VM_ALLOC_LABEL: &str = "<VM allocation>";

/// Label for the synthetic node that collects records with an empty stack
pub const UNKNOWN_FRAME_LABEL: &str = "<unknown>";

/// Suffix appended to native method names
pub const NATIVE_SUFFIX: &str = "[native]";

/// Marker rendered instead of a percentage when the root total is zero
pub const NOT_APPLICABLE_LABEL: &str = "N/A";

/// Method wildcard used by class-level selectors
pub const ALL_METHODS_WILDCARD: &str = "*";
