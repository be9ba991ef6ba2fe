//! Allocation records and the method table their stacks refer to.

pub mod method_table;
pub mod store;

pub use method_table::{FrameId, MethodInfo, MethodTable};
pub use store::{AllocationRecord, AllocationRecordStore, AllocationTotals, StackOrder};
