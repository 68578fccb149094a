//! Circuit description files and the transformations applied to them.

mod constant_rewriter;
mod descriptor;
mod naming;

pub use constant_rewriter::{ConstantRewriter, DEFAULT_CONSTANT_MARKER};
pub use descriptor::{CircuitDescriptor, DescriptorError, TransformedDescriptor};
pub use naming::to_test_name;
