//! prelude exports common things for Tiny BASIC IL tooling such as the
//! instruction table and memory image modules.

/// prelude exports common items for IL assembly and disassembly.
pub mod prelude {
    pub use memory::*;
    pub use opcodes::*;
}
