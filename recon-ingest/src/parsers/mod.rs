pub mod assembler;
pub mod line;
pub mod structured;
