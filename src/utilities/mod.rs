pub mod matrix3x3;
pub mod memory;
