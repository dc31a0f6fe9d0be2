mod cb_ops;
mod cpu;
mod ops;

pub use cpu::{Cpu, Flag, R8};
