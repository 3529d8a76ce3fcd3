//! Rule sets. Only the 01 countdown family has scoring rules; Cricket is a
//! selectable variant without them.

pub mod x01;
