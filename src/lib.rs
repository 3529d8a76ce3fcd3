pub mod detector;
pub mod engine;
pub mod games;
pub mod session;
