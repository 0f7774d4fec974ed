pub mod invert;
pub mod timer;
