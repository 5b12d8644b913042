pub mod classes;
pub mod play;
