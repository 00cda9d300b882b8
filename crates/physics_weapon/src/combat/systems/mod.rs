//! Combat systems

pub mod damage;


pub use damage::*;
