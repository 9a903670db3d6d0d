pub mod dos;
pub mod fdf;
pub mod output;
pub mod serialization;
pub mod xc;
