//! External genome-distance tooling.

mod mash;

pub use mash::{check_mash, sketch_reference, MashProvider};
