//! Core math modules.

pub mod backend;
pub mod binomial;
pub mod special;
pub mod stable;
pub mod smoothing;
