//! Wire types shared between the admin panel client layer and its front ends.

pub mod domain;
pub mod error;
pub mod protocol;
