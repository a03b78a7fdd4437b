//! Core rendering primitives
//!
//! The building blocks shared by every render path:
//! - Escape: SIMD-accelerated text/attribute escaping using memchr
//! - Value: loose attribute data and its generic textual representation
//! - Attributes: key transform, name validation and attribute formatting

pub mod attributes;
pub mod escape;
pub mod value;
