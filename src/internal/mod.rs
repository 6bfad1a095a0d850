//! Internal numerical helpers.
//!
//! These modules contain small fixed-size linear algebra routines used by the
//! filters. All dimensions are compile-time constants.

pub mod linalg;
