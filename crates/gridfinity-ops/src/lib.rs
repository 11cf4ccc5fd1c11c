//! Gridfinity construction primitives and feature builders.
//!
//! Every builder takes a `&mut dyn KernelBundle` and typed dimensions, and
//! returns a kernel shape handle. Composition order lives in the engine.

pub mod base;
pub mod baseplate;
pub mod body;
pub mod compartments;
pub mod constants;
pub mod eco;
pub mod fillet;
pub mod holes;
pub mod kernel_ext;
pub mod label_shelf;
pub mod lip;
pub mod outline;
pub mod scoop;
pub mod shape_ops;
pub mod sketch;
pub mod types;

pub use kernel_ext::KernelBundle;
pub use outline::{Footprint, GridSpec};
pub use shape_ops::{copy_and_translate, multi_fuse};
pub use types::*;
