//! Sparse paged bitfield.
//!
//! Bits live in fixed-size pages that are only allocated once a non-zero
//! byte is written to them, so a bitfield tracking a few blocks near the end
//! of a huge log stays small. The dense byte image can be run-length encoded
//! with [`rle`] for transfer.
//!
//! # Core types
//!
//! - [`Pager`] / [`Page`]: the sparse page store.
//! - [`Bitfield`]: bit and byte access on top of a pager.

#![warn(missing_docs)]

mod bitfield;
mod error;
mod pager;
pub mod rle;

pub use bitfield::Bitfield;
pub use error::BitfieldError;
pub use pager::{DEFAULT_PAGE_SIZE, Page, Pager};

/// Alias for `core::result::Result<T, BitfieldError>`.
pub type Result<T> = core::result::Result<T, BitfieldError>;
