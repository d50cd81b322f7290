// lib.rs      gifcut crate.
//
// Copyright (c) 2026  gifcut developers
//
//! A library for splitting, joining and retiming GIF animations.
//!
//! GIFs are parsed at the block level into a [Document]; image data stays
//! LZW-compressed and is copied verbatim.  Frames can be sliced into
//! single-frame documents, appended from other documents, and retimed.
//! Resizing is delegated to a raster library through the [Rescale] trait.
//!
//! [Document]: struct.Document.html
//! [Rescale]: trait.Rescale.html
#![forbid(unsafe_code)]

pub mod block;
mod cursor;
mod decode;
mod document;
mod encode;
mod error;
mod field;
#[cfg(test)]
mod fixture;
mod raster;

pub use crate::decode::Parser;
pub use crate::document::{Document, Slices};
pub use crate::encode::Builder;
pub use crate::error::{Error, Result};
pub use crate::field::bits;
pub use crate::raster::{ImageRescaler, Rescale};
pub use image::imageops::FilterType;
