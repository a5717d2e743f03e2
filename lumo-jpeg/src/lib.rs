//! This crate provides a library for decoding baseline, sequential,
//! 8-bit Huffman-coded JPEG images.
//!
//! # Features
//!  - Bounded, panic-free parsing; every failure mode is a typed
//!    error carrying the file offset it was detected at
//!  - A fast integer IDCT accurate to within one least significant
//!    bit of the real-valued transform
//!  - Fixed point YCbCr to RGB conversion
//!  - Optional planar YCbCr and grayscale output
//!
//! # Usage
//! Add lumo-jpeg to the dependencies in the project Cargo.toml
//!
//! ```toml
//! [dependencies]
//! lumo-jpeg = "0.1"
//! ```
//!
//! # Examples
//!
//! ## Decode a JPEG file to interleaved RGB
//! ```no_run
//! use lumo_jpeg::JpegDecoder;
//!
//! let data = std::fs::read("an_image.jpg").unwrap();
//! let mut decoder = JpegDecoder::new(&data);
//! let pixels = decoder.decode().unwrap();
//! let (width, height) = decoder.output_dimensions().unwrap();
//! ```
//!
//! ## Read image dimensions without decoding pixels
//! ```no_run
//! use lumo_jpeg::JpegDecoder;
//!
//! let data = std::fs::read("an_image.jpg").unwrap();
//! let mut decoder = JpegDecoder::new(&data);
//! decoder.decode_headers().unwrap();
//!
//! let info = decoder.info().unwrap();
//! println!("{} x {}", info.width, info.height);
//! ```
//!
//! # Scope
//! The decoder handles the baseline subset of the standard, one
//! sequential Huffman-coded scan of up to three 8-bit components.
//! Progressive and arithmetic-coded images, restart intervals and
//! 12-bit precision are rejected with a typed error rather than
//! mis-decoded. Images whose dimensions are not a multiple of the
//! MCU size decode to the full padded block grid by default; set
//! [`DecoderOptions::set_crop_to_dimensions`] to crop the raster to
//! the declared size.
//!
//! [`DecoderOptions::set_crop_to_dimensions`]: lumo_core::options::DecoderOptions::set_crop_to_dimensions

#![warn(
    clippy::correctness,
    clippy::perf,
    clippy::pedantic,
    clippy::inline_always,
    clippy::missing_errors_doc,
    clippy::panic
)]
#![allow(
    clippy::needless_return,
    clippy::similar_names,
    clippy::inline_always,
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]
#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

pub use lumo_core::colorspace::ColorSpace;
pub use lumo_core::options::DecoderOptions;

pub use crate::decoder::{ImageInfo, JpegDecoder};

mod bitstream;
mod color_convert;
mod components;
mod decoder;
pub mod errors;
mod headers;
mod huffman;
mod idct;
mod marker;
mod mcu;
mod misc;
mod worker;
