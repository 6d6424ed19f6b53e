// src/lib.rs
// ISF Reader Library - Public API

//! # ISF Reader
//!
//! A Rust library for reading Tektronix ISF waveform files, as saved by
//! the MDO, MSO and DPO series oscilloscopes.
//!
//! ## Features
//!
//! - Tokenize the textual `:NAME value;` header and locate the binary curve
//! - Signed, unsigned and floating point samples, either byte order
//! - `Y` (one value per point) and `ENV` (min/max pairs) records
//! - Scale raw digitizing levels to physical units
//! - Export data to CSV format
//!
//! ## Example
//!
//! ```no_run
//! use isf_reader::{IsfFile, Point};
//!
//! let isf = IsfFile::load("capture.isf").expect("Failed to load file");
//!
//! println!("Points: {}", isf.waveform.len());
//! println!("Vertical unit: {:?}", isf.header.get("YUNIT"));
//!
//! for point in isf.waveform.points().take(3) {
//!     if let Point::Y { x, y } = point {
//!         println!("{} s: {} V", x, y);
//!     }
//! }
//!
//! // Export to CSV
//! isf.write_csv("output.csv", false).expect("Failed to write CSV");
//! ```

pub mod config;
pub mod convert;
pub mod decoder;
pub mod error;
pub mod header;
pub mod layout;
pub mod waveform;
mod isf_tools;

pub use config::{DuplicateFields, ReaderConfig};
pub use decoder::SampleArray;
pub use error::{IsfError, IsfWarning, Result};
pub use header::{Header, HeaderValue, PayloadDescriptor};
pub use isf_tools::{read_isf, IsfFile};
pub use layout::{BinaryLayout, ElementKind, Endianness, PointFormat, Representation};
pub use waveform::{PhysicalWaveform, Point};
