//! # CERTLINE Catalog
//!
//! The payload that travels through the hand-off pipeline.
//!
//! ## Design Principles
//!
//! 1. **Closed model set** - `Model` is a tagged enum with a per-variant
//!    constant table, never a string switch
//! 2. **Fixed-size tokens** - serials and codes are byte arrays filled by
//!    index
//! 3. **Injected randomness** - generation consumes a [`RandomSource`];
//!    seed it and the output is reproducible
//! 4. **Zero floating point** - retail prices are computed in [`Cents`]
//!
//! ## Example
//!
//! ```rust
//! use certline_catalog::{PriceCalculator, RecordGenerator, SeededSource};
//!
//! let mut rng = SeededSource::from_seed(7);
//! let record = RecordGenerator::new().generate(&mut rng).unwrap();
//! let retail = PriceCalculator::default().retail_price(&record);
//! assert!(retail.whole() >= u64::from(record.manufacturer_price()));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod certificate;
pub mod error;
pub mod fixed_point;
pub mod generator;
pub mod model;
pub mod pricing;
pub mod random;

pub use certificate::{Certificate, Code, Serial, Token, CODE_LEN, SERIAL_LEN};
pub use error::{CatalogError, CatalogResult};
pub use fixed_point::Cents;
pub use generator::{m3_checksum_code, RecordGenerator, M3_LETTER_COUNT, WARRANTY_CEILING};
pub use model::{CodeRule, Color, Model, ModelSpec};
pub use pricing::{PriceCalculator, DEFAULT_MARKUP_BP};
pub use random::{RandomSource, ScriptedSource, SeededSource};
