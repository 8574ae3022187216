//! # WSR Client Test Suite
//!
//! Unified test crate for the channel layer.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── scenarios.rs    # End-to-end subscribe / trigger / destroy flows
//!     ├── properties.rs   # Randomised bind/dispatch ordering checks
//!     └── concurrency.rs  # Multi-threaded trigger, bind and token grant
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p wsr-tests
//! cargo test -p wsr-tests integration::concurrency::
//!
//! # Benchmarks
//! cargo bench -p wsr-tests
//! ```

#![allow(dead_code)]
