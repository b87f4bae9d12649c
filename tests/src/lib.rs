//! # HTTP Agent Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Criterion benchmarks (request id, nonce, signing)
//! └── src/
//!     └── integration/  # End-to-end agent flows against mock collaborators
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p agent-tests
//! cargo test -p agent-tests integration::identity_flows
//! cargo bench -p agent-tests
//! ```

#![allow(dead_code)]
