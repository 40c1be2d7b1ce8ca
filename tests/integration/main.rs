//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the monitor against
//! mock host adapters.  No feed unit or host software is required.

mod mock_hw;
mod runtime_tests;
