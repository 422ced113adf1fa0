//! Unit and integration tests for the vidnest client core.
//!
//! Network-facing tests run against an in-process stub of the media server (see
//! [`support`]), bound to an ephemeral port on 127.0.0.1.
//!
//! ## Test Modules
//!
//! - **bus_tests**: Delivery order, failure isolation and unsubscription
//! - **pipeline_tests**: Filtering, sorting and page arithmetic
//! - **view_tests**: Shared view state cursors, last-write-wins and teardown
//! - **push_tests**: Push message grammar, SSE decoding and the reconnect policy
//! - **api_tests**: Gateway toasts, failure handling and identifier encoding
//! - **actions_tests**: File, bookmark and URL actions against the stub server
//! - **settings_tests**: Merge over defaults and persistence
//! - **config_tests**: Configuration loading and validation
//! - **debounce_tests**: Trailing debounce on a paused clock
//! - **state_tests**: The application context end to end
//! - **format_tests**: Sizes, durations, dates and display titles
//! - **error_tests**: Error type and validation helpers
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test
//! cargo test push_tests
//! ```

pub mod support;

pub mod bus_tests;
pub mod debounce_tests;
pub mod format_tests;
