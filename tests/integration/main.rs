//! Integration tests.

mod mock_backend;
