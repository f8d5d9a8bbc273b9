//! Cross-module tests that evaluate whole manifests.
//!
//! Unit tests live next to the code they cover; these exercise classes,
//! scopes, functions and resources together.

mod manifest_tests;
