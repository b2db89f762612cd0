//! Meta-tests that verify test suite integrity
//!
//! These tests ensure that:
//! - E2E test files exist and are not empty
//! - Every e2e file exercises the public `sigscope` API

/// E2E test files that must be present
const E2E_FILES: [&str; 5] = [
    "e2e_config.rs",
    "e2e_dense.rs",
    "e2e_sparse.rs",
    "e2e_registry.rs",
    "e2e_concurrency.rs",
];

/// Verify E2E test files exist and are not empty
#[test]
fn e2e_tests_exist() {
    for file in E2E_FILES {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join(file);

        assert!(
            path.exists(),
            "Missing E2E test file: {}. All E2E tests must be present.",
            file
        );

        let metadata = std::fs::metadata(&path).expect("Failed to get file metadata");
        assert!(
            metadata.len() > 100,
            "E2E test file {} appears to be empty or too small ({} bytes)",
            file,
            metadata.len()
        );
    }
}

/// Verify each E2E file goes through the public crate and contains tests
#[test]
fn e2e_tests_use_public_api() {
    for file in E2E_FILES {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join(file);
        let source = std::fs::read_to_string(&path).expect("Failed to read test file");

        assert!(
            source.contains("use sigscope::"),
            "{} must test through the public sigscope API",
            file
        );
        assert!(
            source.contains("#[test]"),
            "{} contains no tests",
            file
        );
        assert!(
            !source.contains("#[ignore]"),
            "{} has ignored tests - all tests must run",
            file
        );
    }
}
