// The error messages of every fixture are checked on each run by the
// `prefbind-macros` unit tests. This driver also compares rustc's rendering
// against `<name>.stderr`; record it with
// `TRYBUILD=overwrite cargo test -p prefbind-tests --test ui -- --ignored`.
#[test]
#[ignore = "stderr snapshots are recorded per toolchain"]
fn ui() {
    let t = trybuild::TestCases::new();
    t.compile_fail("tests/ui/*.rs");
}
