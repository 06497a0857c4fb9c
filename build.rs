// build.rs
fn main() {
    // Exposes VERGEN_BUILD_TIMESTAMP to the landing page
    vergen::EmitBuilder::builder()
        .build_timestamp()
        .emit()
        .expect("Unable to generate build info");
}
