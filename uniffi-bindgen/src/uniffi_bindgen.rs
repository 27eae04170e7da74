//! Generates the Swift and Kotlin bindings for `donakit-core`.
//!
//! ```sh
//! cargo build -p donakit-core --release
//! cargo run -p uniffi-bindgen -- generate --library target/release/libdonakit_core.so \
//!     --language kotlin --out-dir kotlin/
//! ```

fn main() {
    uniffi::uniffi_bindgen_main();
}
