use std::env;

fn main() {
    // The library and its unit tests build for any host; only the `device`
    // feature pins the architecture.
    let target = env::var("TARGET").unwrap();
    if env::var("CARGO_FEATURE_DEVICE").is_ok() && !target.starts_with("thumb") {
        panic!("the `device` feature only supports Arm Cortex-M targets, got {target}");
    }
}
