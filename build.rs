use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Pass CPU frequency for timing calculations
    println!("cargo:rustc-env=MCU_FREQ_HZ=8000000");

    let target = env::var("TARGET").unwrap_or_default();
    if target.contains("avr") {
        // Configure for ATmega32U4
        println!("cargo:rustc-link-arg=-mmcu=atmega32u4");
    }

    // Debug vs Release configurations
    if env::var("PROFILE").map(|p| p == "debug").unwrap_or(false) {
        println!("cargo:rustc-cfg=feature=\"debug\"");
    }
}
