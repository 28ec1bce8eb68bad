fn main() {
    // ESP-IDF builds need the toolchain environment exported to rustc.
    // Host builds (simulation, tests) have nothing to generate.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
