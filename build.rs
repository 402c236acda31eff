fn main() {
    println!("cargo:rerun-if-changed=www/index.html");
    println!("cargo:rerun-if-changed=www/main.js");

    // ESP-IDF link arguments are only needed when building the firmware image.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
