// This attribute prevents a blank Command Prompt window from appearing
// alongside the application window on Windows builds.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() {
    // Execution lives in the library so Tauri can bind the app
    // differently per platform (Android calls the library entry point
    // directly).
    pixeldrop_core::run();
}
