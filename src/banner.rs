// src/banner.rs

/// Prints the application startup banner to the console.
pub fn print_banner() {
    let banner = r#"
  __ _ _   _ _ __ __ _  ___| |__   ___  ___| | __
 / _` | | | | '__/ _` |/ __| '_ \ / _ \/ __| |/ /
| (_| | |_| | | | (_| | (__| | | |  __/ (__|   <
 \__,_|\__,_|_|  \__,_|\___|_| |_|\___|\___|_|\_\

    Cosmic Aura Scanner API
"#;
    println!("{}", banner);
}
