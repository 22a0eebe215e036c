use std::fs;
use std::process;

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

pub fn settings_export() {
    print!("{}", ink_core::settings::default_toml());
}

pub fn settings_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let s = die!(
        ink_core::settings::parse_settings_toml(&content),
        "Error: {}"
    );
    println!(
        "OK: recognition.group_window_ms={}, recognition.max_candidates={}, latin locales={}, dictionaries={}",
        s.recognition.group_window_ms,
        s.recognition.max_candidates,
        s.locales.latin.len(),
        s.dictionaries.len()
    );
}
