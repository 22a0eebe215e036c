use std::fs;
use std::path::Path;
use std::process;

use ink_core::dict::WordDictionary;

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

/// Compile a `word<TAB>frequency` list into the binary format.
pub fn build(input_txt: &str, output_file: &str) {
    let text = die!(
        fs::read_to_string(input_txt),
        "Error reading {input_txt}: {}"
    );
    let dict = die!(
        WordDictionary::from_word_list(&text),
        "Error parsing {input_txt}: {}"
    );
    eprintln!("Parsed {} words", dict.len());
    die!(
        dict.save(Path::new(output_file)),
        "Error writing dictionary: {}"
    );

    let file_size = fs::metadata(output_file).map(|m| m.len()).unwrap_or(0);
    eprintln!(
        "Wrote {output_file} ({:.1} KB)",
        file_size as f64 / 1024.0
    );
}

pub fn info(file: &str) {
    let dict = die!(WordDictionary::open(Path::new(file)), "Error: {}");
    println!("Words: {}", dict.len());

    let mut top: Vec<(&str, u32)> = dict.iter().collect();
    top.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    if !top.is_empty() {
        println!("Most frequent:");
        for (word, freq) in top.iter().take(10) {
            println!("  {word}\t{freq}");
        }
    }
}

/// Print what the dictionary would offer as completions of `prefix`.
pub fn predict(file: &str, prefix: &str, n: usize) {
    let dict = die!(WordDictionary::open(Path::new(file)), "Error: {}");
    let results = dict.predict(prefix, n);
    if results.is_empty() {
        println!("\"{prefix}\": no completions");
        return;
    }
    println!("\"{prefix}\" → {} completion(s):", results.len());
    for (word, freq) in &results {
        println!("  {word}\t{freq}");
    }
}
