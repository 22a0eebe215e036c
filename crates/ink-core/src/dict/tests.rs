use super::*;

fn sample() -> WordDictionary {
    WordDictionary::from_entries([("cat", 120), ("car", 300), ("cart", 40), ("care", 90), ("dog", 80)])
}

#[test]
fn predict_orders_by_frequency() {
    let d = sample();
    let got: Vec<_> = d.predict("car", 10).into_iter().map(|(w, _)| w).collect();
    assert_eq!(got, vec!["care", "cart"]);
    assert!(d.predict("z", 3).is_empty());
    assert!(d.predict("", 3).is_empty());
    assert_eq!(d.predict("ca", 1), vec![("car".to_string(), 300)]);
}

#[test]
fn frequency_falls_back_to_lower_case() {
    let d = sample();
    assert_eq!(d.frequency("Cat"), Some(120));
    assert_eq!(d.frequency("CAT"), Some(120));
    assert_eq!(d.frequency("cow"), None);
}

#[test]
fn duplicates_keep_highest_frequency() {
    let d = WordDictionary::from_entries([("a", 1), ("a", 5), ("a", 3)]);
    assert_eq!(d.frequency("a"), Some(5));
    assert_eq!(d.len(), 1);
}

#[test]
fn word_list_parsing() {
    let text = "# comment\ncat\t120\n\ncar\t300\r\ndog\n";
    let d = WordDictionary::from_word_list(text).unwrap();
    assert_eq!(d.len(), 3);
    assert_eq!(d.frequency("car"), Some(300));
    assert_eq!(d.frequency("dog"), Some(1));
}

#[test]
fn word_list_bad_frequency_reports_line() {
    let err = WordDictionary::from_word_list("cat\t12\ncar\tmany\n").unwrap_err();
    assert!(matches!(err, DictError::Parse { line: 2, .. }));
}

#[test]
fn binary_round_trip() {
    let d = sample();
    let bytes = d.to_bytes().unwrap();
    assert_eq!(&bytes[..4], b"INKD");
    assert_eq!(WordDictionary::from_bytes(&bytes).unwrap(), d);
}

#[test]
fn corrupted_body_fails_checksum() {
    let mut bytes = sample().to_bytes().unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    assert!(matches!(
        WordDictionary::from_bytes(&bytes),
        Err(DictError::ChecksumMismatch { .. })
    ));
}

#[test]
fn header_errors() {
    assert!(matches!(WordDictionary::from_bytes(b"INK"), Err(DictError::InvalidHeader)));
    assert!(matches!(
        WordDictionary::from_bytes(b"XXXX\x01\0\0\0\0\0\0\0"),
        Err(DictError::InvalidMagic)
    ));
    assert!(matches!(
        WordDictionary::from_bytes(b"INKD\x09\0\0\0\0\0\0\0"),
        Err(DictError::UnsupportedVersion(9))
    ));
}

#[test]
fn save_and_load_through_file_uri() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("en_GB.inkd");
    sample().save(&path).unwrap();

    let loader = FileDictionaryLoader::new();
    let uri = format!("file://{}", path.display());
    assert_eq!(loader.load(&uri).unwrap(), sample());
}

#[test]
fn loader_reads_word_lists_relative_to_base_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("words.txt"), "cat\t3\ncap\t2\n").unwrap();

    let loader = FileDictionaryLoader::with_base_dir(dir.path());
    let d = loader.load("words.txt").unwrap();
    assert!(d.contains("cap"));
}

#[test]
fn loader_rejects_other_schemes() {
    let loader = FileDictionaryLoader::new();
    assert!(matches!(
        loader.load("https://example.com/en.inkd"),
        Err(DictError::UnsupportedUri(_))
    ));
    assert!(matches!(loader.load("file://"), Err(DictError::UnsupportedUri(_))));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let loader = FileDictionaryLoader::with_base_dir(dir.path());
    assert!(matches!(loader.load("nope.inkd"), Err(DictError::Io(_))));
}
