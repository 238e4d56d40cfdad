use super::*;

const WINDOWS: [[f64; 2]; 3] = [[15.0, 35.0], [40.0, 60.0], [65.0, 85.0]];

fn font() -> Vec<u8> {
    std::fs::read(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/fonts/DejaVuSans.ttf")).unwrap()
}

#[test]
fn sentences_split_on_terminal_punctuation() {
    let s = split_sentences("One. Two!  Three? 3.14 is pi. Tail");
    assert_eq!(s, vec!["One.", "Two!", "Three?", "3.14 is pi.", "Tail"]);
}

#[test]
fn empty_text_has_no_sentences() {
    assert!(split_sentences("   ").is_empty());
    assert_eq!(narrative_thirds(""), [String::new(), String::new(), String::new()]);
}

#[test]
fn thirds_keep_sentence_order_and_balance() {
    let t = narrative_thirds("A. B. C. D. E.");
    assert_eq!(t[0], "A. B.");
    assert_eq!(t[1], "C. D.");
    assert_eq!(t[2], "E.");

    let one = narrative_thirds("Only one sentence here.");
    assert_eq!(one[0], "Only one sentence here.");
    assert!(one[1].is_empty() && one[2].is_empty());
}

#[test]
fn windows_are_disjoint() {
    assert_eq!(active_third(10.0, &WINDOWS), None);
    assert_eq!(active_third(15.0, &WINDOWS), Some(0));
    assert_eq!(active_third(35.0, &WINDOWS), None);
    assert_eq!(active_third(50.0, &WINDOWS), Some(1));
    assert_eq!(active_third(84.9, &WINDOWS), Some(2));
    assert_eq!(active_third(90.0, &WINDOWS), None);
}

#[test]
fn cache_without_font_yields_nothing() {
    let mut cache = TextCache::new(None);
    assert!(!cache.has_font());
    assert!(cache.block("hello", 40.0, 300.0, false).unwrap().is_none());
    assert_eq!(cache.miss_count(), 0);
}

#[test]
fn layouts_are_shaped_once_until_cleared() {
    let mut cache = TextCache::new(Some(font()));
    assert!(cache.has_font());
    let block = cache.block("Hello there. General.", 24.0, 200.0, true).unwrap();
    assert!(block.is_some_and(|b| b.layout.height() > 0.0));
    cache.block("Hello there. General.", 24.0, 200.0, true).unwrap();
    assert_eq!(cache.miss_count(), 1);
    assert_eq!(cache.len(), 1);

    cache.block("Hello there. General.", 24.0, 120.0, true).unwrap();
    assert_eq!(cache.len(), 2);

    cache.clear();
    assert!(cache.is_empty());
    cache.block("Hello there. General.", 24.0, 200.0, true).unwrap();
    assert_eq!(cache.miss_count(), 3);
}
