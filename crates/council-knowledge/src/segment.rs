//! CJK pre-segmentation.
//!
//! Embedding models see unspaced Chinese or Japanese text as one long token
//! run. Before indexing, such text is split on Unicode word boundaries
//! (UAX #29) and rejoined with single spaces.
//!
//! UAX #29 has no dictionary, so Han text splits into single ideographs
//! ("明月松间照" becomes "明 月 松 间 照") rather than words. This is coarser
//! than dictionary-based word segmentation.

use unicode_segmentation::UnicodeSegmentation;

/// True if any character falls in a CJK ideograph, kana or hangul block.
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(is_cjk)
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x3040..=0x30FF      // hiragana, katakana
        | 0x3400..=0x4DBF    // CJK extension A
        | 0x4E00..=0x9FFF    // CJK unified ideographs
        | 0xAC00..=0xD7AF    // hangul syllables
        | 0xF900..=0xFAFF    // compatibility ideographs
        | 0x20000..=0x2FA1F) // extensions B and later
}

/// Split text into word-boundary tokens joined by single spaces.
///
/// Whitespace segments are dropped; punctuation is kept as its own token.
pub fn segment_words(text: &str) -> String {
    text.split_word_bounds()
        .filter(|token| !token.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Segment only when the text carries CJK characters.
pub fn prepare_for_index(text: &str, segment_cjk: bool) -> String {
    if segment_cjk && contains_cjk(text) {
        segment_words(text)
    } else {
        text.to_string()
    }
}
