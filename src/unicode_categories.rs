//! Named character classes.
//!
//! Resolves the names accepted by `\p{..}`: the ASCII POSIX classes, the
//! Java-style predicate classes, Unicode general categories and Unicode
//! blocks. Classes that need a scan of the whole code-point domain are built
//! once and kept in a process-wide cache.
//!
//! General categories and the mirrored property come from the Unicode tables
//! in `regex-syntax`; block extents are listed here.

use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use regex_syntax::hir::{Class, HirKind};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::range::{Range, MAX_CODE_POINT};
use crate::range_set::RangeSet;

const SURROGATES: (u32, u32) = (0xD800, 0xE000);

/// General category codes accepted with or without an `Is` prefix.
const CATEGORIES: &[&str] = &[
    "L", "Lu", "Ll", "Lt", "Lm", "Lo", //
    "M", "Mn", "Mc", "Me", //
    "N", "Nd", "Nl", "No", //
    "P", "Pc", "Pd", "Ps", "Pe", "Pi", "Pf", "Po", //
    "S", "Sm", "Sc", "Sk", "So", //
    "Z", "Zs", "Zl", "Zp", //
    "C", "Cc", "Cf", "Cs", "Co", "Cn",
];

/// Unicode blocks as `(name, first, last)`, both ends inclusive.
const BLOCKS: &[(&str, u32, u32)] = &[
    ("Basic Latin", 0x0000, 0x007F),
    ("Latin-1 Supplement", 0x0080, 0x00FF),
    ("Latin Extended-A", 0x0100, 0x017F),
    ("Latin Extended-B", 0x0180, 0x024F),
    ("IPA Extensions", 0x0250, 0x02AF),
    ("Spacing Modifier Letters", 0x02B0, 0x02FF),
    ("Combining Diacritical Marks", 0x0300, 0x036F),
    ("Greek and Coptic", 0x0370, 0x03FF),
    ("Greek", 0x0370, 0x03FF),
    ("Cyrillic", 0x0400, 0x04FF),
    ("Cyrillic Supplement", 0x0500, 0x052F),
    ("Armenian", 0x0530, 0x058F),
    ("Hebrew", 0x0590, 0x05FF),
    ("Arabic", 0x0600, 0x06FF),
    ("Syriac", 0x0700, 0x074F),
    ("Thaana", 0x0780, 0x07BF),
    ("Devanagari", 0x0900, 0x097F),
    ("Bengali", 0x0980, 0x09FF),
    ("Gurmukhi", 0x0A00, 0x0A7F),
    ("Gujarati", 0x0A80, 0x0AFF),
    ("Oriya", 0x0B00, 0x0B7F),
    ("Tamil", 0x0B80, 0x0BFF),
    ("Telugu", 0x0C00, 0x0C7F),
    ("Kannada", 0x0C80, 0x0CFF),
    ("Malayalam", 0x0D00, 0x0D7F),
    ("Sinhala", 0x0D80, 0x0DFF),
    ("Thai", 0x0E00, 0x0E7F),
    ("Lao", 0x0E80, 0x0EFF),
    ("Tibetan", 0x0F00, 0x0FFF),
    ("Myanmar", 0x1000, 0x109F),
    ("Georgian", 0x10A0, 0x10FF),
    ("Hangul Jamo", 0x1100, 0x11FF),
    ("Ethiopic", 0x1200, 0x137F),
    ("Cherokee", 0x13A0, 0x13FF),
    ("Unified Canadian Aboriginal Syllabics", 0x1400, 0x167F),
    ("Ogham", 0x1680, 0x169F),
    ("Runic", 0x16A0, 0x16FF),
    ("Tagalog", 0x1700, 0x171F),
    ("Khmer", 0x1780, 0x17FF),
    ("Mongolian", 0x1800, 0x18AF),
    ("Limbu", 0x1900, 0x194F),
    ("Khmer Symbols", 0x19E0, 0x19FF),
    ("Phonetic Extensions", 0x1D00, 0x1D7F),
    ("Latin Extended Additional", 0x1E00, 0x1EFF),
    ("Greek Extended", 0x1F00, 0x1FFF),
    ("General Punctuation", 0x2000, 0x206F),
    ("Superscripts and Subscripts", 0x2070, 0x209F),
    ("Currency Symbols", 0x20A0, 0x20CF),
    ("Combining Marks for Symbols", 0x20D0, 0x20FF),
    ("Combining Diacritical Marks for Symbols", 0x20D0, 0x20FF),
    ("Letterlike Symbols", 0x2100, 0x214F),
    ("Number Forms", 0x2150, 0x218F),
    ("Arrows", 0x2190, 0x21FF),
    ("Mathematical Operators", 0x2200, 0x22FF),
    ("Miscellaneous Technical", 0x2300, 0x23FF),
    ("Control Pictures", 0x2400, 0x243F),
    ("Optical Character Recognition", 0x2440, 0x245F),
    ("Enclosed Alphanumerics", 0x2460, 0x24FF),
    ("Box Drawing", 0x2500, 0x257F),
    ("Block Elements", 0x2580, 0x259F),
    ("Geometric Shapes", 0x25A0, 0x25FF),
    ("Miscellaneous Symbols", 0x2600, 0x26FF),
    ("Dingbats", 0x2700, 0x27BF),
    ("Supplemental Arrows-A", 0x27F0, 0x27FF),
    ("Braille Patterns", 0x2800, 0x28FF),
    ("Supplemental Arrows-B", 0x2900, 0x297F),
    ("Supplemental Mathematical Operators", 0x2A00, 0x2AFF),
    ("CJK Radicals Supplement", 0x2E80, 0x2EFF),
    ("Kangxi Radicals", 0x2F00, 0x2FDF),
    ("Ideographic Description Characters", 0x2FF0, 0x2FFF),
    ("CJK Symbols and Punctuation", 0x3000, 0x303F),
    ("Hiragana", 0x3040, 0x309F),
    ("Katakana", 0x30A0, 0x30FF),
    ("Bopomofo", 0x3100, 0x312F),
    ("Hangul Compatibility Jamo", 0x3130, 0x318F),
    ("Kanbun", 0x3190, 0x319F),
    ("Bopomofo Extended", 0x31A0, 0x31BF),
    ("Katakana Phonetic Extensions", 0x31F0, 0x31FF),
    ("Enclosed CJK Letters and Months", 0x3200, 0x32FF),
    ("CJK Compatibility", 0x3300, 0x33FF),
    ("CJK Unified Ideographs Extension A", 0x3400, 0x4DBF),
    ("Yijing Hexagram Symbols", 0x4DC0, 0x4DFF),
    ("CJK Unified Ideographs", 0x4E00, 0x9FFF),
    ("Yi Syllables", 0xA000, 0xA48F),
    ("Yi Radicals", 0xA490, 0xA4CF),
    ("Hangul Syllables", 0xAC00, 0xD7AF),
    ("High Surrogates", 0xD800, 0xDB7F),
    ("High Private Use Surrogates", 0xDB80, 0xDBFF),
    ("Low Surrogates", 0xDC00, 0xDFFF),
    ("Private Use Area", 0xE000, 0xF8FF),
    ("CJK Compatibility Ideographs", 0xF900, 0xFAFF),
    ("Alphabetic Presentation Forms", 0xFB00, 0xFB4F),
    ("Arabic Presentation Forms-A", 0xFB50, 0xFDFF),
    ("Variation Selectors", 0xFE00, 0xFE0F),
    ("Combining Half Marks", 0xFE20, 0xFE2F),
    ("CJK Compatibility Forms", 0xFE30, 0xFE4F),
    ("Small Form Variants", 0xFE50, 0xFE6F),
    ("Arabic Presentation Forms-B", 0xFE70, 0xFEFF),
    ("Halfwidth and Fullwidth Forms", 0xFF00, 0xFFEF),
    ("Specials", 0xFFF0, 0xFFFF),
    ("Linear B Syllabary", 0x10000, 0x1007F),
    ("Old Italic", 0x10300, 0x1032F),
    ("Gothic", 0x10330, 0x1034F),
    ("Deseret", 0x10400, 0x1044F),
    ("Byzantine Musical Symbols", 0x1D000, 0x1D0FF),
    ("Musical Symbols", 0x1D100, 0x1D1FF),
    ("Mathematical Alphanumeric Symbols", 0x1D400, 0x1D7FF),
    ("CJK Unified Ideographs Extension B", 0x20000, 0x2A6DF),
    ("CJK Compatibility Ideographs Supplement", 0x2F800, 0x2FA1F),
    ("Tags", 0xE0000, 0xE007F),
    ("Supplementary Private Use Area-A", 0xF0000, 0xFFFFF),
    ("Supplementary Private Use Area-B", 0x100000, 0x10FFFF),
];

fn class_cache() -> &'static Mutex<FxHashMap<String, Arc<RangeSet>>> {
    static CACHE: OnceLock<Mutex<FxHashMap<String, Arc<RangeSet>>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(FxHashMap::default()))
}

/// The class for a single-letter escape: `\d \D \s \S \w \W`.
pub fn escape_class(c: char) -> Option<RangeSet> {
    let positive = match c.to_ascii_lowercase() {
        'd' => RangeSet::from_range('0' as u32, '9' as u32 + 1),
        's' => space(),
        'w' => {
            let mut set = alpha();
            set.add_range('0' as u32, '9' as u32 + 1);
            set.add_char('_');
            set
        }
        _ => return None,
    };
    if c.is_ascii_uppercase() {
        Some(positive.complement())
    } else {
        Some(positive)
    }
}

/// Resolve the name inside `\p{..}`.
///
/// Under case-insensitive matching the upper-case classes resolve to their
/// lower-case counterparts. Returns `None` for an unknown name.
pub fn named_class(name: &str, case_insensitive: bool) -> Option<Arc<RangeSet>> {
    let name = if case_insensitive {
        case_insensitive_name(name)
    } else {
        name
    };
    if let Some(set) = class_cache().lock().get(name) {
        return Some(Arc::clone(set));
    }
    let set = Arc::new(build_class(name)?);
    debug!(
        class = name,
        intervals = set.intervals().len(),
        "built named class"
    );
    let mut cache = class_cache().lock();
    Some(Arc::clone(cache.entry(name.to_string()).or_insert(set)))
}

fn case_insensitive_name(name: &str) -> &str {
    match name {
        "Upper" => "Lower",
        "javaUpperCase" => "javaLowerCase",
        "Lu" | "IsLu" => "Ll",
        _ => name,
    }
}

fn build_class(name: &str) -> Option<RangeSet> {
    let set = match name {
        "Lower" => RangeSet::from_range('a' as u32, 'z' as u32 + 1),
        "Upper" => RangeSet::from_range('A' as u32, 'Z' as u32 + 1),
        "ASCII" => RangeSet::from_range(0, 0x80),
        "Alpha" => alpha(),
        "Digit" => RangeSet::from_range('0' as u32, '9' as u32 + 1),
        "Alnum" => alnum(),
        "Punct" => punct(),
        "Graph" => graph(),
        "Print" => {
            let mut set = graph();
            set.add_char(' ');
            set
        }
        "Blank" => [' ', '\t'].into_iter().map(Range::char).collect(),
        "Cntrl" => {
            let mut set = RangeSet::from_range(0, 0x20);
            set.add_char('\u{7f}');
            set
        }
        "XDigit" => {
            let mut set = RangeSet::from_range('0' as u32, '9' as u32 + 1);
            set.add_range('a' as u32, 'f' as u32 + 1);
            set.add_range('A' as u32, 'F' as u32 + 1);
            set
        }
        "Space" => space(),
        "javaLowerCase" => scan(char::is_lowercase),
        "javaUpperCase" => scan(char::is_uppercase),
        "javaWhitespace" => scan(is_java_whitespace),
        "javaMirrored" => unicode_property("Bidi_Mirrored")?,
        _ => {
            if let Some(block) = name.strip_prefix("In") {
                block_class(block)?
            } else {
                let code = name.strip_prefix("Is").unwrap_or(name);
                category_class(code)?
            }
        }
    };
    Some(set)
}

fn alpha() -> RangeSet {
    let mut set = RangeSet::from_range('a' as u32, 'z' as u32 + 1);
    set.add_range('A' as u32, 'Z' as u32 + 1);
    set
}

fn alnum() -> RangeSet {
    let mut set = alpha();
    set.add_range('0' as u32, '9' as u32 + 1);
    set
}

fn punct() -> RangeSet {
    "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~"
        .chars()
        .map(Range::char)
        .collect()
}

fn graph() -> RangeSet {
    let mut set = alnum();
    set.add_set(&punct());
    set
}

fn space() -> RangeSet {
    [' ', '\t', '\n', '\u{0B}', '\u{0C}', '\r']
        .into_iter()
        .map(Range::char)
        .collect()
}

/// White space in the Java sense: no non-breaking spaces, and the
/// information separators 0x1C..=0x1F count.
fn is_java_whitespace(c: char) -> bool {
    match c {
        '\u{A0}' | '\u{2007}' | '\u{202F}' | '\u{85}' => false,
        '\u{1C}'..='\u{1F}' => true,
        _ => c.is_whitespace(),
    }
}

/// Collect every scalar value accepted by `pred` into a set.
fn scan(pred: impl Fn(char) -> bool) -> RangeSet {
    let mut set = RangeSet::new();
    let mut run: Option<u32> = None;
    for cp in 0..MAX_CODE_POINT {
        let hit = char::from_u32(cp).is_some_and(&pred);
        match (hit, run) {
            (true, None) => run = Some(cp),
            (false, Some(start)) => {
                set.add_range(start, cp);
                run = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run {
        set.add_range(start, MAX_CODE_POINT);
    }
    set
}

fn category_class(code: &str) -> Option<RangeSet> {
    if !CATEGORIES.contains(&code) {
        return None;
    }
    // Surrogates are not scalar values, so the property tables cannot name them.
    if code == "Cs" {
        return Some(RangeSet::from_range(SURROGATES.0, SURROGATES.1));
    }
    let mut set = unicode_property(code)?;
    if code == "C" {
        set.add_range(SURROGATES.0, SURROGATES.1);
    }
    Some(set)
}

fn unicode_property(name: &str) -> Option<RangeSet> {
    let hir = regex_syntax::Parser::new()
        .parse(&format!("\\p{{{name}}}"))
        .ok()?;
    let mut set = RangeSet::new();
    match hir.kind() {
        HirKind::Class(Class::Unicode(class)) => {
            for r in class.ranges() {
                set.add_range(r.start() as u32, r.end() as u32 + 1);
            }
        }
        // One-member classes come back as a literal.
        HirKind::Literal(lit) => {
            for c in std::str::from_utf8(&lit.0).ok()?.chars() {
                set.add_char(c);
            }
        }
        _ => return None,
    }
    Some(set)
}

fn normalize_block_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn block_class(name: &str) -> Option<RangeSet> {
    let wanted = normalize_block_name(name);
    BLOCKS
        .iter()
        .find(|(block, _, _)| normalize_block_name(block) == wanted)
        .map(|&(_, first, last)| RangeSet::from_range(first, last + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str) -> Arc<RangeSet> {
        named_class(name, false).unwrap_or_else(|| panic!("unknown class {name}"))
    }

    #[test]
    fn test_escape_classes() {
        let d = escape_class('d').unwrap();
        assert!(d.contains_char('5'));
        assert!(!d.contains_char('a'));
        let big_d = escape_class('D').unwrap();
        assert!(big_d.contains_char('a'));
        assert!(!big_d.contains_char('5'));

        let s = escape_class('s').unwrap();
        for c in [' ', '\t', '\n', '\u{0B}', '\u{0C}', '\r'] {
            assert!(s.contains_char(c));
        }
        assert!(!s.contains_char('\u{A0}'));

        let w = escape_class('w').unwrap();
        assert!(w.contains_char('_'));
        assert!(w.contains_char('Z'));
        assert!(!w.contains_char('-'));
        assert!(escape_class('q').is_none());
    }

    #[test]
    fn test_posix_classes() {
        assert!(class("Lower").contains_char('q'));
        assert!(!class("Lower").contains_char('Q'));
        assert!(class("Punct").contains_char('~'));
        assert!(!class("Punct").contains_char('a'));
        assert_eq!(class("Punct").code_point_count(), 32);
        assert!(class("Print").contains_char(' '));
        assert!(!class("Graph").contains_char(' '));
        assert!(class("Cntrl").contains_char('\u{7f}'));
        assert!(class("XDigit").contains_char('F'));
        assert!(!class("XDigit").contains_char('g'));
        assert_eq!(class("ASCII").code_point_count(), 128);
    }

    #[test]
    fn test_case_insensitive_upper_is_lower() {
        let upper = named_class("Upper", true).unwrap();
        assert!(upper.contains_char('a'));
        assert!(!upper.contains_char('A'));
        let lu = named_class("IsLu", true).unwrap();
        assert!(lu.contains_char('ä'));
    }

    #[test]
    fn test_java_classes() {
        let lower = class("javaLowerCase");
        assert!(lower.contains_char('ä'));
        assert!(!lower.contains_char('Ä'));
        let upper = class("javaUpperCase");
        assert!(upper.contains_char('Ä'));

        let ws = class("javaWhitespace");
        assert!(ws.contains_char(' '));
        assert!(ws.contains_char('\u{1F}'));
        assert!(!ws.contains_char('\u{A0}'));
        assert!(ws.contains_char('\u{2028}'));

        let mirrored = class("javaMirrored");
        assert!(mirrored.contains_char('('));
        assert!(mirrored.contains_char('>'));
        assert!(!mirrored.contains_char('a'));
    }

    #[test]
    fn test_categories() {
        assert!(class("Lu").contains_char('A'));
        assert!(class("IsLu").contains_char('Ö'));
        assert!(class("Nd").contains_char('7'));
        assert!(class("Nd").contains_char('\u{0663}'));
        assert!(class("IsSc").contains_char('$'));
        assert!(class("IsSc").contains_char('€'));
        assert!(class("L").contains_char('ж'));
        assert!(class("Zl").contains_char('\u{2028}'));
        assert!(class("Cs").contains(0xD800));
        assert!(named_class("Xx", false).is_none());
        assert!(named_class("IsFoo", false).is_none());
    }

    #[test]
    fn test_blocks() {
        let latin1 = class("InLatin-1 Supplement");
        assert!(latin1.contains_char('Ä'));
        assert!(latin1.contains_char('å'));
        assert!(!latin1.contains_char('\u{7f}'));
        assert!(!latin1.contains_char('/'));
        assert_eq!(
            class("InLatin1Supplement").intervals(),
            latin1.intervals()
        );
        assert!(class("InGreek").contains_char('λ'));
        assert!(named_class("InNowhere", false).is_none());
    }

    #[test]
    fn test_cache_returns_shared_set() {
        let a = class("Alnum");
        let b = class("Alnum");
        assert!(Arc::ptr_eq(&a, &b));
    }
}
