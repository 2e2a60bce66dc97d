use lexdfa::{escape, Options, Regex, INFINITE};

fn re(expr: &str) -> Regex {
    Regex::compile(expr).unwrap()
}

fn re_ci(expr: &str) -> Regex {
    Regex::compile_with(expr, Options::CASE_INSENSITIVE).unwrap()
}

#[test]
fn test_star_replace_and_lengths() {
    let r = re("a*");
    assert!(r.is_match(""));
    assert!(r.is_match("a"));
    assert!(r.is_match("aa"));
    assert_eq!(r.replace("aaadsds", "B"), "Bdsds");
    assert_eq!(r.min_length(), 0);
    assert_eq!(r.max_length(), INFINITE);
}

#[test]
fn test_bounded_class() {
    let r = re("[acf]{2,4}");
    assert_eq!(r.min_length(), 2);
    assert_eq!(r.max_length(), 4);
    assert!(r.is_match("ac"));
    assert!(r.is_match("cfac"));
    assert!(!r.is_match("a"));
    assert!(!r.is_match("acfac"));
    assert!(!r.is_match("ab"));
}

#[test]
fn test_large_bounded_repeat() {
    let r = re("[01]{6,966}");
    assert_eq!(r.min_length(), 6);
    assert_eq!(r.max_length(), 966);
    assert!(r.is_match("010101"));
    assert!(!r.is_match("01010"));
    assert!(r.is_match(&"1".repeat(966)));
    assert!(!r.is_match(&"1".repeat(967)));
}

#[test]
fn test_group_lengths() {
    let r = re("( (a)*)?");
    assert_eq!((r.min_length(), r.max_length()), (0, INFINITE));
    let r = re("(a)|(b)");
    assert_eq!((r.min_length(), r.max_length()), (1, 1));
}

#[test]
fn test_control_escapes() {
    let r = re(r"\c[\c\\c]\c^\c_");
    assert!(r.is_match("\u{1b}\u{1c}\u{1d}\u{1e}\u{1f}"));
    assert_eq!(r.min_length(), 5);
}

#[test]
fn test_unicode_block() {
    let r = re(r"\p{InLatin-1 Supplement}");
    assert!(r.is_match("Ä"));
    assert!(r.is_match("ö"));
    assert!(r.is_match("å"));
    assert!(!r.is_match("\u{0}"));
    assert!(!r.is_match("\u{7f}"));
    assert!(!r.is_match("/"));
    assert!(!r.is_match(""));
}

#[test]
fn test_categories_and_posix() {
    assert!(re(r"\p{Lu}+").is_match("ÄBC"));
    assert!(!re(r"\p{Lu}+").is_match("Äbc"));
    assert!(re(r"\P{L}").is_match("1"));
    assert!(re(r"\p{XDigit}+").is_match("0fA9"));
    assert!(re(r"\pN").is_match("7"));
    assert!(re(r"\d+\s\w+").is_match("42 is_ok"));
}

#[test]
fn test_line_boundaries() {
    let r = re("^abc$\n");
    assert!(r.is_match("abc\n"));
    assert!(!r.is_match("abc"));
    assert!(re(r"^abc\Z").is_match("abc"));
    assert!(re(r"abc\z").is_match("abc"));
    let r = re("^abc\\Z\n");
    assert_eq!((r.min_length(), r.max_length()), (4, 4));
}

#[test]
fn test_multiline_anchors_in_search() {
    let r = re("^[a-z]+$");
    let text = "12\nabc\n34";
    let m = r.search(text).unwrap();
    assert_eq!(m.as_str(), "abc");
    assert_eq!(m.range(), 3..6);
}

#[test]
fn test_word_boundary_search() {
    let r = re(r"\bcat\b");
    assert_eq!(r.search("concat cat").unwrap().start(), 7);
    assert!(r.search("concatenate").is_none());
}

#[test]
fn test_non_word_boundary_is_strict() {
    let r = re(r" \babc\B ");
    assert!(!r.is_match(" abc "));
    let r = re(r" \babc\b ");
    assert!(r.is_match(" abc "));
    assert!(re(r"a\Bb").is_match("ab"));
}

#[test]
fn test_previous_match_end_anchor() {
    let r = re(r"\Ga");
    assert_eq!(r.replace("aab", "X"), "XXb");
    assert_eq!(r.replace("baa", "X"), "baa");
}

#[test]
fn test_escape_compiles_to_itself() {
    let text = "[{(*+?.,|)}]";
    let r = re(&escape(text));
    assert!(r.is_match(text));
    assert_eq!(escape("a-b&c$"), r"a\-b\&c\$");
}

#[test]
fn test_case_insensitive_group() {
    let r = re_ci("(abc)+");
    assert_eq!(r.find("ABC").unwrap(), "ABC");
    assert_eq!(r.find("AaAaBc").unwrap(), "aBc");
    assert_eq!(r.find("aaaaaabcabcabcqqq").unwrap(), "abcabcabc");
}

#[test]
fn test_case_insensitive_range() {
    assert_eq!(re_ci("[a-z]+").find("OpQ").unwrap(), "OpQ");
}

#[test]
fn test_intersection_class() {
    let r = re("[a-z&&[^bc]]");
    assert!(r.is_match("a"));
    assert!(r.is_match("d"));
    assert!(!r.is_match("b"));
    assert!(!r.is_match("c"));
}

#[test]
fn test_xml_comment() {
    let ch = r"\x01-\uD7FF\uE000-\uFFFD";
    let exp = format!(r"<!\-\-(([{ch}&&[^\-]])|(\-[{ch}&&[^\-]]))*\-\->");
    let r = re(&exp);
    assert!(r.is_match("<!-- tämä on kommentti -->"));
    assert!(r.is_match("<!-- - tämäkin on kommentti - -->"));
    assert!(!r.is_match("<!-- tämä ei ole kommentti --->"));
}

#[test]
fn test_cdata_like_alternation() {
    let r = re(r"(([.&&[^\]>]]*)|([.&&[^\]]]\]>)|(\]\][.&&[^>]]))*");
    assert!(r.is_match(""));
    assert!(r.is_match("a]]b"));
    assert!(r.is_match("c]>n"));
    assert!(!r.is_match("a]]>"));
}

#[test]
fn test_fixed_ender_stops_before_first_ender() {
    let r = Regex::builder()
        .fixed_ender(true)
        .build(r"<!\-\-.*\-\->")
        .unwrap();
    assert_eq!(r.looking_at("<!-- --> -->"), Some("<!-- "));
    assert_eq!(r.looking_at("<!-- comment -->"), Some("<!-- comment "));
    assert_eq!(
        r.looking_at("<!-- <- <comment> -> -->"),
        Some("<!-- <- <comment> -> ")
    );
    assert_eq!(r.looking_at("<!-- open"), None);
    let greedy = re(r"<!\-\-.*\-\->");
    assert_eq!(greedy.looking_at("<!-- --> -->"), Some("<!-- --> -->"));
}

#[test]
fn test_fixed_ender_block_comment() {
    let r = Regex::builder()
        .fixed_ender(true)
        .build(r"/\*.*\*/")
        .unwrap();
    assert_eq!(r.looking_at("/*-- */ */"), Some("/*-- "));
    assert_eq!(r.looking_at("/*-- comment */"), Some("/*-- comment "));
    assert_eq!(
        r.looking_at("/*-- /* <comment> * */"),
        Some("/*-- /* <comment> * ")
    );
}

#[test]
fn test_keyword_or_identifier() {
    let r = re("if|while|[a-z][a-z0-9]*");
    assert_eq!(r.looking_at("a123"), Some("a123"));
    assert_eq!(r.find("a123").unwrap(), "a123");
}

#[test]
fn test_class_or_bracket() {
    assert_eq!(re(r"[a-zA-Z0-9]|\[").find("a").unwrap(), "a");
    assert_eq!(re(r"[a-zA-Z0-9]|\[").find("-[").unwrap(), "[");
}

#[test]
fn test_find_errors_without_match() {
    let r = re("aaabc");
    assert_eq!(r.find("aaaabc").unwrap(), "aaabc");
    let err = r.find("aabc").unwrap_err();
    assert!(err.is_syntax());
    assert!(r.search("aabc").is_none());
}

#[test]
fn test_split() {
    let r = re("[ \t]+");
    let parts = r.split("asdasd sadasd \t adasdas asdda", 0);
    assert_eq!(parts, vec!["asdasd", "sadasd", "adasdas", "asdda"]);

    let colon = re(":");
    assert_eq!(colon.split("boo:and:foo", 2), vec!["boo", "and:foo"]);
    assert_eq!(colon.split("boo:and:foo", 5), vec!["boo", "and", "foo"]);
    assert_eq!(colon.split("boo:and:foo", -2), vec!["boo", "and", "foo"]);

    let o = re("o");
    assert_eq!(o.split("boo:and:foo", 5), vec!["b", "", ":and:f", "", ""]);
    assert_eq!(o.split("boo:and:foo", 0), vec!["b", "", ":and:f"]);
}

#[test]
fn test_find_iter() {
    let r = re("[0-9]+");
    let found: Vec<&str> = r.find_iter("a1 b22 c333").map(|m| m.as_str()).collect();
    assert_eq!(found, vec!["1", "22", "333"]);
}

#[test]
fn test_syntax_errors() {
    for bad in ["(a", "a)", "[b-a]", "a{4,2}", "+", "x|", "\\k"] {
        let err = Regex::compile(bad).unwrap_err();
        assert!(err.is_syntax(), "{bad}: {err}");
    }
}

#[test]
fn test_literal_lengths() {
    let r = re("hello");
    assert_eq!((r.min_length(), r.max_length()), (5, 5));
    let r = re("h\u{e9}llo");
    assert_eq!((r.min_length(), r.max_length()), (5, 5));
}
