use super::*;

#[test]
fn first_line_locations() {
    let map = LineMap::new("abc\ndef\n");
    assert_eq!(map.location(0), Location { line: 1, column: 1 });
    assert_eq!(map.location(2), Location { line: 1, column: 3 });
}

#[test]
fn offsets_after_newline_start_next_line() {
    let map = LineMap::new("abc\ndef\nghi");
    assert_eq!(map.location(4), Location { line: 2, column: 1 });
    assert_eq!(map.location(8), Location { line: 3, column: 1 });
    assert_eq!(map.location(10), Location { line: 3, column: 3 });
}

#[test]
fn empty_source_has_one_line() {
    let map = LineMap::new("");
    assert_eq!(map.line_count(), 1);
    assert_eq!(map.location(0), Location { line: 1, column: 1 });
}
