use super::*;

#[test]
fn span_basics_and_conversions() {
    let s = Span::new(10, 20);
    assert_eq!(s.start, 10);
    assert_eq!(s.end, 20);
    assert_eq!(s.len(), 10);

    assert!(Span::new(0, 0).is_empty());
    assert!(Span::new(7, 7).is_empty());
    assert!(!Span::new(0, 1).is_empty());

    let t: (u32, u32) = Span::new(5, 10).into();
    assert_eq!(t, (5, 10));

    let s: Span = (3u32..7u32).into();
    assert_eq!(s, Span::new(3, 7));

    let r: std::ops::Range<usize> = Span::new(3, 7).into();
    assert_eq!(r, 3usize..7usize);
}

#[test]
fn spanned_compares_by_value() {
    let a = Spanned::with_span(42u8, Span::new(0, 2));
    let b = Spanned::with_span(42u8, Span::new(9, 11));
    assert_eq!(a, b);
    assert_eq!(a, 42u8);
    assert_eq!(format!("{a:?}"), "42");
    assert_eq!(b.clone().take(), 42);
}
