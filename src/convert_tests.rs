use super::*;
use crate::Node;

#[test]
fn bool_spellings() {
    let truthy: &[&[u8]] = &[
        b"t", b"T", b"y", b"Y", b"1", b"on", b"ON", b"On", b"yes", b"YeS", b"true", b"TRUE",
    ];
    let falsy: &[&[u8]] = &[
        b"f", b"F", b"n", b"N", b"0", b"no", b"NO", b"off", b"Off", b"false", b"fAlSe",
    ];
    for token in truthy {
        assert_eq!(parse_bool(token), Ok(true), "{:?}", std::str::from_utf8(token));
    }
    for token in falsy {
        assert_eq!(parse_bool(token), Ok(false), "{:?}", std::str::from_utf8(token));
    }
    let rejected: &[&[u8]] = &[
        b"", b"2", b"x", b"tr", b"ye", b"of", b"nope", b"truee", b"true ", b" true", b"yes!",
        b"oN\0",
    ];
    for token in rejected {
        assert_eq!(
            parse_bool(token),
            Err(ErrorKind::BoolFormat),
            "{:?}",
            std::str::from_utf8(token)
        );
    }
}

#[test]
fn randomized_bool_never_partially_succeeds() {
    const ALPHABET: &[u8] = b"tTyYfFnN01oOnNeEsSrRuUaAlLx ";
    let accepted: &[&str] = &["t", "y", "1", "f", "n", "0", "on", "no", "yes", "off", "true", "false"];
    let mut rng = oorandom::Rand32::new(0x1b0b);
    let iterations = if cfg!(miri) { 50 } else { 5000 };
    for _ in 0..iterations {
        let len = (rng.rand_u32() % 6) as usize;
        let token: Vec<u8> = (0..len)
            .map(|_| ALPHABET[(rng.rand_u32() as usize) % ALPHABET.len()])
            .collect();
        let lower = String::from_utf8_lossy(&token).to_ascii_lowercase();
        match parse_bool(&token) {
            Ok(value) => {
                assert!(accepted.contains(&lower.as_str()), "{lower:?}");
                let expected = matches!(lower.as_str(), "t" | "y" | "1" | "on" | "yes" | "true");
                assert_eq!(value, expected, "{lower:?}");
            }
            Err(kind) => {
                assert_eq!(kind, ErrorKind::BoolFormat);
                assert!(!accepted.contains(&lower.as_str()), "{lower:?}");
            }
        }
    }
}

#[test]
fn integers_with_prefixes() {
    let cases: &[(&[u8], u32, Result<i64, ErrorKind>)] = &[
        (b"123", 0, Ok(123)),
        (b"-123", 0, Ok(-123)),
        (b"+7", 0, Ok(7)),
        (b"0", 0, Ok(0)),
        (b"-0", 0, Ok(0)),
        (b"0xffff", 0, Ok(0xffff)),
        (b"0XFF", 0, Ok(255)),
        (b"-0x10", 0, Ok(-16)),
        (b"0644", 0, Ok(0o644)),
        (b"0644", 10, Ok(644)),
        (b"0x1f", 16, Ok(31)),
        (b"1f", 16, Ok(31)),
        (b"101", 2, Ok(5)),
        (b"zz", 36, Ok(36 * 36 - 1)),
        (b"12345", 10, Ok(12345)),
        (b"9223372036854775807", 0, Ok(i64::MAX)),
        (b"-9223372036854775808", 0, Ok(i64::MIN)),
        (b"9223372036854775808", 0, Err(ErrorKind::IntegerTooLarge)),
        (b"-9223372036854775809", 0, Err(ErrorKind::IntegerTooSmall)),
        (b"99999999999999999999999", 0, Err(ErrorKind::IntegerTooLarge)),
        (b"", 0, Err(ErrorKind::IntegerFormat)),
        (b"-", 0, Err(ErrorKind::IntegerFormat)),
        (b"0x", 0, Err(ErrorKind::IntegerFormat)),
        (b"08", 0, Err(ErrorKind::IntegerFormat)),
        (b"12 ", 0, Err(ErrorKind::IntegerFormat)),
        (b" 12", 0, Err(ErrorKind::IntegerFormat)),
        (b"1.5", 0, Err(ErrorKind::IntegerFormat)),
        (b"+-1", 0, Err(ErrorKind::IntegerFormat)),
        (b"2", 2, Err(ErrorKind::IntegerFormat)),
        (b"1", 1, Err(ErrorKind::IntegerFormat)),
        (b"1", 37, Err(ErrorKind::IntegerFormat)),
        (b"99999999999999999999x", 0, Err(ErrorKind::IntegerFormat)),
    ];
    for &(token, base, expected) in cases {
        assert_eq!(
            parse_int(token, base),
            expected,
            "{:?} base {base}",
            std::str::from_utf8(token)
        );
    }
}

#[test]
fn randomized_integer_formats() {
    let mut rng = oorandom::Rand64::new(0x5eed);
    let iterations = if cfg!(miri) { 50 } else { 5000 };
    for _ in 0..iterations {
        let value = rng.rand_u64() as i64 >> (rng.rand_u64() % 64);
        let magnitude = value.unsigned_abs();
        let sign = if value < 0 { "-" } else { "" };
        let forms = [
            format!("{value}"),
            format!("{sign}0x{magnitude:x}"),
            format!("{sign}0{magnitude:o}"),
        ];
        for form in &forms {
            assert_eq!(parse_int(form.as_bytes(), 0), Ok(value), "{form}");
        }
        let bare_hex = format!("{sign}{magnitude:x}");
        assert_eq!(parse_int(bare_hex.as_bytes(), 16), Ok(value), "{bare_hex}");

        match i8::try_from(value) {
            Ok(v) => assert_eq!(narrow_signed::<i8>(value), Ok(v)),
            Err(_) if value < 0 => assert_eq!(narrow_signed::<i8>(value), Err(ErrorKind::IntegerTooSmall)),
            Err(_) => assert_eq!(narrow_signed::<i8>(value), Err(ErrorKind::IntegerTooLarge)),
        }
        match u32::try_from(value) {
            Ok(v) => assert_eq!(narrow_unsigned::<u32>(value), Ok(v)),
            Err(_) if value < 0 => assert_eq!(narrow_unsigned::<u32>(value), Err(ErrorKind::IntegerNegative)),
            Err(_) => assert_eq!(narrow_unsigned::<u32>(value), Err(ErrorKind::IntegerTooLarge)),
        }
    }
}

#[test]
fn range_checks() {
    assert_eq!(u8::from_token(b"256"), Err(ErrorKind::IntegerTooLarge));
    assert_eq!(u8::from_token(b"255"), Ok(255));
    assert_eq!(i8::from_token(b"123"), Ok(123));
    assert_eq!(i8::from_token(b"-129"), Err(ErrorKind::IntegerTooSmall));
    assert_eq!(i16::from_token(b"0x7fff"), Ok(i16::MAX));
    for token in [&b"-1"[..], b"-0x1"] {
        assert_eq!(u8::from_token(token), Err(ErrorKind::IntegerNegative));
        assert_eq!(u16::from_token(token), Err(ErrorKind::IntegerNegative));
        assert_eq!(u32::from_token(token), Err(ErrorKind::IntegerNegative));
        assert_eq!(u64::from_token(token), Err(ErrorKind::IntegerNegative));
    }
    assert_eq!(u64::from_token(b"9223372036854775807"), Ok(i64::MAX as u64));
    assert_eq!(u64::from_token(b"18446744073709551615"), Err(ErrorKind::IntegerTooLarge));
}

#[test]
fn floats() {
    assert_eq!(parse_f64(b"1.23"), Ok(1.23));
    assert_eq!(parse_f64(b"-4e2"), Ok(-400.0));
    assert_eq!(parse_f64(b"12345"), Ok(12345.0));
    assert_eq!(parse_f64(b".5"), Ok(0.5));
    assert!(parse_f64(b"inf").unwrap().is_infinite());
    assert!(parse_f64(b"NaN").unwrap().is_nan());
    for bad in [&b""[..], b"1.2.3", b"1.5 ", b"abc", b"1,5", b"\xff"] {
        assert_eq!(parse_f64(bad), Err(ErrorKind::NumberFormat));
    }
    assert_eq!(f32::from_token(b"0.5"), Ok(0.5f32));
}

#[test]
fn string_copy_needs_room_for_terminator() {
    let mut small = [0xAAu8; 4];
    assert_eq!(copy_str(b"test", &mut small), Err(ErrorKind::StringTooLarge));
    assert_eq!(small, [0xAA; 4]);

    let mut big = [0xAAu8; 32];
    assert_eq!(copy_str(b"test", &mut big), Ok(4));
    assert_eq!(&big[..5], b"test\0");

    let mut empty: [u8; 0] = [];
    assert_eq!(copy_str(b"", &mut empty), Err(ErrorKind::StringTooLarge));
    let mut one = [0xAAu8; 1];
    assert_eq!(copy_str(b"", &mut one), Ok(0));
    assert_eq!(one, [0]);
}

#[test]
fn text_tokens() {
    assert_eq!(<&str>::from_token(b"caf\xc3\xa9"), Ok("caf\u{e9}"));
    assert_eq!(<&str>::from_token(b"\xff"), Err(ErrorKind::InvalidType));
    assert_eq!(String::from_token(b"\xffok"), Ok("\u{fffd}ok".to_string()));
    assert_eq!(<&[u8]>::from_token(b"\xff"), Ok(&b"\xff"[..]));
}

const TYPES: &[u8] = b"\
[strings]
value1 = test

[ints]
value1 = 123
value2 = -123
value3 = 0xffff
value4 = 0644
bare

[doubles]
value1 = 1.23
";

#[test]
fn reading_through_the_context() {
    let mut nodes = [Node::EMPTY; 32];
    let mut lines = [0u32; 16];
    let mut ctx = Context::new(&mut nodes, &mut lines);
    ctx.parse(TYPES).unwrap();

    let strings = ctx.section(b"strings").unwrap();
    let key = ctx.key(strings, b"value1").unwrap();
    let mut small = [0u8; 2];
    let err = ctx.read_str(key, &mut small).unwrap_err();
    assert_eq!(err.kind, ErrorKind::StringTooLarge);
    let mut big = [0u8; 32];
    assert_eq!(ctx.read_str(key, &mut big), Ok(4));
    assert_eq!(&big[..4], b"test");
    assert_eq!(ctx.read_bool(key).unwrap_err().kind, ErrorKind::BoolFormat);
    assert_eq!(ctx.read_int(key, 0).unwrap_err().kind, ErrorKind::IntegerFormat);
    assert_eq!(ctx.read_f64(key).unwrap_err().kind, ErrorKind::NumberFormat);

    let ints = ctx.section(b"ints").unwrap();
    let expected = [("value1", 123), ("value2", -123), ("value3", 0xffff), ("value4", 0o644)];
    for (name, value) in expected {
        let key = ctx.key(ints, name.as_bytes()).unwrap();
        assert_eq!(ctx.read_int(key, 0), Ok(value));
        assert_eq!(ctx.read::<i64>(key), Ok(value));
    }
    let key = ctx.key(ints, b"value1").unwrap();
    assert_eq!(ctx.read_f64(key), Ok(123.0));
    assert_eq!(ctx.read_int(key, 16), Ok(0x123));

    let doubles = ctx.section(b"doubles").unwrap();
    let key = ctx.key(doubles, b"value1").unwrap();
    let spanned = ctx.read_spanned::<f64>(key).unwrap();
    assert_eq!(spanned.value, 1.23);
    assert_eq!(&TYPES[spanned.span.start as usize..spanned.span.end as usize], b"1.23");

    // Errors land on the value, or on the key when there is none.
    let before = ctx.error_count();
    let value4 = ctx.key(ints, b"value4").unwrap();
    let err = ctx.read::<u8>(value4).unwrap_err();
    assert_eq!(err.kind, ErrorKind::IntegerTooLarge);
    assert_eq!(err.line_info, Some((7, 9)));

    let bare = ctx.key(ints, b"bare").unwrap();
    let err = ctx.read::<bool>(bare).unwrap_err();
    assert_eq!(err.kind, ErrorKind::BoolFormat);
    assert_eq!(err.line_info, Some((8, 0)));
    assert_eq!(ctx.read::<String>(bare), Ok(String::new()));
    assert_eq!(ctx.error_count(), before + 2);
    assert_eq!(ctx.errors().entries().last().unwrap().node, Some(bare));
}
