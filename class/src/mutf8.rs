use crate::{parse::ByteParser, ClassError, ClassResult};
use std::borrow::Cow;

/// Decodes the modified UTF-8 used by `Utf8` constants.
///
/// It differs from standard UTF-8 in two ways: NUL is encoded as the overlong
/// pair `c0 80`, and supplementary characters are encoded as a surrogate pair
/// of two three-byte sequences. When neither appears the input is already
/// valid UTF-8 and is borrowed as-is.
pub fn parse_mutf8(bytes: &[u8]) -> ClassResult<Cow<'_, str>> {
    let mut parser = ByteParser::new(bytes);
    let mut out: Option<Vec<u8>> = None;

    macro_rules! invalid {
        ($byte:expr) => {
            return Err(ClassError::InvalidModifiedUtf8Byte(parser.offset - 1, $byte))
        };
    }

    macro_rules! continuation {
        ($mask:expr, $bits:expr) => {{
            let b = parser.parse_u8()?;
            if b & $mask != $bits {
                invalid!(b);
            }
            b
        }};
    }

    while !parser.is_empty() {
        let start = parser.offset;
        let b1 = parser.parse_u8()?;
        if b1 == 0 || b1 >= 0xf0 {
            invalid!(b1);
        }

        let rewritten: Option<char> = if b1 & 0x80 == 0 {
            // 0xxxxxxx
            None
        } else if b1 & 0xe0 == 0xc0 {
            // 110xxxxx 10xxxxxx
            let b2 = continuation!(0xc0, 0x80);
            if b1 == 0xc0 && b2 == 0x80 {
                Some('\0')
            } else {
                None
            }
        } else if b1 == 0xed && parser.peek(1).map(|b| b[0] & 0xf0 == 0xa0) == Ok(true) {
            // 11101101 1010xxxx 10xxxxxx 11101101 1011yyyy 10yyyyyy
            let b2 = continuation!(0xf0, 0xa0);
            let b3 = continuation!(0xc0, 0x80);
            continuation!(0xff, 0xed);
            let b5 = continuation!(0xf0, 0xb0);
            let b6 = continuation!(0xc0, 0x80);

            let scalar = 0x10000
                + ((b2 as u32 & 0x0f) << 16)
                + ((b3 as u32 & 0x3f) << 10)
                + ((b5 as u32 & 0x0f) << 6)
                + (b6 as u32 & 0x3f);
            match std::char::from_u32(scalar) {
                Some(ch) => Some(ch),
                None => invalid!(b1),
            }
        } else if b1 & 0xf0 == 0xe0 {
            // 1110xxxx 10xxxxxx 10xxxxxx
            continuation!(0xc0, 0x80);
            continuation!(0xc0, 0x80);
            None
        } else {
            invalid!(b1);
        };

        match (rewritten, &mut out) {
            (Some(ch), out) => {
                let buf = out.get_or_insert_with(|| bytes[..start].to_vec());
                let mut utf8 = [0; 4];
                buf.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
            }
            (None, Some(buf)) => buf.extend_from_slice(&bytes[start..parser.offset]),
            (None, None) => {}
        }
    }

    let decoded = match out {
        Some(buf) => String::from_utf8(buf).map(Cow::Owned).ok(),
        None => std::str::from_utf8(bytes).map(Cow::Borrowed).ok(),
    };
    // Lone surrogates pass the byte checks above but are not valid UTF-8.
    decoded.ok_or(ClassError::InvalidModifiedUtf8Byte(0, bytes[0]))
}

/// Encodes `text` as modified UTF-8, borrowing it when the two encodings
/// agree.
pub fn encode_mutf8(text: &str) -> Cow<'_, [u8]> {
    if !text.chars().any(|ch| ch == '\0' || ch as u32 > 0xffff) {
        return Cow::Borrowed(text.as_bytes());
    }

    let mut out = Vec::with_capacity(text.len() + 2);
    let mut units = [0; 2];
    for ch in text.chars() {
        match ch {
            '\0' => out.extend_from_slice(&[0xc0, 0x80]),
            ch if ch as u32 > 0xffff => {
                for &unit in ch.encode_utf16(&mut units).iter() {
                    out.push(0xe0 | (unit >> 12) as u8);
                    out.push(0x80 | ((unit >> 6) & 0x3f) as u8);
                    out.push(0x80 | (unit & 0x3f) as u8);
                }
            }
            ch => {
                let mut utf8 = [0; 4];
                out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
            }
        }
    }
    Cow::Owned(out)
}
