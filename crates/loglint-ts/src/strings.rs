//! Go string literal decoding.

/// Decodes the source text of a Go string literal, quotes included.
///
/// Returns `None` when `raw` is not a string literal.
#[must_use]
pub fn decode_literal(raw: &str) -> Option<String> {
    if let Some(body) = raw.strip_prefix('`').and_then(|r| r.strip_suffix('`')) {
        // Carriage returns are discarded from raw strings.
        return Some(body.replace('\r', ""));
    }
    let body = raw.strip_prefix('"')?.strip_suffix('"')?;
    Some(unescape(body))
}

fn unescape(body: &str) -> String {
    let mut out: Vec<u8> = Vec::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            push_char(&mut out, c);
            continue;
        }
        let Some(esc) = chars.next() else {
            out.push(b'\\');
            break;
        };
        match esc {
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0c),
            'n' => out.push(b'\n'),
            'r' => out.push(b'\r'),
            't' => out.push(b'\t'),
            'v' => out.push(0x0b),
            '\\' => out.push(b'\\'),
            '"' => out.push(b'"'),
            '\'' => out.push(b'\''),
            'x' => match take_radix(&mut chars, 2, 16).and_then(|v| u8::try_from(v).ok()) {
                Some(byte) => out.push(byte),
                None => out.extend_from_slice(b"\\x"),
            },
            'u' | 'U' => {
                let digits = if esc == 'u' { 4 } else { 8 };
                match take_radix(&mut chars, digits, 16).and_then(char::from_u32) {
                    Some(decoded) => push_char(&mut out, decoded),
                    None => {
                        out.push(b'\\');
                        push_char(&mut out, esc);
                    }
                }
            }
            '0'..='7' => {
                let first = esc.to_digit(8).unwrap_or(0);
                match take_radix(&mut chars, 2, 8)
                    .map(|rest| first * 64 + rest)
                    .and_then(|v| u8::try_from(v).ok())
                {
                    Some(byte) => out.push(byte),
                    None => {
                        out.push(b'\\');
                        push_char(&mut out, esc);
                    }
                }
            }
            other => {
                out.push(b'\\');
                push_char(&mut out, other);
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut buf = [0; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

/// Consumes exactly `count` digits in `radix`, or nothing.
fn take_radix(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    count: usize,
    radix: u32,
) -> Option<u32> {
    let lookahead: Vec<char> = chars.clone().take(count).collect();
    if lookahead.len() != count || !lookahead.iter().all(|c| c.is_digit(radix)) {
        return None;
    }
    let mut value = 0u32;
    for c in lookahead {
        value = value * radix + c.to_digit(radix)?;
        chars.next();
    }
    Some(value)
}
