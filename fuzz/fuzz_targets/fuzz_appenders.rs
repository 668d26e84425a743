#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use strbuf::StringBuffer;

#[derive(Arbitrary, Debug)]
enum Op {
    Bytes(Vec<u8>),
    Json { src: Vec<u8>, escape_slash: bool },
    Url(Vec<u8>),
    Signed(i64),
    Hex(u64),
    Double(f64),
    Time(u32),
    EraseFront(u16),
    MoveFront(u16),
    Replace(Vec<u8>),
    Reset,
    Steal,
}

fn check_json(src: &[u8], escape_slash: bool) {
    let mut buffer = StringBuffer::with_capacity(0);
    buffer.append_byte(b'"').unwrap();
    buffer.append_json_escaped(src, escape_slash).unwrap();
    buffer.append_byte(b'"').unwrap();

    // valid UTF-8 input always escapes to a parseable JSON string
    if let Ok(text) = std::str::from_utf8(src) {
        let expected = match text.find('\0') {
            Some(pos) => &text[..=pos],
            None => text,
        };
        let parsed: String = serde_json::from_slice(buffer.as_bytes()).unwrap();
        assert_eq!(parsed, expected);
    }
}

fuzz_target!(|ops: Vec<Op>| {
    let mut buffer = StringBuffer::with_capacity(0);
    let mut model: Vec<u8> = Vec::new();

    for op in ops {
        match op {
            Op::Bytes(bytes) => {
                buffer.append_bytes(&bytes).unwrap();
                model.extend_from_slice(&bytes);
            }
            Op::Json { src, escape_slash } => {
                check_json(&src, escape_slash);
                let before = buffer.len();
                buffer.append_json_escaped(&src, escape_slash).unwrap();
                model.extend_from_slice(&buffer.as_bytes()[before..]);
            }
            Op::Url(src) => {
                let before = buffer.len();
                buffer.append_url_encoded(&src).unwrap();
                let encoded = &buffer.as_bytes()[before..];
                assert!(encoded.len() >= src.len() && encoded.len() <= 3 * src.len());
                model.extend_from_slice(encoded);
            }
            Op::Signed(value) => {
                buffer.append_i64(value).unwrap();
                model.extend_from_slice(value.to_string().as_bytes());
            }
            Op::Hex(value) => {
                buffer.append_hex_u64(value).unwrap();
                model.extend_from_slice(format!("{value:X}").as_bytes());
            }
            Op::Double(value) => {
                let before = buffer.len();
                buffer.append_double(value).unwrap();
                let text = std::str::from_utf8(&buffer.as_bytes()[before..]).unwrap();
                // above this the zero padding may round past f64::MAX
                if value.is_finite() && value.abs() <= 1e300 {
                    let parsed: f64 = text.parse().unwrap();
                    assert!((parsed - value).abs() <= value.abs() * 1e-12, "{value} -> {text}");
                }
                model.extend_from_slice(text.as_bytes());
            }
            Op::Time(seconds) => {
                let before = buffer.len();
                buffer.append_time(seconds).unwrap();
                assert_eq!(buffer.len() - before, 8);
                model.extend_from_slice(&buffer.as_bytes()[before..]);
            }
            Op::EraseFront(n) => {
                buffer.erase_front(n.into());
                model.drain(..usize::from(n).min(model.len()));
            }
            Op::MoveFront(n) => {
                buffer.move_front(n.into());
                model.drain(..usize::from(n).min(model.len()));
            }
            Op::Replace(bytes) => {
                buffer.replace_bytes(&bytes).unwrap();
                model = bytes;
            }
            Op::Reset => {
                buffer.reset();
                model.clear();
            }
            Op::Steal => {
                assert_eq!(buffer.steal(), model);
                model.clear();
            }
        }

        assert_eq!(buffer.as_bytes(), model.as_slice());
        assert_eq!(buffer.as_bytes_with_nul().last(), Some(&0));
        assert!(buffer.capacity() == 0 || buffer.len() < buffer.capacity());
    }
});
