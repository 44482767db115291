//! Clipboard boundary: pasted payloads are reduced to plain text.
//!
//! Terminals deliver bracketed pastes verbatim, so a payload copied from
//! another terminal can carry SGR colouring, OSC hyperlinks or stray control
//! bytes. Only printable text, line breaks and tabs survive; `\r\n` and lone
//! `\r` become `\n`, tabs become spaces.

const TAB_WIDTH: usize = 4;

pub fn sanitize_paste(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\x1b' => match chars.next() {
                Some('[') => {
                    // CSI: parameters until a final byte in 0x40..=0x7E
                    for next in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&next) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    // OSC: terminated by BEL or ST (ESC \)
                    while let Some(next) = chars.next() {
                        if next == '\x07' {
                            break;
                        }
                        if next == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            },
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                output.push('\n');
            }
            '\n' => output.push('\n'),
            '\t' => output.push_str(&" ".repeat(TAB_WIDTH)),
            ch if ch.is_control() => {}
            ch => output.push(ch),
        }
    }
    output
}
