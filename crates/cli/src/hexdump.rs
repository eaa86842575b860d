//! Hex/ASCII rendering of raw bytes.

/// Format `bytes` as lines of `per_line` bytes, addresses starting at `base`.
pub fn lines(bytes: &[u8], base: u32, per_line: usize) -> impl Iterator<Item = String> + '_ {
    let per_line = per_line.max(1);
    bytes.chunks(per_line).enumerate().map(move |(i, chunk)| {
        let addr = base as usize + i * per_line;
        let mut hex = String::with_capacity(per_line * 3);
        for (j, b) in chunk.iter().enumerate() {
            if j > 0 {
                hex.push(' ');
            }
            hex.push_str(&format!("{b:02x}"));
        }
        let ascii: String = chunk
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        format!("{addr:08x}  {hex:<width$}  |{ascii}|", width = per_line * 3 - 1)
    })
}

pub fn print(bytes: &[u8], base: u32, per_line: usize) {
    for line in lines(bytes, base, per_line) {
        println!("{line}");
    }
}
