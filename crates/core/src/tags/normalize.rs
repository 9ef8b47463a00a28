#![forbid(unsafe_code)]

/// Canonical comparison form of a raw tag.
///
/// Lowercases, maps `-`/`_` to spaces, folds typographic quotes to ASCII,
/// spells `&` as `and`, collapses whitespace runs and trims both ends.
/// Total over every input and idempotent.
pub fn normalize_tag(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;

    for ch in lowered.trim().chars() {
        let ch = match ch {
            '-' | '_' => ' ',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
            other => other,
        };

        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }

        if ch == '&' {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str("and");
            pending_space = true;
            continue;
        }

        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(ch);
    }

    out
}
