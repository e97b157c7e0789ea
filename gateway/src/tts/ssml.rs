//! SSML detection and first-level-child chunking (C6, first half).
//!
//! The chunker is a single-pass scan tracking nesting depth: at depth 0 it
//! looks for `<speak>`; at depth 1, each complete element (including its
//! subtree) becomes one chunk `<speak [attrs]>child</speak>`. Text between
//! first-level children is dropped, matching the source behavior this was
//! distilled from (§9 notes this as an open question we do not resolve
//! here).

/// Strictly syntactic SSML-shaped test: lower-cased buffer starts with
/// `<?xml` or `<speak` AND contains `</speak>`.
pub fn looks_ssml_shaped(buf: &str) -> bool {
    let lower = buf.trim_start().to_ascii_lowercase();
    (lower.starts_with("<?xml") || lower.starts_with("<speak")) && lower.contains("</speak>")
}

/// Escapes `& < > " '` for embedding plain text inside an SSML document.
pub fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Wraps plain text into a minimal SSML document, escaping it first so the
/// auto-detecting synthesizer backend never misinterprets it as markup.
pub fn wrap_plain_text(text: &str) -> String {
    format!("<speak>{}</speak>", xml_escape(text))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakBlock {
    /// Attributes of the original `<speak>` tag, verbatim, space-separated.
    pub attrs: String,
    /// One chunk per first-level child: `<speak [attrs]>child</speak>`.
    pub chunks: Vec<String>,
    /// Byte length of the full `<speak>...</speak>` block, including any
    /// leading `<?xml ...?>` prolog that preceded it.
    pub consumed: usize,
}

enum TagKind<'a> {
    Open(&'a str),
    Close,
    SelfClose,
    Comment,
}

/// Finds the next tag starting at or after `pos`. Returns its kind and the
/// `[start, end)` byte range of the tag including angle brackets.
fn next_tag(buf: &str, pos: usize) -> Option<(TagKind<'_>, usize, usize)> {
    let rest = &buf[pos..];
    let lt = rest.find('<')?;
    let start = pos + lt;

    if buf[start..].starts_with("<!--") {
        let end_rel = buf[start..].find("-->")?;
        let end = start + end_rel + 3;
        return Some((TagKind::Comment, start, end));
    }

    // Scan forward for the matching '>', quote-aware.
    let mut in_quote: Option<char> = None;
    let mut end = None;
    for (i, ch) in buf[start..].char_indices() {
        match in_quote {
            Some(q) if ch == q => in_quote = None,
            Some(_) => {}
            None => match ch {
                '"' | '\'' => in_quote = Some(ch),
                '>' => {
                    end = Some(start + i + 1);
                    break;
                }
                _ => {}
            },
        }
    }
    let end = end?;
    let tag_text = &buf[start..end];

    if tag_text.starts_with("</") {
        Some((TagKind::Close, start, end))
    } else if tag_text.ends_with("/>") {
        Some((TagKind::SelfClose, start, end))
    } else {
        let name_start = 1;
        let name_end = tag_text[name_start..]
            .find(|c: char| c.is_whitespace() || c == '>')
            .map(|i| name_start + i)
            .unwrap_or(tag_text.len());
        Some((TagKind::Open(&tag_text[name_start..name_end]), start, end))
    }
}

/// Scans `buf` for a complete `<speak>...</speak>` block (skipping any
/// `<?xml ...?>` prolog) and splits it into first-level-child chunks.
/// Returns `None` if no complete block is present yet.
pub fn parse_speak_block(buf: &str) -> Option<SpeakBlock> {
    let mut pos = 0usize;
    // Skip an optional XML prolog.
    if buf.trim_start().to_ascii_lowercase().starts_with("<?xml") {
        let prolog_end = buf.find("?>")? + 2;
        pos = prolog_end;
    }

    let speak_start = buf[pos..].to_ascii_lowercase().find("<speak")? + pos;
    let (open_tag_text, open_end) = {
        let mut scan_pos = speak_start;
        loop {
            let (kind, start, end) = next_tag(buf, scan_pos)?;
            if start != speak_start {
                scan_pos = end;
                continue;
            }
            match kind {
                TagKind::Open(_) | TagKind::SelfClose => break (buf[start..end].to_string(), end),
                _ => return None,
            }
        }
    };
    let attrs = open_tag_text
        .trim_start_matches('<')
        .trim_end_matches("/>")
        .trim_end_matches('>')
        .splitn(2, char::is_whitespace)
        .nth(1)
        .unwrap_or("")
        .trim()
        .to_string();

    if open_tag_text.ends_with("/>") {
        // Self-closing <speak/>: no children, consumed ends right here.
        return Some(SpeakBlock {
            attrs: attrs.clone(),
            chunks: vec![],
            consumed: open_end,
        });
    }

    let mut chunks = Vec::new();
    let mut pos = open_end;
    let mut child_start: Option<usize> = None;
    let mut depth = 0u32; // depth within the current first-level child

    loop {
        let (kind, start, end) = next_tag(buf, pos)?;
        match kind {
            TagKind::Comment => {
                pos = end;
            }
            TagKind::Open(_) => {
                if child_start.is_none() {
                    child_start = Some(start);
                    depth = 1;
                } else {
                    depth += 1;
                }
                pos = end;
            }
            TagKind::SelfClose => {
                if child_start.is_none() {
                    chunks.push(buf[start..end].to_string());
                } else {
                    // nested self-closing tag inside the current child; depth unchanged
                }
                pos = end;
            }
            TagKind::Close => {
                if child_start.is_none() {
                    // This must be </speak> with no remaining children.
                    return Some(SpeakBlock {
                        attrs,
                        chunks,
                        consumed: end,
                    });
                }
                depth -= 1;
                if depth == 0 {
                    let cs = child_start.take().unwrap();
                    chunks.push(buf[cs..end].to_string());
                }
                pos = end;
            }
        }
    }
}

/// Wraps a bare first-level child into the `<speak [attrs]>child</speak>`
/// chunk shape, preserving the original `<speak>` attributes verbatim.
pub fn wrap_chunk(attrs: &str, child: &str) -> String {
    if attrs.is_empty() {
        format!("<speak>{child}</speak>")
    } else {
        format!("<speak {attrs}>{child}</speak>")
    }
}
