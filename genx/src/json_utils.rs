//! JSON utility functions.

/// Deserialize JSON with basic repair for common malformations.
///
/// If the initial parse fails, attempts to fix trailing commas and
/// single quotes before retrying.
pub fn unmarshal_json<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T, serde_json::Error> {
    match serde_json::from_slice(data) {
        Ok(v) => Ok(v),
        Err(e) => {
            let s = String::from_utf8_lossy(data);
            let fixed = repair_json(&s);
            match serde_json::from_str(&fixed) {
                Ok(v) => Ok(v),
                Err(_) => Err(e),
            }
        }
    }
}

fn repair_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escape_next = false;
    let chars: Vec<char> = s.chars().collect();

    for i in 0..chars.len() {
        let ch = chars[i];

        if escape_next {
            result.push(ch);
            escape_next = false;
            continue;
        }

        if ch == '\\' && in_string {
            result.push(ch);
            escape_next = true;
            continue;
        }

        if ch == '"' {
            in_string = !in_string;
            result.push(ch);
            continue;
        }

        if !in_string && ch == '\'' {
            result.push('"');
            continue;
        }

        if !in_string && ch == ',' {
            // Skip trailing commas before } or ]
            let rest = chars[i + 1..].iter().collect::<String>();
            let trimmed = rest.trim_start();
            if trimmed.starts_with('}') || trimmed.starts_with(']') {
                continue;
            }
        }

        result.push(ch);
    }

    result
}

/// Generate a random hex string of the given byte length (output is 2*n chars).
pub fn hex_string(n: usize) -> String {
    let mut buf = vec![0u8; n];
    getrandom::fill(&mut buf).expect("getrandom failed");
    hex::encode(buf)
}
