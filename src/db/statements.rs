//! Statement boundary detection.
//!
//! Counts the statements in a SQL string by splitting at top-level
//! semicolons. Semicolons inside string literals, quoted identifiers,
//! comments and `CREATE TRIGGER ... BEGIN ... END` bodies do not end a
//! statement.

/// Counts the statements in `sql`.
///
/// Text made only of whitespace, comments and semicolons holds zero
/// statements.
pub fn count_statements(sql: &str) -> usize {
    let chars: Vec<char> = sql.chars().collect();
    let n = chars.len();

    let mut count = 0;
    let mut has_content = false;
    // Leading keywords of the current statement, enough to spot a trigger.
    let mut lead: Vec<String> = Vec::new();
    // BEGIN/CASE nesting inside a trigger body.
    let mut depth: usize = 0;

    let mut i = 0;
    while i < n {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            c if c.is_whitespace() => i += 1,
            '-' if next == Some('-') => {
                while i < n && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if next == Some('*') => {
                i += 2;
                while i < n && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i = (i + 2).min(n);
            }
            '\'' | '"' | '`' => {
                has_content = true;
                i = skip_quoted(&chars, i, c);
            }
            '[' => {
                has_content = true;
                while i < n && chars[i] != ']' {
                    i += 1;
                }
                i = (i + 1).min(n);
            }
            ';' => {
                if depth == 0 {
                    if has_content {
                        count += 1;
                    }
                    has_content = false;
                    lead.clear();
                }
                i += 1;
            }
            c if c.is_alphanumeric() || c == '_' => {
                let start = i;
                while i < n && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$') {
                    i += 1;
                }
                has_content = true;
                let word: String = chars[start..i].iter().collect::<String>().to_uppercase();
                if lead.len() < 4 {
                    lead.push(word.clone());
                }
                if is_trigger(&lead) {
                    match word.as_str() {
                        "BEGIN" | "CASE" => depth += 1,
                        "END" => depth = depth.saturating_sub(1),
                        _ => {}
                    }
                }
            }
            _ => {
                has_content = true;
                i += 1;
            }
        }
    }

    if has_content {
        count += 1;
    }
    count
}

/// Returns the index just past the literal opened by `quote` at `start`.
/// A doubled quote character is an escaped quote, not the end.
fn skip_quoted(chars: &[char], start: usize, quote: char) -> usize {
    let mut i = start + 1;
    while i < chars.len() {
        if chars[i] == quote {
            if chars.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    chars.len()
}

/// `CREATE [TEMP|TEMPORARY] TRIGGER`
fn is_trigger(lead: &[String]) -> bool {
    lead.first().map(String::as_str) == Some("CREATE")
        && lead.iter().skip(1).take(2).any(|w| w == "TRIGGER")
}
