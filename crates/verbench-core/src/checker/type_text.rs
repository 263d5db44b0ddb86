//! Comparison of TypeScript type annotations as text.

/// Canonical form: no whitespace, double quotes, `;` as the member
/// separator inside type literals, no trailing separators.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut stack: Vec<char> = Vec::new();
    let mut prev = '\0';
    for c in text.chars() {
        if c.is_whitespace() {
            continue;
        }
        let c = if c == '\'' { '"' } else { c };
        match c {
            '{' | '[' | '(' | '<' => stack.push(c),
            '>' if prev == '=' => {}
            '}' | ']' | ')' | '>' => {
                stack.pop();
                if c == '}' {
                    while out.ends_with(';') || out.ends_with(',') {
                        out.pop();
                    }
                }
            }
            _ => {}
        }
        let c = if c == ',' && stack.last() == Some(&'{') {
            ';'
        } else {
            c
        };
        out.push(c);
        prev = c;
    }
    while out.ends_with(';') || out.ends_with(',') {
        out.pop();
    }
    out
}

/// True when both annotations are the same type after normalization,
/// ignoring the order of top-level type-literal members.
pub fn equivalent(a: &str, b: &str) -> bool {
    let (a, b) = (normalize(a), normalize(b));
    if a == b {
        return true;
    }
    match (literal_members(&a), literal_members(&b)) {
        (Some(mut ma), Some(mut mb)) => {
            ma.sort_unstable();
            mb.sort_unstable();
            ma == mb
        }
        _ => false,
    }
}

/// The declared type of `member` inside an object type literal.
pub fn member_type(type_text: &str, member: &str) -> Option<String> {
    let norm = normalize(type_text);
    literal_members(&norm)?.into_iter().find_map(|m| {
        let (name, ty) = m.split_once(':')?;
        let name = name.trim_end_matches('?').trim_start_matches("readonly");
        (name.trim_matches('"') == member).then(|| ty.to_string())
    })
}

/// Top-level members of `{...}`, or `None` if the text is not a single literal.
fn literal_members(norm: &str) -> Option<Vec<&str>> {
    let inner = norm.strip_prefix('{')?.strip_suffix('}')?;
    let mut members = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut prev = '\0';
    for (i, c) in inner.char_indices() {
        match c {
            '{' | '[' | '(' | '<' => depth += 1,
            '>' if prev == '=' => {}
            '}' | ']' | ')' | '>' => {
                depth -= 1;
                // `{a}|{b}` is a union, not one literal
                if depth < 0 {
                    return None;
                }
            }
            ';' if depth == 0 => {
                members.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        prev = c;
    }
    if start < inner.len() {
        members.push(&inner[start..]);
    }
    Some(members.into_iter().filter(|m| !m.is_empty()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_quotes_and_separators() {
        assert_eq!(normalize("{ a: 'x', b: number, }"), r#"{a:"x";b:number}"#);
        assert_eq!(normalize("Record<string, number>"), "Record<string,number>");
        assert!(equivalent("Promise<{ slug: string }>", "Promise<{slug: string;}>"));
    }

    #[test]
    fn member_order_is_ignored() {
        assert!(equivalent(
            "{ params: Promise<{ id: string }>; searchParams: URLSearchParams }",
            "{ searchParams: URLSearchParams, params: Promise<{ id: string }> }"
        ));
        assert!(!equivalent("{ a: string }", "{ a: number }"));
    }

    #[test]
    fn union_of_literals_is_not_reordered() {
        assert!(!equivalent("{a:1}|{b:2}", "{b:2}|{a:1}"));
    }

    #[test]
    fn looks_up_member_types() {
        let t = "{ params: Promise<{ slug: string }>, cb?: (x: number) => void }";
        assert_eq!(member_type(t, "params").as_deref(), Some("Promise<{slug:string}>"));
        assert_eq!(member_type(t, "cb").as_deref(), Some("(x:number)=>void"));
        assert_eq!(member_type(t, "missing"), None);
        assert_eq!(member_type("string", "a"), None);
    }
}
