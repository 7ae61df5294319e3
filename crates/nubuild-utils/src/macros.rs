use std::collections::HashMap;

/// Expands `$NAME` and `${NAME}` macros in `input` using `vars`.
///
/// Variable names in the bare form are made of ASCII letters, digits and `_`; the braced form
/// additionally accepts `.`. `$$` produces a literal `$`. Macros naming a variable that is not in
/// `vars` are left untouched, as are malformed ones such as an unclosed `${`.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use nubuild_utils::macros::expand_macros;
///
/// let vars = HashMap::from([("BUILD_NUMBER".to_string(), "42".to_string())]);
///
/// assert_eq!(expand_macros("out/${BUILD_NUMBER}", &vars), "out/42");
/// assert_eq!(expand_macros("out/$UNKNOWN", &vars), "out/$UNKNOWN");
/// assert_eq!(expand_macros("cost: $$5", &vars), "cost: $5");
/// ```
pub fn expand_macros(input: &str, vars: &HashMap<String, String>) -> String {
    let bytes = input.as_bytes();
    let mut result = String::with_capacity(input.len());
    let mut literal_start = 0;
    let mut idx = 0;

    while idx < bytes.len() {
        if bytes[idx] != b'$' {
            idx += 1;
            continue;
        }

        let Some((name, end)) = parse_macro(input, idx) else {
            idx += 1;
            continue;
        };

        let replacement = match name {
            MacroName::Dollar => Some("$"),
            MacroName::Var(name) => vars.get(name).map(String::as_str),
        };

        if let Some(value) = replacement {
            result.push_str(&input[literal_start..idx]);
            result.push_str(value);
            literal_start = end;
        }
        idx = end;
    }

    result.push_str(&input[literal_start..]);
    result
}

enum MacroName<'a> {
    Dollar,
    Var(&'a str),
}

/// Parses the macro starting at `start` (which points at a `$`).
///
/// Returns the macro and the byte offset just past it.
fn parse_macro(input: &str, start: usize) -> Option<(MacroName<'_>, usize)> {
    let rest = &input[start + 1..];
    let first = rest.bytes().next()?;

    match first {
        b'$' => Some((MacroName::Dollar, start + 2)),
        b'{' => {
            let close = rest.find('}')?;
            let name = &rest[1..close];
            if name.is_empty() || !name.bytes().all(|b| is_name_byte(b) || b == b'.') {
                return None;
            }
            Some((MacroName::Var(name), start + 1 + close + 1))
        }
        b if is_name_byte(b) => {
            let len = rest.bytes().take_while(|&b| is_name_byte(b)).count();
            Some((MacroName::Var(&rest[..len]), start + 1 + len))
        }
        _ => None,
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> HashMap<String, String> {
        HashMap::from([
            ("WORKSPACE".to_string(), "/ws".to_string()),
            ("BUILD_NUMBER".to_string(), "17".to_string()),
            ("pkg.version".to_string(), "1.2.3".to_string()),
        ])
    }

    #[test]
    fn test_expand_bare_and_braced() {
        let vars = vars();
        assert_eq!(
            expand_macros("$WORKSPACE/out/$BUILD_NUMBER", &vars),
            "/ws/out/17"
        );
        assert_eq!(expand_macros("${WORKSPACE}/nuspec", &vars), "/ws/nuspec");
        assert_eq!(expand_macros("build${BUILD_NUMBER}x", &vars), "build17x");
    }

    #[test]
    fn test_expand_dotted_name_only_in_braces() {
        let vars = vars();
        assert_eq!(expand_macros("v${pkg.version}", &vars), "v1.2.3");
        // bare form stops at the dot and `pkg` is unknown
        assert_eq!(expand_macros("v$pkg.version", &vars), "v$pkg.version");
    }

    #[test]
    fn test_unknown_variables_are_kept() {
        let vars = vars();
        assert_eq!(expand_macros("$MISSING/x", &vars), "$MISSING/x");
        assert_eq!(expand_macros("${MISSING}/x", &vars), "${MISSING}/x");
    }

    #[test]
    fn test_malformed_macros_are_kept() {
        let vars = vars();
        assert_eq!(expand_macros("${WORKSPACE", &vars), "${WORKSPACE");
        assert_eq!(expand_macros("${}", &vars), "${}");
        assert_eq!(expand_macros("${a b}", &vars), "${a b}");
        assert_eq!(expand_macros("trailing $", &vars), "trailing $");
        assert_eq!(expand_macros("$-x", &vars), "$-x");
    }

    #[test]
    fn test_double_dollar_escape() {
        let vars = vars();
        assert_eq!(expand_macros("$$WORKSPACE", &vars), "$WORKSPACE");
        assert_eq!(expand_macros("a$$$WORKSPACE", &vars), "a$/ws");
    }

    #[test]
    fn test_values_are_not_expanded_again() {
        let vars = HashMap::from([("A".to_string(), "$B".to_string()), ("B".to_string(), "b".to_string())]);
        assert_eq!(expand_macros("$A", &vars), "$B");
    }

    #[test]
    fn test_non_ascii_input() {
        let vars = vars();
        assert_eq!(expand_macros("é/$WORKSPACE/ü", &vars), "é//ws/ü");
    }
}
