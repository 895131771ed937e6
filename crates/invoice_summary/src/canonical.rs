use models::CanonicalRules;

/// Canonical display name of a raw product label, using the built-in vocabulary.
pub fn canonicalize(raw: &str) -> String {
    canonicalize_with(raw, &CanonicalRules::default())
}

/// Canonical display name of a raw product label.
///
/// - blank input gives an empty string;
/// - fewer than three tokens: the trimmed label, untouched;
/// - sole labels keep three tokens, with a material code moved to position two;
/// - insole labels keep two tokens;
/// - anything else keeps all tokens.
///
/// Retained tokens are capitalized and joined with single spaces.
pub fn canonicalize_with(raw: &str, rules: &CanonicalRules) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if tokens.len() < 3 {
        return trimmed.to_string();
    }

    let first = tokens[0].to_lowercase();
    if starts_with_any(&first, &rules.sole_markers) {
        let mut kept = [tokens[0], tokens[1], tokens[2]];
        if !is_material_code(kept[1], rules) && is_material_code(kept[2], rules) {
            kept.swap(1, 2);
        }
        return join_capitalized(&kept);
    }

    if starts_with_any(&first, &rules.insole_markers) {
        return join_capitalized(&tokens[..2]);
    }

    join_capitalized(&tokens)
}

fn starts_with_any(lowered: &str, markers: &[String]) -> bool {
    markers
        .iter()
        .filter(|m| !m.is_empty())
        .any(|m| lowered.starts_with(&m.to_lowercase()))
}

fn is_material_code(token: &str, rules: &CanonicalRules) -> bool {
    let token = token.to_lowercase();
    rules
        .material_codes
        .iter()
        .any(|code| code.to_lowercase() == token)
}

/// Capitalizes every whitespace-separated token and joins them with single spaces.
pub fn capitalize_words(text: &str) -> String {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    join_capitalized(&tokens)
}

fn join_capitalized(tokens: &[&str]) -> String {
    tokens
        .iter()
        .map(|t| capitalize(t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// First character upper case, the rest lower case. A first character whose
/// upper case spans several characters (`ß` → `SS`) is kept as is.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    let upper = first.to_uppercase();
    let mut out = String::with_capacity(word.len());
    if upper.len() == 1 {
        out.extend(upper);
    } else {
        out.push(first);
    }
    out.extend(chars.flat_map(char::to_lowercase));
    out
}
