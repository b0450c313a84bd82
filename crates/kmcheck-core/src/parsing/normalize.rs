/// Upper-case a line and strip Spanish accents so headings and labels match
/// regardless of how the PDF encodes them ("TÉCNICAS" vs "TECNICAS").
///
/// Maps one char to one char, so char positions line up with the input.
pub fn fold(s: &str) -> String {
    s.chars().map(fold_char).collect()
}

fn fold_char(c: char) -> char {
    let upper = c.to_uppercase().next().unwrap_or(c);
    match upper {
        'Á' | 'À' => 'A',
        'É' | 'È' => 'E',
        'Í' | 'Ì' => 'I',
        'Ó' | 'Ò' => 'O',
        'Ú' | 'Ù' | 'Ü' => 'U',
        other => other,
    }
}

/// Find `needle` in `haystack` ignoring case and accents.
///
/// Returns the byte range of the match in the original `haystack`.
pub fn find_folded(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    let needle: Vec<char> = needle.chars().map(fold_char).collect();
    if needle.is_empty() {
        return None;
    }
    let chars: Vec<(usize, char)> = haystack
        .char_indices()
        .map(|(i, c)| (i, fold_char(c)))
        .collect();

    (0..chars.len())
        .find(|&start| {
            chars.len() - start >= needle.len()
                && chars[start..start + needle.len()]
                    .iter()
                    .zip(&needle)
                    .all(|((_, a), b)| a == b)
        })
        .map(|start| {
            let begin = chars[start].0;
            let end = chars
                .get(start + needle.len())
                .map(|(i, _)| *i)
                .unwrap_or(haystack.len());
            (begin, end)
        })
}

/// Collapse runs of whitespace into single spaces.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
