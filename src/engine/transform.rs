/// snake_case → camelCase.
///
/// A lone `_` is dropped and uppercases the next character; a run of two or
/// more underscores is copied through verbatim. Everything else is copied
/// unchanged, so existing capitals survive (`"foo_BAR"` → `"fooBAR"`).
/// With `capitalize` the first emitted character is uppercased too.
pub fn to_camel(input: &str, capitalize: bool) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut upcase = capitalize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '_' {
            if chars.get(i + 1) == Some(&'_') {
                while chars.get(i) == Some(&'_') {
                    out.push('_');
                    i += 1;
                }
                upcase = false;
                continue;
            }
            upcase = true;
        } else if upcase {
            out.push(c.to_ascii_uppercase());
            upcase = false;
        } else {
            out.push(c);
        }
        i += 1;
    }

    out
}

/// camelCase → snake_case.
///
/// A new word starts before character `i` when:
/// - `i == 1` and a lowercase first character precedes an uppercase one
///   (`"mCURL"` → `m`, `curl`);
/// - `i > 1`, it is uppercase and the previous character is not;
/// - `i > 1`, it ends a run of capitals and is followed by a lowercase
///   letter (`"HTMLParser"` → `html`, `parser`).
///
/// Words are lowercased and joined with `_`.
pub fn to_snake(input: &str) -> String {
    split_words(input).join("_")
}

fn split_words(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut words = Vec::new();
    let mut word = String::new();

    for (i, &c) in chars.iter().enumerate() {
        let upper = c.is_ascii_uppercase();
        let prev_upper = i > 0 && chars[i - 1].is_ascii_uppercase();
        let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());

        let leading = i == 1 && upper && chars[0].is_ascii_lowercase();
        let standard = i > 1 && upper && !prev_upper;
        let acronym = i > 1 && upper && prev_upper && next_lower;

        if (leading || standard || acronym) && !word.is_empty() {
            words.push(std::mem::take(&mut word));
        }
        word.push(c.to_ascii_lowercase());
    }

    if !word.is_empty() {
        words.push(word);
    }
    words
}
