use std::fmt;

/// Text that is safe to place into a preview template.
///
/// The only ways to get one are [`sanitize`] and the integer conversions, so
/// untrusted strings cannot reach a template without having their markup
/// stripped first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SafeText(String);

impl SafeText {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SafeText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for SafeText {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl From<u64> for SafeText {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for SafeText {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

/// Makes untrusted text safe to interpolate into preview HTML.
pub fn sanitize(input: &str) -> SafeText {
    SafeText(strip_tags(input))
}

#[derive(Clone, Copy)]
enum State {
    Text,
    Tag { quote: Option<char> },
    Comment,
}

/// Removes every tag, comment and processing instruction from `input`,
/// keeping the text between them.
///
/// A `<` followed by whitespace (or ending the input) is not a tag and is
/// kept. An unterminated tag swallows the rest of the input.
pub fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut state = State::Text;
    let mut rest = input;

    while let Some(c) = rest.chars().next() {
        let len = c.len_utf8();

        match state {
            State::Text => {
                if c == '<' {
                    let next = rest[len..].chars().next();
                    match next {
                        None => out.push(c),
                        Some(n) if n.is_whitespace() => out.push(c),
                        Some(_) if rest.starts_with("<!--") => {
                            state = State::Comment;
                            rest = &rest[4..];
                            continue;
                        }
                        Some(_) => state = State::Tag { quote: None },
                    }
                } else {
                    out.push(c);
                }
            }
            State::Tag { quote: Some(q) } => {
                if c == q {
                    state = State::Tag { quote: None };
                }
            }
            State::Tag { quote: None } => match c {
                '"' | '\'' => state = State::Tag { quote: Some(c) },
                '>' => state = State::Text,
                _ => {}
            },
            State::Comment => {
                if rest.starts_with("-->") {
                    state = State::Text;
                    rest = &rest[3..];
                    continue;
                }
            }
        }

        rest = &rest[len..];
    }

    out
}
