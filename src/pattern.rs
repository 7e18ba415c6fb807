use crate::error::Error;
use regex::Regex;

///
/// A shell-style filename glob, matched against the whole filename.
///
/// `*` matches any run of characters (path separators included), `?` matches one
/// character and `[seq]` / `[!seq]` match one character in / not in `seq`.
///
#[derive(Debug, Clone)]
pub struct FilenamePattern {
    glob: String,
    re: Regex,
}

impl FilenamePattern {
    pub fn new(glob: &str) -> Result<Self, Error> {
        let re = Regex::new(&translate(glob))?;
        Ok(Self {
            glob: glob.to_string(),
            re,
        })
    }

    pub fn glob(&self) -> &str {
        &self.glob
    }

    pub fn matches(&self, filename: &str) -> bool {
        self.re.is_match(filename)
    }
}

// translate a glob into an anchored regex
fn translate(glob: &str) -> String {
    let chars: Vec<char> = glob.chars().collect();
    let mut re = String::from("(?s)^");

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    re.push('[');
                    let mut j = i;
                    if chars[j] == '!' {
                        re.push('^');
                        j += 1;
                    } else if chars[j] == '^' {
                        re.push_str("\\^");
                        j += 1;
                    }
                    for &member in &chars[j..end] {
                        match member {
                            '\\' | '[' | ']' | '&' | '~' | '|' => {
                                re.push('\\');
                                re.push(member);
                            }
                            _ => re.push(member),
                        }
                    }
                    re.push(']');
                    i = end + 1;
                }
                None => re.push_str("\\["),
            },
            _ => re.push_str(&regex::escape(&c.to_string())),
        }
    }

    re.push('$');
    re
}

// index of the `]` closing a class whose body starts at `start`; a `]` right
// after the opening bracket (or after `!`) is part of the set
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start;
    if j < chars.len() && chars[j] == '!' {
        j += 1;
    }
    if j < chars.len() && chars[j] == ']' {
        j += 1;
    }
    while j < chars.len() && chars[j] != ']' {
        j += 1;
    }
    if j < chars.len() {
        Some(j)
    } else {
        None
    }
}
