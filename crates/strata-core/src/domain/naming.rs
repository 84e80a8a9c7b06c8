//! Identifier case conventions shared by every emitted layer.
//!
//! A human-entered name ("Unit price", "unit-price", "UnitPrice") is split
//! once into a canonical token sequence. Every layer renders from that
//! sequence, so the schema field `unitPrice`, the storage column
//! `unit_price`, the endpoint segment `unit-price` and the UI label
//! `Unit Price` are recognisably the same entity.
//!
//! ## Word Boundary Detection
//!
//! 1. **Separators:** any character that is not ASCII alphanumeric
//! 2. **Case transition:** `aB` or `2B` splits before `B`
//! 3. **Acronym boundary:** `HTTPRequest` splits between `P` and `R`
//!
//! Tokens that start with a digit are glued to the previous token
//! (`address 2` → `address2`); a leading digit gets an `n` prefix so every
//! rendering is a valid identifier. Names with no usable characters become
//! `unnamed`.

use std::fmt;

use serde::Serialize;

/// Token used when a name has no ASCII letters or digits at all.
pub const EMPTY_NAME: &str = "unnamed";

/// Canonical token sequence of a name.
///
/// Invariant: non-empty; every token is non-empty lowercase ASCII
/// alphanumeric and starts with a letter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    words: Vec<String>,
}

/// The four case renderings consumed by the emitters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentifierCases {
    pub upper_camel: String,
    pub lower_camel: String,
    pub kebab: String,
    pub snake: String,
}

impl Identifier {
    /// Split `raw` into its canonical tokens.
    pub fn parse(raw: &str) -> Self {
        let mut words = normalize(split_words(raw));

        // Re-tokenizing the UpperCamel rendering can only merge neighbouring
        // tokens, so this settles in at most `words.len()` rounds.
        loop {
            let next = normalize(split_words(&join_upper_camel(&words)));
            if next == words {
                break;
            }
            words = next;
        }

        Self { words }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// `UnitPrice`
    pub fn upper_camel(&self) -> String {
        join_upper_camel(&self.words)
    }

    /// `unitPrice`
    pub fn lower_camel(&self) -> String {
        let mut out = String::new();
        for (i, word) in self.words.iter().enumerate() {
            if i == 0 {
                out.push_str(word);
            } else {
                out.push_str(&capitalize(word));
            }
        }
        out
    }

    /// `unit-price`
    pub fn kebab(&self) -> String {
        self.words.join("-")
    }

    /// `unit_price`
    pub fn snake(&self) -> String {
        self.words.join("_")
    }

    /// `Unit Price`, the display label.
    pub fn title(&self) -> String {
        self.words
            .iter()
            .map(|w| capitalize(w))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn cases(&self) -> IdentifierCases {
        IdentifierCases {
            upper_camel: self.upper_camel(),
            lower_camel: self.lower_camel(),
            kebab: self.kebab(),
            snake: self.snake(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.snake())
    }
}

impl From<&str> for Identifier {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

pub fn to_upper_camel(s: &str) -> String {
    Identifier::parse(s).upper_camel()
}

pub fn to_lower_camel(s: &str) -> String {
    Identifier::parse(s).lower_camel()
}

pub fn to_kebab(s: &str) -> String {
    Identifier::parse(s).kebab()
}

pub fn to_snake(s: &str) -> String {
    Identifier::parse(s).snake()
}

fn join_upper_camel(words: &[String]) -> String {
    words.iter().map(|w| capitalize(w)).collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(word.len());
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}

/// Raw tokenizer: lowercase words, split on separators and case boundaries.
fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();

    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(current.to_ascii_lowercase());
                current.clear();
            }
            continue;
        }

        current.push(c);

        if let Some(&next) = chars.peek() {
            // "myApp" → "my" + "App", "line2Total" → "line2" + "Total"
            let case_transition = (c.is_ascii_lowercase() || c.is_ascii_digit())
                && next.is_ascii_uppercase();

            // "HTTPServer" → "HTTP" + "Server"
            let acronym_end = c.is_ascii_uppercase()
                && next.is_ascii_uppercase()
                && chars
                    .clone()
                    .nth(1)
                    .is_some_and(|n| n.is_ascii_lowercase());

            if case_transition || acronym_end {
                words.push(current.to_ascii_lowercase());
                current.clear();
            }
        }
    }

    if !current.is_empty() {
        words.push(current.to_ascii_lowercase());
    }

    words
}

/// Enforce the token invariants on a raw token list.
fn normalize(raw: Vec<String>) -> Vec<String> {
    let mut words: Vec<String> = Vec::with_capacity(raw.len());

    for word in raw {
        let starts_with_digit = word.starts_with(|c: char| c.is_ascii_digit());
        match words.last_mut() {
            Some(prev) if starts_with_digit => prev.push_str(&word),
            None if starts_with_digit => words.push(format!("n{word}")),
            _ => words.push(word),
        }
    }

    if words.is_empty() {
        words.push(EMPTY_NAME.to_string());
    }

    words
}
