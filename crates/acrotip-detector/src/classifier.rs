//! Term classifier.
//!
//! Decides whether an all-caps token in running text is an acronym. The
//! decision is an ordered chain of named, pure predicates combined with
//! short-circuit AND, so individual heuristics can be inspected, reordered
//! or tested on their own.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;

// Word boundaries are ASCII-only: a non-ASCII letter next to a token splits it.
static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?-u:\b)[A-Z]{2,}(?-u:\b)").unwrap());
static NAME_AFTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s[A-Z][a-z]{2,}").unwrap());
static NAME_BEFORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z][a-z]{2,})\s$").unwrap());
static CAPS_BEFORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?-u:\b)[A-Z]{2,}(?-u:\b)\s*$").unwrap());
static CAPS_AFTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?-u:\b)[A-Z]{2,}(?-u:\b)").unwrap());

/// Characters inspected on either side of a short token for a Title-Case word.
const NAME_WINDOW: usize = 20;

const DEFAULT_STOPWORDS: &[&str] = &[
    "THE", "AND", "FOR", "BUT", "NOT", "ALL", "HAS", "ARE", "WAS", "HIS", "HER", "HIM", "WHO",
    "HOW", "MAY", "CAN", "DID", "GET", "HAD", "LET", "SAY", "SHE", "TOO", "USE", "WAY", "ANY",
    "NEW", "NOW", "OLD", "SEE", "OUR", "OUT", "OWN", "PUT", "RUN", "SET", "TRY", "WHY", "ADD",
    "AGE", "AGO", "AID", "AIM", "AIR", "ASK", "ATE", "BAD", "BAR", "BED", "BIG", "BIT", "BOX",
    "BOY", "BUS", "BUY", "CAR", "CUT", "DAY", "DOG", "EAR", "EAT", "END", "EYE", "FAR", "FEW",
    "FIT", "FLY", "GOD", "GOT", "GUN", "GUY", "HOT", "ICE", "ILL", "JOB", "KEY", "KID", "LAW",
    "LAY", "LED", "LEG", "LIE", "LOT", "LOW", "MAP", "MEN", "MET", "MIX", "NOR", "OIL", "PAY",
    "PER", "RED", "RAN", "ROW", "SAT", "SIT", "SIX", "SKY", "SON", "TEN", "TOP", "TWO", "WAR",
    "WET", "WIN", "WON", "YET", "YES", "YOU", "ALSO", "JUST", "LIKE", "WILL", "WITH", "BEEN",
    "COME", "DOES", "DONE", "EACH", "EVEN", "EVER", "FROM", "GAVE", "GOES", "GONE", "GOOD",
    "GREW", "GROW", "HAVE", "HEAD", "HELP", "HERE", "HIGH", "HOME", "INTO", "KEEP", "KIND",
    "KNEW", "KNOW", "LAND", "LAST", "LEFT", "LIFE", "LINE", "LIST", "LONG", "LOOK", "LOST",
    "MADE", "MAKE", "MANY", "MORE", "MOST", "MUCH", "MUST", "NAME", "NEAR", "NEED", "NEXT",
    "NOTE", "ONCE", "ONLY", "OPEN", "OVER", "PAGE", "PART", "PAST", "PICK", "PLAN", "PLAY",
    "PULL", "PUSH", "READ", "REAL", "REST", "SAID", "SAME", "SAVE", "SEEN", "SELF", "SEND",
    "SHOW", "SHUT", "SIDE", "SIGN", "SOME", "SOON", "SORT", "STAY", "STEP", "STOP", "SUCH",
    "SURE", "TAKE", "TALK", "TELL", "THAN", "THAT", "THEM", "THEN", "THEY", "THIS", "THUS",
    "TILL", "TIME", "TOLD", "TOOK", "TURN", "TYPE", "UPON", "VERY", "WANT", "WEEK", "WELL",
    "WENT", "WERE", "WHAT", "WHEN", "WHOM", "WIDE", "WISH", "WORD", "WORK", "YEAR", "YOUR",
    "ZERO", "AM", "AN", "AS", "AT", "BE", "BY", "DO", "GO", "HE", "IF", "IN", "IS", "IT", "ME",
    "MY", "NO", "OF", "OK", "ON", "OR", "SO", "TO", "UP", "US", "WE",
    // UI labels
    "EDIT", "VIEW", "CLICK", "CLOSE", "SHARE", "APPLY", "DRAFT", "LEARN", "REPLY", "PRINT",
    "RESET", "LOGIN", "MENU", "MUTE", "HIDE", "LOCK", "DENY", "POST", "UNDO", "REDO", "MOVE",
    "FIND", "CALL", "BACK", "FULL", "COPY", "PASTE", "TLDR",
    // heading words
    "FREE", "SALE", "LIVE", "WATCH", "FINAL", "ABOUT", "FIRST", "AFTER", "AGAIN", "OTHER",
    "THEIR", "THERE", "THESE", "THOSE", "WHICH", "WHILE", "WOULD", "COULD", "EVERY", "UNDER",
    "STILL", "GREAT", "SMALL", "LARGE", "EARLY", "NEVER", "BEING", "WHERE", "SINCE", "UNTIL",
    "ABOVE", "BELOW", "WHOLE", "MIGHT", "SHALL", "OFTEN", "LATER", "GIVEN", "START", "PLACE",
    "POINT", "PRESS", "THINK", "TODAY", "TOTAL", "VALUE", "WORLD", "WRITE", "PRICE", "STORE",
    "CHECK", "ENTER", "OFFER", "ORDER", "POWER", "RAISE", "REACH", "READY", "RIGHT", "SHORT",
    "SPACE", "STAND", "STATE", "STORY", "STUDY", "TABLE", "THING", "THREE", "TRADE", "USING",
    "VIDEO", "VOICE", "WATER", "YOUNG",
];

const DEFAULT_SUFFIXES: &[&str] = &[
    "ING", "TION", "SION", "MENT", "NESS", "ABLE", "IBLE", "ATED", "ALLY", "ISED", "IZED", "EOUS",
    "IOUS",
];

/// Tunable tables behind the classifier.
#[derive(Debug, Clone)]
pub struct ClassifierTable {
    pub min_len: usize,
    pub max_len: usize,
    pub stopwords: HashSet<String>,
    pub suffixes: Vec<String>,
    /// Suffix rule applies only to tokens at least this long.
    pub suffix_min_len: usize,
    /// Tokens at most this long are checked for flanking Title-Case names.
    pub name_max_len: usize,
}

impl Default for ClassifierTable {
    fn default() -> Self {
        Self {
            min_len: 2,
            max_len: 6,
            stopwords: DEFAULT_STOPWORDS.iter().map(|s| s.to_string()).collect(),
            suffixes: DEFAULT_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            suffix_min_len: 5,
            name_max_len: 3,
        }
    }
}

impl ClassifierTable {
    pub fn with_bounds(mut self, min_len: usize, max_len: usize) -> Self {
        self.min_len = min_len;
        self.max_len = max_len;
        self
    }

    pub fn with_extra_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            let word = word.as_ref().trim().to_ascii_uppercase();
            if !word.is_empty() {
                self.stopwords.insert(word);
            }
        }
        self
    }

    /// Remove terms from the stopword table so they can be detected.
    pub fn with_allowed_terms<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            self.stopwords.remove(&word.as_ref().trim().to_ascii_uppercase());
        }
        self
    }
}

/// A token and where it sits.
#[derive(Debug, Clone, Copy)]
pub struct TokenContext<'a> {
    pub token: &'a str,
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
    /// The containing element renders with `text-transform: uppercase`.
    pub uppercase_transform: bool,
}

type Predicate = fn(&ClassifierTable, &TokenContext<'_>) -> bool;

/// A token accepted by the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatch {
    pub term: String,
    pub start: usize,
    pub end: usize,
}

/// Ordered predicate chain.
#[derive(Debug, Clone)]
pub struct Classifier {
    table: ClassifierTable,
    chain: Vec<(&'static str, Predicate)>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(ClassifierTable::default())
    }
}

impl Classifier {
    pub fn new(table: ClassifierTable) -> Self {
        let chain: Vec<(&'static str, Predicate)> = vec![
            ("shape", shape),
            ("stopword", not_stopword),
            ("english_suffix", no_english_suffix),
            ("tldr", not_tldr),
            ("adjacent_caps", no_adjacent_caps),
            ("likely_name", not_likely_name),
            ("all_caps_context", not_all_caps_context),
            ("text_transform", not_uppercase_transform),
        ];
        Self { table, chain }
    }

    pub fn table(&self) -> &ClassifierTable {
        &self.table
    }

    /// Names of the predicates in evaluation order.
    pub fn predicate_names(&self) -> Vec<&'static str> {
        self.chain.iter().map(|(name, _)| *name).collect()
    }

    /// Whether `text[start..end]` is an acronym.
    pub fn classify(
        &self,
        token: &str,
        text: &str,
        start: usize,
        end: usize,
        uppercase_transform: bool,
    ) -> bool {
        self.rejection(token, text, start, end, uppercase_transform)
            .is_none()
    }

    /// Name of the first predicate that rejects the token, if any.
    pub fn rejection(
        &self,
        token: &str,
        text: &str,
        start: usize,
        end: usize,
        uppercase_transform: bool,
    ) -> Option<&'static str> {
        if text.trim().is_empty() || token.is_empty() {
            return Some("empty");
        }
        if end > text.len() || start >= end || text.get(start..end) != Some(token) {
            return Some("location");
        }
        let ctx = TokenContext {
            token,
            text,
            start,
            end,
            uppercase_transform,
        };
        self.chain
            .iter()
            .find(|(_, predicate)| !predicate(&self.table, &ctx))
            .map(|(name, _)| *name)
    }

    /// Every accepted token in `text`, in order.
    pub fn find_acronyms(&self, text: &str, uppercase_transform: bool) -> Vec<TokenMatch> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        TOKEN
            .find_iter(text)
            .filter(|m| self.classify(m.as_str(), text, m.start(), m.end(), uppercase_transform))
            .map(|m| TokenMatch {
                term: m.as_str().to_string(),
                start: m.start(),
                end: m.end(),
            })
            .collect()
    }

    pub fn is_stopword(&self, term: &str) -> bool {
        self.table.stopwords.contains(term)
    }
}

/// Up to `n` characters of `text` ending at byte `end`.
fn chars_before(text: &str, end: usize, n: usize) -> &str {
    let head = &text[..end];
    let start = head
        .char_indices()
        .rev()
        .nth(n.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    &head[start..]
}

/// Up to `n` characters of `text` starting at byte `start`.
fn chars_after(text: &str, start: usize, n: usize) -> &str {
    let tail = &text[start..];
    let end = tail
        .char_indices()
        .nth(n)
        .map(|(i, _)| i)
        .unwrap_or(tail.len());
    &tail[..end]
}

fn shape(table: &ClassifierTable, ctx: &TokenContext<'_>) -> bool {
    let len = ctx.token.len();
    if len < table.min_len || len > table.max_len {
        return false;
    }
    if !ctx.token.bytes().all(|b| b.is_ascii_uppercase()) {
        return false;
    }
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let before_ok = ctx.text[..ctx.start].chars().next_back().is_none_or(|c| !is_word(c));
    let after_ok = ctx.text[ctx.end..].chars().next().is_none_or(|c| !is_word(c));
    before_ok && after_ok
}

fn not_stopword(table: &ClassifierTable, ctx: &TokenContext<'_>) -> bool {
    !table.stopwords.contains(ctx.token)
}

fn no_english_suffix(table: &ClassifierTable, ctx: &TokenContext<'_>) -> bool {
    ctx.token.len() < table.suffix_min_len
        || !table.suffixes.iter().any(|s| ctx.token.ends_with(s.as_str()))
}

fn not_tldr(_table: &ClassifierTable, ctx: &TokenContext<'_>) -> bool {
    match ctx.token {
        "TL" => !chars_after(ctx.text, ctx.end, 3).eq_ignore_ascii_case(";dr"),
        "DR" => !chars_before(ctx.text, ctx.start, 3).eq_ignore_ascii_case("tl;"),
        _ => true,
    }
}

fn no_adjacent_caps(_table: &ClassifierTable, ctx: &TokenContext<'_>) -> bool {
    !CAPS_BEFORE.is_match(&ctx.text[..ctx.start]) && !CAPS_AFTER.is_match(&ctx.text[ctx.end..])
}

fn not_likely_name(table: &ClassifierTable, ctx: &TokenContext<'_>) -> bool {
    if ctx.token.len() > table.name_max_len {
        return true;
    }
    if NAME_AFTER.is_match(chars_after(ctx.text, ctx.end, NAME_WINDOW)) {
        return false;
    }
    match NAME_BEFORE.captures(chars_before(ctx.text, ctx.start, NAME_WINDOW)) {
        Some(caps) => table.stopwords.contains(&caps[1].to_ascii_uppercase()),
        None => true,
    }
}

fn not_all_caps_context(_table: &ClassifierTable, ctx: &TokenContext<'_>) -> bool {
    let (upper, lower) = ctx.text.bytes().fold((0usize, 0usize), |(u, l), b| {
        if b.is_ascii_uppercase() {
            (u + 1, l)
        } else if b.is_ascii_lowercase() {
            (u, l + 1)
        } else {
            (u, l)
        }
    });
    let total = upper + lower;
    total < 8 || (upper as f64 / total as f64) <= 0.7
}

fn not_uppercase_transform(_table: &ClassifierTable, ctx: &TokenContext<'_>) -> bool {
    !ctx.uppercase_transform
}
