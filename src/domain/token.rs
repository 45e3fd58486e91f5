/// Display-string token grammar.
///
/// A display string is a sequence of literal characters and `:name:` tokens.
///
///   - `name` is one or more characters, none of them `:` or whitespace.
///     A colon that does not open such a token is a literal colon, so
///     `"Time: 12:30"` is plain text.
///   - numeric `name`      → reserved slot (`:0:` .. `:9:` and beyond)
///   - `name` with a `.`   → external image asset (`:logo.png:`)
///   - anything else       → builtin icon
///
/// `\n` and `\r` are layout breaks; they are never rejected and produce no
/// columns.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Char(char),
    LineBreak,
    Reserved(String),
    Image(String),
    Icon(String),
}

impl Segment {
    fn from_token(name: String) -> Self {
        if name.chars().all(|c| c.is_ascii_digit()) {
            Segment::Reserved(name)
        } else if name.contains('.') {
            Segment::Image(name)
        } else {
            Segment::Icon(name)
        }
    }
}

/// Split a display string into segments. Never fails: classification of
/// the segments (known icon? supported char?) is the rasterizer's job.
pub fn tokenize(text: &str) -> Vec<Segment> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\n' | '\r' => {
                out.push(Segment::LineBreak);
                i += 1;
            }
            ':' => match token_end(&chars, i) {
                Some(end) => {
                    let name: String = chars[i + 1..end].iter().collect();
                    out.push(Segment::from_token(name));
                    i = end + 1;
                }
                None => {
                    out.push(Segment::Char(':'));
                    i += 1;
                }
            },
            _ => {
                out.push(Segment::Char(c));
                i += 1;
            }
        }
    }

    out
}

/// Index of the closing colon of a token opened at `open`, if any.
fn token_end(chars: &[char], open: usize) -> Option<usize> {
    let mut j = open + 1;
    while j < chars.len() {
        let c = chars[j];
        if c == ':' {
            return if j > open + 1 { Some(j) } else { None };
        }
        if c.is_whitespace() {
            return None;
        }
        j += 1;
    }
    None
}
