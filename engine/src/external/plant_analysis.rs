//! Photo analysis signal classification
//!
//! The photo analysis service returns free text. The engine treats that
//! text as an opaque signal and only sorts it into positive, negative or
//! neutral by keyword.

use shared::SignalSentiment;

/// Words that rule out the problem named right after them
const NEGATORS: &[&str] = &["no", "without", "free"];

/// Filler between a negator and the problem it rules out
const FILLERS: &[&str] = &["signs", "sign", "of", "any", "visible", "evident", "obvious", "apparent"];

/// Word prefixes that indicate a problem
const NEGATIVE_STEMS: &[&str] = &[
    "disease", "fungal", "fungus", "blight", "rot", "pest", "infect", "wilt", "mold", "mould",
    "mildew", "yellowing", "spots", "damage", "unhealthy", "dying", "dead", "deficien",
];

/// Phrases where a positive word is negated
const NEGATIVE_PHRASES: &[&str] = &["not healthy", "not thriving", "not doing well", "poor condition"];

const POSITIVE_STEMS: &[&str] = &[
    "healthy", "thriving", "vibrant", "lush", "vigorous", "excellent", "robust",
];

const POSITIVE_PHRASES: &[&str] = &["good condition", "doing well"];

/// Classify free text from the photo analysis service
pub fn classify_signal(text: &str) -> SignalSentiment {
    let text = text.to_lowercase();
    if NEGATIVE_PHRASES.iter().any(|p| text.contains(p)) {
        return SignalSentiment::Negative;
    }

    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let (remaining, ruled_out) = strip_ruled_out(&words);

    if remaining.iter().any(|w| is_problem(w)) {
        SignalSentiment::Negative
    } else if ruled_out
        || POSITIVE_PHRASES.iter().any(|p| text.contains(p))
        || remaining
            .iter()
            .any(|w| POSITIVE_STEMS.iter().any(|stem| w.starts_with(stem)))
    {
        SignalSentiment::Positive
    } else {
        SignalSentiment::Neutral
    }
}

fn is_problem(word: &str) -> bool {
    NEGATIVE_STEMS.iter().any(|stem| word.starts_with(stem))
}

/// Drop problems that the text explicitly rules out ("no pests",
/// "disease-free"), reporting whether anything was ruled out
///
/// Only problem words can be ruled out; "no new growth" keeps its words.
fn strip_ruled_out<'a>(words: &[&'a str]) -> (Vec<&'a str>, bool) {
    let mut kept: Vec<&'a str> = Vec::with_capacity(words.len());
    let mut ruled_out = false;
    let mut i = 0;

    while i < words.len() {
        let word = words[i];
        if word == "free" {
            // "<problem> free" / "<problem>-free"
            if kept.last().is_some_and(|w| is_problem(w)) {
                kept.pop();
                ruled_out = true;
            }
            i += 1;
            continue;
        }
        if NEGATORS.contains(&word) {
            let mut next = i + 1;
            while next < words.len() && FILLERS.contains(&words[next]) {
                next += 1;
            }
            if next < words.len() && is_problem(words[next]) {
                ruled_out = true;
                i = next + 1;
            } else {
                i += 1;
            }
            continue;
        }
        kept.push(word);
        i += 1;
    }

    (kept, ruled_out)
}
