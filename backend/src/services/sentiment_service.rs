//! Keyword and emoji based sentiment classification.
//!
//! Matching is by substring on the lower-cased text, so a keyword embedded in a
//! longer word still counts ("greatest" contains "great").

use crate::models::Sentiment;

const POSITIVE_KEYWORDS: &[&str] = &[
    "ótimo", "excelente", "maravilhoso", "incrível", "fantástico", "perfeito",
    "love", "amazing", "awesome", "great", "excellent", "perfect", "wonderful",
    "bom", "legal", "massa", "top", "show", "lindo", "parabéns", "gostei",
    "👍", "❤️", "😍", "🔥", "👏", "🎉", "😊", "😄", "🥰",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "ruim", "péssimo", "horrível", "terrível", "odeio", "detesto",
    "hate", "awful", "terrible", "horrible", "worst", "bad", "disgusting",
    "chato", "irritante", "nojento", "decepcionante", "fraco", "lixo",
    "👎", "😡", "😠", "🤮", "😤", "💩", "😞", "😢", "🙄",
];

fn count_matches(text: &str, keywords: &[&str]) -> usize {
    keywords
        .iter()
        .filter(|keyword| text.contains(&keyword.to_lowercase()))
        .count()
}

/// Each keyword counts at most once; ties (including no matches) are neutral.
pub fn classify(text: &str) -> Sentiment {
    let normalized = text.to_lowercase();

    let positive = count_matches(&normalized, POSITIVE_KEYWORDS);
    let negative = count_matches(&normalized, NEGATIVE_KEYWORDS);

    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_basic_examples() {
        assert_eq!(classify("Great video!"), Sentiment::Positive);
        assert_eq!(classify("this is terrible"), Sentiment::Negative);
        assert_eq!(classify("it happened on Tuesday"), Sentiment::Neutral);
    }

    #[test]
    fn case_does_not_matter() {
        for text in ["Great video!", "this is terrible", "AWESOME", "Vídeo PÉSSIMO"] {
            assert_eq!(classify(text), classify(&text.to_uppercase()));
            assert_eq!(classify(text), classify(&text.to_lowercase()));
        }
    }

    #[test]
    fn ties_are_neutral() {
        assert_eq!(classify(""), Sentiment::Neutral);
        assert_eq!(classify("great but awful"), Sentiment::Neutral);
    }

    #[test]
    fn counts_emoji_and_embedded_words() {
        assert_eq!(classify("🔥🔥🔥"), Sentiment::Positive);
        assert_eq!(classify("👎"), Sentiment::Negative);
        // "bad" inside "badge" still counts
        assert_eq!(classify("new badge"), Sentiment::Negative);
        // "top" inside "stop"
        assert_eq!(classify("please stop"), Sentiment::Positive);
    }

    #[test]
    fn repeated_keyword_counts_once() {
        // one positive keyword repeated vs two distinct negatives
        assert_eq!(classify("great great great, bad and awful"), Sentiment::Negative);
    }

    #[test]
    fn portuguese_keywords() {
        assert_eq!(classify("Que vídeo incrível, parabéns!"), Sentiment::Positive);
        assert_eq!(classify("muito chato e fraco"), Sentiment::Negative);
    }
}
