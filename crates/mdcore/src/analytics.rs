//! Word, character and reading-time statistics for a document body.

/// Average reading speed used for the reading-time estimate.
pub const WORDS_PER_MINUTE: usize = 200;

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

/// Estimated reading time in whole minutes, rounded up.
pub fn reading_time_minutes(words: usize) -> usize {
    words.div_ceil(WORDS_PER_MINUTE)
}

pub fn format_reading_time(minutes: usize) -> String {
    match minutes {
        0 => "less than 1 min read".to_string(),
        1 => "1 min read".to_string(),
        n => format!("{} min read", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_splits_on_whitespace_runs() {
        assert_eq!(word_count("a b  c"), 3);
        assert_eq!(word_count("one\ttwo\nthree"), 3);
    }

    #[test]
    fn test_word_count_zero_iff_blank() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n\t "), 0);
        assert_ne!(word_count(" x "), 0);
    }

    #[test]
    fn test_char_count() {
        assert_eq!(char_count(""), 0);
        assert_eq!(char_count("héllo"), 5);
    }

    #[test]
    fn test_line_count() {
        assert_eq!(line_count(""), 1);
        assert_eq!(line_count("a\nb\nc"), 3);
    }

    #[test]
    fn test_reading_time_rounds_up() {
        assert_eq!(reading_time_minutes(0), 0);
        assert_eq!(reading_time_minutes(1), 1);
        assert_eq!(reading_time_minutes(200), 1);
        assert_eq!(reading_time_minutes(201), 2);
        assert_eq!(reading_time_minutes(401), 3);
    }

    #[test]
    fn test_format_reading_time() {
        assert_eq!(format_reading_time(0), "less than 1 min read");
        assert_eq!(format_reading_time(1), "1 min read");
        assert_eq!(format_reading_time(3), "3 min read");
    }
}
