//! Content classification heuristics
//!
//! Advisory labeling only; every item is sealed the same way regardless of
//! its classification.

use clipvault_domain::ContentType;

const PASSWORD_HINTS: [&str; 4] = ["password", "secret", "token", "key"];

const CODE_HINTS: [&str; 10] = [
    "function", "const ", "let ", "var ", "class ", "import ", "export ", "def ", "public ",
    "private ",
];

/// Guess what kind of content was captured.
pub fn classify(content: &str) -> ContentType {
    if looks_like_password(content) {
        ContentType::Password
    } else if looks_like_code(content) {
        ContentType::Code
    } else {
        ContentType::Text
    }
}

fn looks_like_password(content: &str) -> bool {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return false;
    }

    // masked password fields come through as asterisks
    if trimmed.chars().all(|c| c == '*') {
        return true;
    }

    let lowered = trimmed.to_lowercase();
    if PASSWORD_HINTS.iter().any(|hint| lowered.contains(hint)) {
        return true;
    }

    // short, dense, no whitespace, mixed character classes
    let len = trimmed.chars().count();
    (8..=64).contains(&len)
        && !trimmed.chars().any(char::is_whitespace)
        && trimmed.chars().any(|c| c.is_ascii_alphabetic())
        && trimmed.chars().any(|c| c.is_ascii_digit())
        && trimmed.chars().any(|c| c.is_ascii_punctuation())
}

fn looks_like_code(content: &str) -> bool {
    let trimmed = content.trim_start();
    if trimmed.starts_with('<') {
        return true;
    }
    let lowered = content.to_lowercase();
    content.contains('{') || CODE_HINTS.iter().any(|hint| lowered.contains(hint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn password_hints_win() {
        assert_eq!(classify("my password is hunter2"), ContentType::Password);
        assert_eq!(classify("API_TOKEN=abc123"), ContentType::Password);
        assert_eq!(classify("********"), ContentType::Password);
    }

    #[test]
    fn dense_credential_detected() {
        assert_eq!(classify("x9!Kp2#mQz"), ContentType::Password);
    }

    #[test]
    fn code_detected() {
        assert_eq!(classify("function greet() { return 1; }"), ContentType::Code);
        assert_eq!(classify("def greet():\n    pass"), ContentType::Code);
        assert_eq!(classify("<div>hello</div>"), ContentType::Code);
        assert_eq!(classify("import os"), ContentType::Code);
    }

    #[test]
    fn prose_is_text() {
        assert_eq!(
            classify("Meet me at the usual place at noon."),
            ContentType::Text
        );
        assert_eq!(classify("hello world"), ContentType::Text);
    }

    proptest! {
        // prose with spaces and no hint words never classifies as password
        #[test]
        fn spaced_prose_never_password(words in proptest::collection::vec("[a-z]{2,8}", 2..8)) {
            let content = words.join(" ");
            prop_assume!(!PASSWORD_HINTS.iter().any(|h| content.contains(h)));
            prop_assert_ne!(classify(&content), ContentType::Password);
        }
    }
}
