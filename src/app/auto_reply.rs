use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyRule {
    pub keywords: Vec<String>,
    pub reply: String,
}

impl ReplyRule {
    pub fn new(keywords: &[&str], reply: &str) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            reply: reply.to_string(),
        }
    }

    // 反序列化來的關鍵字可能含大寫，比對時一律轉小寫
    fn matches(&self, lowered: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| lowered.contains(k.to_lowercase().as_str()))
    }
}

/// 關鍵字自動回覆：不分大小寫的子字串比對，第一條命中的規則勝出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoReplyClassifier {
    rules: Vec<ReplyRule>,
    fallback: String,
}

impl AutoReplyClassifier {
    pub fn new(rules: Vec<ReplyRule>, fallback: impl Into<String>) -> Self {
        Self {
            rules,
            fallback: fallback.into(),
        }
    }

    pub fn reply_for(&self, text: &str) -> &str {
        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.reply.as_str())
            .unwrap_or(self.fallback.as_str())
    }
}

impl Default for AutoReplyClassifier {
    fn default() -> Self {
        Self::new(
            vec![
                ReplyRule::new(
                    &["hello", "hi", "hey"],
                    "Hello! 👋 Thanks for reaching out. How can I help you today?",
                ),
                ReplyRule::new(
                    &["price", "cost"],
                    "Thanks for your interest! Please visit our website for pricing details.",
                ),
                ReplyRule::new(
                    &["help", "support"],
                    "Our support team is here to help! Please describe your issue.",
                ),
                ReplyRule::new(
                    &["order", "delivery"],
                    "For order inquiries, please share your order number.",
                ),
                ReplyRule::new(
                    &["bulk", "mass"],
                    "We offer bulk messaging services! Contact us for pricing and features.",
                ),
            ],
            "Thank you for your message! We've received it and will get back to you soon. 😊",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let classifier = AutoReplyClassifier::default();

        assert!(classifier.reply_for("HELLO there").starts_with("Hello!"));
        assert!(classifier
            .reply_for("Can I get a price list?")
            .contains("pricing details"));
        assert!(classifier.reply_for("I need support").contains("support team"));
        assert!(classifier.reply_for("Where is my order").contains("order number"));
        assert!(classifier.reply_for("bulk messaging").contains("bulk messaging services"));
        assert!(classifier.reply_for("zzz").starts_with("Thank you for your message!"));
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let classifier = AutoReplyClassifier::default();
        // 同時含 hello 與 price，取第一條
        assert!(classifier.reply_for("hello, what's the cost?").starts_with("Hello!"));
    }

    #[test]
    fn test_deserialized_rules_match_case_insensitively() {
        let classifier: AutoReplyClassifier = serde_json::from_str(
            r#"{"rules":[{"keywords":["Price"],"reply":"see pricing"}],"fallback":"fallback"}"#,
        )
        .unwrap();

        assert_eq!(classifier.reply_for("what is the price?"), "see pricing");
        assert_eq!(classifier.reply_for("PRICE"), "see pricing");
        assert_eq!(classifier.reply_for("hello"), "fallback");
    }

    #[test]
    fn test_custom_rules() {
        let classifier = AutoReplyClassifier::new(
            vec![ReplyRule::new(&["STOP"], "You have been unsubscribed.")],
            "ok",
        );
        assert_eq!(classifier.reply_for("please stop"), "You have been unsubscribed.");
        assert_eq!(classifier.reply_for("continue"), "ok");
    }
}
