//! Keyword-based category suggestion.
//!
//! Used both while the user types a description and when a receipt is
//! scanned, so the two always agree.

use crate::models::expense::Category;

/// Trigger substrings for each classifiable category, in evaluation order.
///
/// Earlier entries win ties.
pub const CATEGORY_KEYWORDS: [(Category, &[&str]); 7] = [
    (
        Category::Food,
        &[
            "food", "lunch", "dinner", "breakfast", "snack", "restaurant", "meal", "eat",
            "coffee", "tea", "drink", "grocery", "groceries", "vegetables", "fruits", "meat",
            "chicken", "fish", "sweets", "dessert", "pizza", "burger", "biryani", "dosa",
            "idli", "paratha", "roti", "rice", "dal", "curry", "sweet", "samosa", "pakora",
            "chai", "juice", "milk", "bread", "egg", "paneer", "mutton", "veg", "bakery",
            "cake", "ice cream", "chocolate",
        ],
    ),
    (
        Category::Transport,
        &[
            "transport", "taxi", "uber", "ola", "auto", "bus", "train", "metro", "flight",
            "cab", "rickshaw", "petrol", "diesel", "fuel", "parking", "toll", "car", "bike",
            "scooter", "vehicle", "rapido", "ride", "travel", "commute", "fare", "gas",
            "railway", "airport", "station",
        ],
    ),
    (
        Category::Shopping,
        &[
            "shopping", "clothes", "shirt", "shoes", "pants", "dress", "jeans", "electronics",
            "phone", "laptop", "watch", "bag", "accessories", "jewelry", "cosmetics", "makeup",
            "beauty", "gift", "amazon", "flipkart", "online", "purchase", "buy", "bought",
            "store", "mall", "market", "footwear", "sandals", "sneakers", "t-shirt", "saree",
            "kurta", "sunglasses", "perfume", "wallet", "belt",
        ],
    ),
    (
        Category::Entertainment,
        &[
            "entertainment", "movie", "cinema", "theatre", "concert", "show", "game", "gaming",
            "netflix", "spotify", "prime", "subscription", "party", "club", "bar", "pub",
            "outing", "trip", "vacation", "holiday", "fun", "amusement", "park", "zoo",
            "museum", "sports", "cricket", "football", "tickets", "event",
        ],
    ),
    (
        Category::Bills,
        &[
            "bill", "electricity", "water", "gas", "internet", "wifi", "mobile", "phone bill",
            "recharge", "rent", "maintenance", "utility", "utilities", "broadband", "postpaid",
            "prepaid", "emi", "insurance", "premium", "subscription", "credit card", "payment",
        ],
    ),
    (
        Category::Health,
        &[
            "health", "medical", "doctor", "hospital", "medicine", "pharmacy", "clinic",
            "dentist", "checkup", "consultation", "treatment", "surgery", "test", "lab", "xray",
            "scan", "prescription", "drug", "tablet", "injection", "vaccine", "therapy", "gym",
            "fitness", "yoga", "exercise", "wellness",
        ],
    ),
    (
        Category::Education,
        &[
            "education", "school", "college", "university", "course", "class", "tuition", "book",
            "books", "notebook", "stationery", "pen", "pencil", "study", "exam", "fee", "fees",
            "training", "workshop", "seminar", "certification", "learning", "tutorial",
            "online course",
        ],
    ),
];

fn count_hits(keywords: &[&str], lowered: &str) -> usize {
    keywords.iter().filter(|k| lowered.contains(*k)).count()
}

/// Count how many of `category`'s keywords occur in already-lowercased text.
pub fn keyword_hits(category: Category, lowered: &str) -> usize {
    CATEGORY_KEYWORDS
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, keywords)| count_hits(keywords, lowered))
        .unwrap_or(0)
}

/// Suggest the best-matching category for free-form text.
///
/// Matching is plain substring containment, so "ola" also fires inside
/// "chocolate". Returns `None` for empty text or when nothing matches.
pub fn classify(text: &str) -> Option<Category> {
    let lowered = text.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }

    let mut best = None;
    let mut best_hits = 0;

    for (category, keywords) in CATEGORY_KEYWORDS.iter() {
        let hits = count_hits(keywords, &lowered);
        if hits > best_hits {
            best_hits = hits;
            best = Some(*category);
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_keyword_table_is_lowercase_and_non_empty() {
        for (category, keywords) in CATEGORY_KEYWORDS.iter() {
            assert!(!keywords.is_empty(), "{} has no keywords", category);
            for keyword in keywords.iter() {
                assert!(!keyword.is_empty());
                assert_eq!(*keyword, keyword.to_lowercase().as_str());
            }
        }
        assert!(CATEGORY_KEYWORDS.iter().all(|(c, _)| *c != Category::Other));
    }

    #[test]
    fn test_empty_input_has_no_match() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("   \n\t"), None);
        assert_eq!(classify("xyz 123 qqq"), None);
    }

    #[test]
    fn test_single_category() {
        assert_eq!(classify("Dentist appointment"), Some(Category::Health));
        assert_eq!(classify("UNIVERSITY"), Some(Category::Education));
        assert_eq!(classify("Netflix"), Some(Category::Entertainment));
    }

    #[test]
    fn test_substring_inside_longer_word_counts() {
        // "zoo" inside "zookeeper"
        assert_eq!(classify("zookeeper"), Some(Category::Entertainment));
    }

    #[test]
    fn test_higher_count_wins() {
        // Food: lunch, pizza. Transport: taxi.
        assert_eq!(classify("taxi to lunch, pizza"), Some(Category::Food));
        // Food: tea. Transport: uber, cab.
        assert_eq!(classify("uber cab, tea"), Some(Category::Transport));
    }

    #[test]
    fn test_tie_goes_to_first_enumerated() {
        // Transport: "gas" also hits Bills: "gas"; Transport comes first.
        assert_eq!(classify("gas"), Some(Category::Transport));
        // Entertainment: "subscription", Bills: "subscription".
        assert_eq!(classify("subscription"), Some(Category::Entertainment));
    }

    #[test]
    fn test_deterministic() {
        let text = "Grand Bazaar Mall - shirt, shoes, coffee";
        let first = classify(text);
        for _ in 0..10 {
            assert_eq!(classify(text), first);
        }
        assert_eq!(first, Some(Category::Shopping));
    }

    #[test]
    fn test_keyword_hits() {
        assert_eq!(keyword_hits(Category::Food, "pizza and coffee"), 2);
        assert_eq!(keyword_hits(Category::Other, "pizza"), 0);
    }
}
