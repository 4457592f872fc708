//! Category to sub-category cascade

use crate::models::Category;

/// Sub-category choices for `selected_category` and the reconciled selection.
///
/// Options are the matching category's list (empty when nothing matches).
/// `previous_sub_category` survives only if it is one of those options,
/// otherwise it becomes empty.
pub fn derive_sub_category_options(
    categories: &[Category],
    selected_category: &str,
    previous_sub_category: &str,
) -> (Vec<String>, String) {
    let options = categories
        .iter()
        .find(|c| c.id == selected_category)
        .map(|c| c.sub_categories.clone())
        .unwrap_or_default();

    let reconciled = if options.iter().any(|s| s == previous_sub_category) {
        previous_sub_category.to_string()
    } else {
        String::new()
    };

    (options, reconciled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxonomy() -> Vec<Category> {
        vec![
            Category::new("Food", &["Groceries", "Dining"]),
            Category::new("Rent", &["Mortgage"]),
        ]
    }

    #[test]
    fn test_keeps_valid_sub_category() {
        let (options, sub) = derive_sub_category_options(&taxonomy(), "Food", "Dining");
        assert_eq!(options, vec!["Groceries", "Dining"]);
        assert_eq!(sub, "Dining");
    }

    #[test]
    fn test_clears_drifted_sub_category() {
        let (options, sub) = derive_sub_category_options(&taxonomy(), "Food", "Mortgage");
        assert_eq!(options, vec!["Groceries", "Dining"]);
        assert_eq!(sub, "");
    }

    #[test]
    fn test_switching_category_resets_sub_category() {
        let (options, sub) = derive_sub_category_options(&taxonomy(), "Rent", "Dining");
        assert_eq!(options, vec!["Mortgage"]);
        assert_eq!(sub, "");
    }

    #[test]
    fn test_unknown_category_has_no_options() {
        let (options, sub) = derive_sub_category_options(&taxonomy(), "Travel", "Dining");
        assert!(options.is_empty());
        assert_eq!(sub, "");

        let (options, sub) = derive_sub_category_options(&[], "Food", "Dining");
        assert!(options.is_empty());
        assert_eq!(sub, "");
    }

    #[test]
    fn test_result_is_always_empty_or_an_option() {
        let categories = vec![
            Category::new("Food", &["Groceries", "Dining", ""]),
            Category::new("Rent", &["Mortgage"]),
            Category::new("Misc", &[]),
        ];
        let selections = ["Food", "Rent", "Misc", "Travel", ""];
        let subs = ["Groceries", "Dining", "Mortgage", "Other", ""];

        for taxonomy in [categories.clone(), categories[1..].to_vec(), vec![]] {
            for category in selections {
                for previous in subs {
                    let (options, sub) = derive_sub_category_options(&taxonomy, category, previous);
                    assert!(
                        sub.is_empty() || options.contains(&sub),
                        "{}/{} produced {:?} not in {:?}",
                        category,
                        previous,
                        sub,
                        options
                    );
                }
            }
        }
    }
}
