//! Sort parameter convention shared by both backends.

/// Prefix for a sort order: `asc` → `+`, `desc` → `-`, anything else → none.
pub fn sort_prefix(order: &str) -> &'static str {
    match order.to_lowercase().as_str() {
        "asc" => "+",
        "desc" => "-",
        _ => "",
    }
}

/// `sort` query value for a field, e.g. `-createdAt`.
pub fn sort_param(order: Option<&str>, field: &str) -> String {
    format!("{}{}", sort_prefix(order.unwrap_or_default()), field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_prefix() {
        assert_eq!(sort_prefix("ASC"), "+");
        assert_eq!(sort_prefix("desc"), "-");
        assert_eq!(sort_prefix("none"), "");
        assert_eq!(sort_prefix(""), "");
    }

    #[test]
    fn test_sort_param() {
        assert_eq!(sort_param(Some("Desc"), "name"), "-name");
        assert_eq!(sort_param(None, "name"), "name");
    }
}
