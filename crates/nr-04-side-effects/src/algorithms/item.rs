//! # Item Names as Paths

use crate::domain::SideEffectError;

/// Refuse names that cannot be a single path segment.
///
/// Everything else, separators included, is percent-encoded by the fetcher,
/// so `.` and `..` are the only names that would move off the prefix.
pub fn check_item_name(name: &str) -> Result<(), SideEffectError> {
    let bad = name.is_empty() || name == "." || name == ".." || name.chars().any(char::is_control);
    if bad {
        return Err(SideEffectError::InvalidItemName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_pass() {
        assert!(check_item_name("nyancat.gif").is_ok());
        assert!(check_item_name("tac-o_cat.v2.gif").is_ok());
        assert!(check_item_name("100% cat.gif").is_ok());
        assert!(check_item_name("a/b?c#d").is_ok());
    }

    #[test]
    fn test_path_tricks_refused() {
        for name in ["", ".", "..", "a\nb", "\u{7f}"] {
            assert!(check_item_name(name).is_err(), "{name}");
        }
    }
}
