use serde::Deserialize;

// ============================================================================
// Raw Item Definition (direct from TOML)
// ============================================================================

/// Only the keys the server uses; descriptive keys are left to the client UI
#[derive(Debug, Clone, Deserialize)]
pub struct RawItemDefinition {
    pub display_name: Option<String>,
    pub max_stack: Option<i32>,
    /// Unique items never stack
    #[serde(default)]
    pub unique: bool,
}

// ============================================================================
// Resolved Item Definition
// ============================================================================

#[derive(Debug, Clone)]
pub struct ItemDefinition {
    pub display_name: String,
    pub max_stack: i32,
}

impl ItemDefinition {
    pub fn from_raw(id: &str, raw: &RawItemDefinition) -> Self {
        let max_stack = if raw.unique {
            1
        } else {
            raw.max_stack.unwrap_or(DEFAULT_MAX_STACK).max(1)
        };

        Self {
            display_name: raw.display_name.clone().unwrap_or_else(|| id.to_string()),
            max_stack,
        }
    }
}

/// Stack size for items without an explicit limit
pub const DEFAULT_MAX_STACK: i32 = 50;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let raw: RawItemDefinition = toml::from_str("").unwrap();
        let item = ItemDefinition::from_raw("statue", &raw);
        assert_eq!(item.display_name, "statue");
        assert_eq!(item.max_stack, DEFAULT_MAX_STACK);
    }

    #[test]
    fn test_unique_items_do_not_stack() {
        let raw: RawItemDefinition = toml::from_str("unique = true\nmax_stack = 10").unwrap();
        assert_eq!(ItemDefinition::from_raw("idol", &raw).max_stack, 1);
    }

    #[test]
    fn test_descriptive_keys_are_ignored() {
        let raw: RawItemDefinition =
            toml::from_str("display_name = \"Statue\"\ndescription = \"Eine Statue\"\nimage = \"statue.png\"").unwrap();
        assert_eq!(ItemDefinition::from_raw("statue", &raw).display_name, "Statue");
    }
}
