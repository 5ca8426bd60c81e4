//! Mailbox addresses (RFC 5322 §3.4).

/// One mailbox taken from an address header such as `From:` or `To:`.
///
/// # Examples
/// - `"Juan García <juan@ejemplo.com>"` → `name = "Juan García"`, `email = "juan@ejemplo.com"`
/// - `"<user@example.com>"` → `name = ""`, `email = "user@example.com"`
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Address {
    /// Decoded display name. Empty when the mailbox has none.
    pub name: String,
    /// The address as written in the header (not decoded, not validated).
    pub email: String,
}

impl Address {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// The display name, or `None` if the mailbox has none.
    pub fn display_name(&self) -> Option<&str> {
        if self.name.is_empty() {
            None
        } else {
            Some(&self.name)
        }
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.display_name() {
            Some(name) => write!(f, "{name} <{}>", self.email),
            None => write!(f, "{}", self.email),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_name() {
        let addr = Address::new("Alice", "alice@example.com");
        assert_eq!(addr.to_string(), "Alice <alice@example.com>");
    }

    #[test]
    fn test_display_without_name() {
        let addr = Address::new("", "alice@example.com");
        assert_eq!(addr.display_name(), None);
        assert_eq!(addr.to_string(), "alice@example.com");
    }
}
