use std::collections::HashSet;

/// Roles granted to the caller by the access-control layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roles(HashSet<String>);

impl Roles {
    /// Caller without any role
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Parse a comma separated role list, ignoring blanks
    pub fn from_csv(value: &str) -> Self {
        value
            .split(',')
            .map(str::trim)
            .filter(|role| !role.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn contains(&self, role: &str) -> bool {
        self.0.contains(role)
    }

    /// A collection is visible when public or when its name is one of the roles
    pub fn can_see(&self, collection: &str, is_public: bool) -> bool {
        is_public || self.contains(collection)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for Roles {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
