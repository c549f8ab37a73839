//! Which config types an operation applies to.

/// Selection of config types for `load` and `merge`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeSelection {
    /// Every registered type, in registration order.
    #[default]
    All,
    /// The named types, in the given order.
    Names(Vec<String>),
}

impl TypeSelection {
    /// Expand the selection against the registered names.
    pub(crate) fn expand(&self, registered: &[String]) -> Vec<String> {
        match self {
            Self::All => registered.to_vec(),
            Self::Names(names) => names.clone(),
        }
    }
}

impl From<&str> for TypeSelection {
    fn from(name: &str) -> Self {
        if name == "*" {
            Self::All
        } else {
            Self::Names(vec![name.to_string()])
        }
    }
}

impl From<String> for TypeSelection {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<&[&str]> for TypeSelection {
    fn from(names: &[&str]) -> Self {
        Self::Names(names.iter().map(|name| name.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for TypeSelection {
    fn from(names: [&str; N]) -> Self {
        Self::from(&names[..])
    }
}

impl From<Vec<String>> for TypeSelection {
    fn from(names: Vec<String>) -> Self {
        Self::Names(names)
    }
}

impl From<Vec<&str>> for TypeSelection {
    fn from(names: Vec<&str>) -> Self {
        Self::from(names.as_slice())
    }
}

impl<T: Into<TypeSelection>> From<Option<T>> for TypeSelection {
    fn from(selection: Option<T>) -> Self {
        selection.map(Into::into).unwrap_or_default()
    }
}
