//! Query filter facets

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A single filter facet; facets in a [`FilterSet`] are combined with AND
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Filter {
    Installed,
    NotInstalled,
    Development,
    NotDevelopment,
    Gui,
    NotGui,
}

impl Filter {
    /// Parse a single facet token (`installed`, `~devel`, ...)
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "installed" => Some(Self::Installed),
            "~installed" => Some(Self::NotInstalled),
            "devel" => Some(Self::Development),
            "~devel" => Some(Self::NotDevelopment),
            "gui" => Some(Self::Gui),
            "~gui" => Some(Self::NotGui),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Installed => "installed",
            Self::NotInstalled => "~installed",
            Self::Development => "devel",
            Self::NotDevelopment => "~devel",
            Self::Gui => "gui",
            Self::NotGui => "~gui",
        }
    }

    fn accepts(self, facets: &PackageFacets) -> bool {
        match self {
            Self::Installed => facets.installed,
            Self::NotInstalled => !facets.installed,
            Self::Development => facets.development,
            Self::NotDevelopment => !facets.development,
            Self::Gui => facets.gui,
            Self::NotGui => !facets.gui,
        }
    }
}

/// The facts a filter is evaluated against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageFacets {
    #[serde(default)]
    pub installed: bool,
    #[serde(default)]
    pub development: bool,
    #[serde(default)]
    pub gui: bool,
}

/// A set of filter facets, all of which must hold
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet(BTreeSet<Filter>);

impl FilterSet {
    /// The empty set, which accepts everything
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Parse `;`-separated facet tokens. Unrecognized tokens (including
    /// `none`) are ignored rather than rejected.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self(text.split(';').filter_map(Filter::from_token).collect())
    }

    #[must_use]
    pub fn with(mut self, filter: Filter) -> Self {
        self.0.insert(filter);
        self
    }

    #[must_use]
    pub fn contains(&self, filter: Filter) -> bool {
        self.0.contains(&filter)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether a package with these facets passes every facet in the set
    #[must_use]
    pub fn matches(&self, facets: &PackageFacets) -> bool {
        self.0.iter().all(|f| f.accepts(facets))
    }

    pub fn iter(&self) -> impl Iterator<Item = Filter> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Filter> for FilterSet {
    fn from_iter<T: IntoIterator<Item = Filter>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("none");
        }
        let tokens: Vec<&str> = self.0.iter().map(|x| x.as_token()).collect();
        f.write_str(&tokens.join(";"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_unknown_facets() {
        let set = FilterSet::parse("installed;~devel;frobnicate;none");
        assert!(set.contains(Filter::Installed));
        assert!(set.contains(Filter::NotDevelopment));
        assert_eq!(set.iter().count(), 2);
        assert_eq!(set.to_string(), "installed;~devel");
    }

    #[test]
    fn test_matches_is_conjunction() {
        let set = FilterSet::none()
            .with(Filter::Installed)
            .with(Filter::Gui);
        let gui_installed = PackageFacets {
            installed: true,
            development: false,
            gui: true,
        };
        let cli_installed = PackageFacets {
            gui: false,
            ..gui_installed
        };
        assert!(set.matches(&gui_installed));
        assert!(!set.matches(&cli_installed));
        assert!(FilterSet::none().matches(&cli_installed));
    }

    #[test]
    fn test_contradictory_facets_match_nothing() {
        let set = FilterSet::parse("installed;~installed");
        assert!(!set.matches(&PackageFacets::default()));
        assert!(!set.matches(&PackageFacets {
            installed: true,
            ..PackageFacets::default()
        }));
    }
}
