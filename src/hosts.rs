use reqwest::Url;

use crate::{PlaceKitError, Result};

/// Production API endpoint.
pub const DEFAULT_HOST: &str = "https://api.placekit.co";

/// Ordered cascade of base URLs; index 0 is tried first.
///
/// Never empty, and immutable once built, so it can be shared freely between
/// concurrent Operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostList {
    hosts: Vec<Url>,
}

impl HostList {
    /// Parses a prioritized list of base URLs.
    ///
    /// Base paths are kept: `https://host/v1` resolves `search` to
    /// `https://host/v1/search`.
    pub fn new<I, S>(hosts: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hosts = hosts
            .into_iter()
            .map(|host| parse_base(host.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        if hosts.is_empty() {
            return Err(PlaceKitError::invalid("host list must not be empty"));
        }
        Ok(Self { hosts })
    }

    /// The single production endpoint.
    pub fn production() -> Result<Self> {
        Self::new([DEFAULT_HOST])
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Url> {
        self.hosts.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Url> {
        self.hosts.iter()
    }

    /// Joins `hosts[cursor]` with `resource`, ignoring leading slashes and
    /// surrounding whitespace of the resource.
    pub fn resolve(&self, cursor: usize, resource: &str) -> Result<Url> {
        let base = self.hosts.get(cursor).ok_or_else(|| {
            PlaceKitError::invalid(format!(
                "host index {cursor} out of range for {} host(s)",
                self.hosts.len()
            ))
        })?;
        let resource = normalize_resource(resource);
        base.join(resource).map_err(|err| {
            PlaceKitError::invalid(format!("invalid resource path '{resource}': {err}"))
        })
    }
}

pub(crate) fn normalize_resource(resource: &str) -> &str {
    resource.trim().trim_start_matches('/')
}

fn parse_base(host: &str) -> Result<Url> {
    let trimmed = host.trim();
    let mut url = Url::parse(trimmed)
        .map_err(|err| PlaceKitError::invalid(format!("invalid host URL '{trimmed}': {err}")))?;
    if url.cannot_be_a_base() {
        return Err(PlaceKitError::invalid(format!(
            "host URL '{trimmed}' cannot be used as a base"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::HostList;
    use crate::PlaceKitError;

    #[test]
    fn resolve_strips_leading_slashes() {
        let hosts = HostList::production().expect("production host parses");
        let url = hosts.resolve(0, "  //search ").expect("must resolve");
        assert_eq!(url.as_str(), "https://api.placekit.co/search");
    }

    #[test]
    fn resolve_keeps_base_path_prefix() {
        let hosts = HostList::new(["http://127.0.0.1:8080/v1", "http://backup.local/api/"])
            .expect("hosts parse");
        assert_eq!(
            hosts.resolve(0, "patch/abc").expect("resolves").as_str(),
            "http://127.0.0.1:8080/v1/patch/abc"
        );
        assert_eq!(
            hosts.resolve(1, "/keys").expect("resolves").as_str(),
            "http://backup.local/api/keys"
        );
    }

    #[test]
    fn order_is_preserved() {
        let hosts = HostList::new(["https://a.example", "https://b.example"]).expect("parse");
        let names: Vec<_> = hosts.iter().filter_map(|url| url.host_str()).collect();
        assert_eq!(names, ["a.example", "b.example"]);
    }

    #[test]
    fn empty_and_malformed_lists_are_rejected() {
        assert!(matches!(
            HostList::new(Vec::<String>::new()),
            Err(PlaceKitError::InvalidArgument(_))
        ));
        assert!(matches!(
            HostList::new(["not a url"]),
            Err(PlaceKitError::InvalidArgument(_))
        ));
    }

    #[test]
    fn out_of_range_cursor_is_an_error() {
        let hosts = HostList::production().expect("parse");
        assert!(hosts.resolve(1, "search").is_err());
    }
}
