/// Decides how far an Operation may fail over along the host list.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FailoverPolicy {
    /// Every host in the list can be tried, in order.
    #[default]
    AllHosts,
    /// The last host is never used as a retry target: a list of N >= 2 hosts
    /// makes at most N - 1 attempts. Kept for parity with older clients.
    LegacySkipLast,
}

impl FailoverPolicy {
    /// Host index to try after a qualifying failure on `cursor`, if any.
    pub(crate) fn next_host(self, cursor: usize, host_count: usize) -> Option<usize> {
        let limit = match self {
            Self::AllHosts => host_count,
            Self::LegacySkipLast => host_count.saturating_sub(1),
        };
        let next = cursor + 1;
        (next < limit).then_some(next)
    }
}

/// Configures transport-level client behavior.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClientOptions {
    /// Failover bound across the host list.
    pub failover: FailoverPolicy,
    /// Application id sent as `x-placekit-app-id` alongside the API key.
    pub app_id: Option<String>,
}
