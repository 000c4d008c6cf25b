/// Tracing target for nl80211 query and decode events.
pub const T_NL80211: &str = "truelink::nl80211";
