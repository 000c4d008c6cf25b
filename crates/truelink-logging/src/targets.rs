pub const T_NL80211: &str = "truelink::nl80211";
