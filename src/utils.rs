use alloy_primitives::U256;

pub const WEI_DECIMALS: u8 = 18;
pub const GWEI_DECIMALS: u8 = 9;

fn ten_pow(decimals: u8) -> U256 {
    U256::from(10u64).pow(U256::from(decimals))
}

// Converts an integer amount into its decimal representation with `decimals` places,
// trimming trailing zeros ("2000000000000000000" wei -> "2")
pub fn from_wei(value: U256, decimals: u8) -> String {
    let unit = ten_pow(decimals);
    let whole = value / unit;
    let frac = value % unit;
    if frac.is_zero() {
        return whole.to_string();
    }
    let frac = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

// Fixed-point rendering truncated to `places` digits
pub fn format_fixed(value: U256, decimals: u8, places: u8) -> String {
    let unit = ten_pow(decimals);
    let whole = value / unit;
    if places == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0>width$}", (value % unit).to_string(), width = decimals as usize);
    let places = (places as usize).min(frac.len());
    let mut digits = frac[..places].to_string();
    while digits.len() < places {
        digits.push('0');
    }
    format!("{}.{}", whole, digits)
}

pub fn format_ether(wei: U256) -> String {
    format_fixed(wei, WEI_DECIMALS, 6)
}

pub fn format_gwei(wei: U256) -> String {
    format_fixed(wei, GWEI_DECIMALS, 2)
}

pub fn format_hashrate(hashrate: u64) -> String {
    let h = hashrate as f64;
    if h > 1e12 {
        format!("{:.2} TH/s", h / 1e12)
    } else if h > 1e9 {
        format!("{:.2} GH/s", h / 1e9)
    } else if h > 1e6 {
        format!("{:.2} MH/s", h / 1e6)
    } else if h > 1e3 {
        format!("{:.2} KH/s", h / 1e3)
    } else {
        format!("{} H/s", hashrate)
    }
}

// Share of the gas limit consumed by a block, e.g. "25.00%"
pub fn gas_utilization(gas_used: u64, gas_limit: u64) -> String {
    if gas_limit == 0 {
        return "0.00%".to_string();
    }
    format!("{:.2}%", gas_used as f64 / gas_limit as f64 * 100.0)
}

// "0x1234...cdef"
pub fn shorten_hash(hash: &str) -> String {
    if hash.len() <= 10 {
        return hash.to_string();
    }
    format!("{}...{}", &hash[..6], &hash[hash.len() - 4..])
}

// Relative age of a block/transaction timestamp
pub fn format_age(timestamp: u64, now: u64) -> String {
    let secs = now.saturating_sub(timestamp);
    match secs {
        0..=59 => format!("{} secs ago", secs),
        60..=3599 => format!("{} mins ago", secs / 60),
        3600..=86_399 => format!("{} hours ago", secs / 3600),
        _ => format!("{} days ago", secs / 86_400),
    }
}

// Serializes wei amounts as decimal strings so arbitrary precision survives JSON
pub mod u256_decimal {
    use alloy_primitives::U256;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        U256::from_str_radix(&s, 10).map_err(D::Error::custom)
    }

    pub mod opt {
        use alloy_primitives::U256;
        use serde::{de::Error, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(value: &Option<U256>, serializer: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => serializer.serialize_str(&v.to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<U256>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|s| U256::from_str_radix(&s, 10).map_err(D::Error::custom))
                .transpose()
        }
    }
}
