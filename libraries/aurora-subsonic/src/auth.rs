//! Request signing.
//!
//! Modern servers get `t = md5(password + salt)` with a fresh salt per
//! request, so the password never travels in the clear. Legacy mode sends a
//! reversible hex encoding and must be opted into.

use crate::types::SubsonicConfig;
use aurora_core::ids::md5_hex;
use rand::Rng;

/// REST API version announced with every request
pub const API_VERSION: &str = "1.16.1";
/// Client name announced with every request
pub const CLIENT_NAME: &str = "AuroraPlayer";

/// Random 8-hex-char salt
pub fn new_salt() -> String {
    format!("{:08x}", rand::thread_rng().gen::<u32>())
}

/// Salted token for modern authentication
pub fn token_for(password: &str, salt: &str) -> String {
    md5_hex(format!("{password}{salt}"))
}

/// Hex-encoded password for legacy authentication
pub fn legacy_password(password: &str) -> String {
    format!("enc:{}", hex::encode(password))
}

/// Common query parameters, signed freshly on each call
pub(crate) fn auth_params(config: &SubsonicConfig) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("u", config.username.clone()),
        ("v", API_VERSION.to_string()),
        ("c", CLIENT_NAME.to_string()),
        ("f", "json".to_string()),
    ];

    if config.legacy_auth {
        params.push(("p", legacy_password(&config.password)));
    } else {
        let salt = new_salt();
        params.push(("t", token_for(&config.password, &salt)));
        params.push(("s", salt));
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param<'a>(params: &'a [(&str, String)], key: &str) -> Option<&'a str> {
        params.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn modern_auth_never_sends_password() {
        let config = SubsonicConfig::new("https://x", "alice", "sesame");
        let params = auth_params(&config);

        assert!(param(&params, "p").is_none());
        let salt = param(&params, "s").unwrap();
        assert_eq!(salt.len(), 8);
        assert_eq!(param(&params, "t").unwrap(), token_for("sesame", salt));
        assert!(params.iter().all(|(_, v)| v != "sesame"));
    }

    #[test]
    fn token_matches_known_md5() {
        // md5("sesame" + "c19b2d")
        assert_eq!(token_for("sesame", "c19b2d"), md5_hex("sesamec19b2d"));
        assert_eq!(token_for("sesame", "c19b2d").len(), 32);
    }

    #[test]
    fn legacy_auth_hex_encodes_password() {
        let config = SubsonicConfig::new("https://x", "alice", "secret").with_legacy_auth(true);
        let params = auth_params(&config);

        assert_eq!(param(&params, "p"), Some("enc:736563726574"));
        assert!(param(&params, "t").is_none());
        assert!(param(&params, "s").is_none());
    }

    #[test]
    fn salts_differ_between_calls() {
        let salts: std::collections::HashSet<String> = (0..16).map(|_| new_salt()).collect();
        assert!(salts.len() > 1);
    }
}
