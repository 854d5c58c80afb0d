use chrono::NaiveDate;
use tracing::debug;

use crate::core::models::key::{Key, KeyType, KeyValidity};

/// Parses `gpg --list-keys --with-colons` output into primary keys.
///
/// Only `pub`, `fpr` and `uid` records are read. The first `fpr` and `uid`
/// after a `pub` belong to the primary key; subkey fingerprints are ignored.
pub fn parse_keys(output: &str) -> Vec<Key> {
    let mut keys = Vec::new();
    let mut current: Option<KeyBuilder> = None;
    let mut in_subkey = false;

    for line in output.lines() {
        let fields: Vec<&str> = line.split(':').collect();

        match fields[0] {
            "pub" => {
                if let Some(builder) = current.take() {
                    push_built(&mut keys, builder);
                }
                current = Some(KeyBuilder::from_pub_fields(&fields));
                in_subkey = false;
            }
            "sub" => in_subkey = true,
            "fpr" if !in_subkey => {
                if let Some(builder) = current.as_mut()
                    && builder.fingerprint.is_none()
                    && fields.len() > 9
                {
                    builder.fingerprint = Some(fields[9].to_string());
                }
            }
            "uid" => {
                if let Some(builder) = current.as_mut()
                    && builder.uid.is_none()
                    && fields.len() > 9
                {
                    builder.uid = Some(fields[9].to_string());
                }
            }
            "" | "fpr" | "grp" | "uat" | "rev" | "tru" | "sig" => {}
            other => debug!(record_type = other, "skipping unknown GPG record type"),
        }
    }

    if let Some(builder) = current {
        push_built(&mut keys, builder);
    }

    keys
}

/// Every fingerprint in `--with-colons` output, subkeys included.
///
/// `gpg --export <id>` also selects a key by a subkey ID, so presence
/// checks have to match subkey fingerprints too.
pub fn parse_fingerprints(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(':').collect();
            (fields[0] == "fpr" && fields.len() > 9 && !fields[9].is_empty())
                .then(|| fields[9].to_string())
        })
        .collect()
}

fn push_built(keys: &mut Vec<Key>, builder: KeyBuilder) {
    match builder.build() {
        Some(key) => keys.push(key),
        None => debug!("skipping key: missing fingerprint or key type"),
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    s.parse::<i64>()
        .ok()
        .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.date_naive())
}

fn parse_algorithm(code: &str) -> String {
    match code {
        "1" | "2" | "3" => "RSA".to_string(),
        "16" | "20" => "Elgamal".to_string(),
        "17" => "DSA".to_string(),
        "18" => "ECDH".to_string(),
        "19" => "ECDSA".to_string(),
        "22" => "EdDSA".to_string(),
        _ => format!("ALG{code}"),
    }
}

#[derive(Default)]
struct KeyBuilder {
    fingerprint: Option<String>,
    uid: Option<String>,
    created: Option<NaiveDate>,
    expires: Option<NaiveDate>,
    validity: KeyValidity,
    key_type: Option<KeyType>,
}

impl KeyBuilder {
    fn from_pub_fields(fields: &[&str]) -> Self {
        let mut builder = Self::default();

        if let Some(c) = fields.get(1).and_then(|s| s.chars().next()) {
            builder.validity = KeyValidity::from_gpg_char(c);
        }

        if fields.len() > 3 {
            builder.key_type = Some(KeyType {
                algorithm: parse_algorithm(fields[3]),
                bits: fields[2].parse().unwrap_or(0),
            });
        }

        builder.created = fields.get(5).and_then(|s| parse_timestamp(s));
        builder.expires = fields.get(6).and_then(|s| parse_timestamp(s));

        builder
    }

    fn build(self) -> Option<Key> {
        Some(Key {
            fingerprint: self.fingerprint?,
            uid: self.uid.unwrap_or_default(),
            created: self.created,
            expires: self.expires,
            validity: self.validity,
            key_type: self.key_type?,
        })
    }
}
