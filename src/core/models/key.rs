use chrono::NaiveDate;

/// A public key as listed from a keyring store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub fingerprint: String,
    pub uid: String,
    pub created: Option<NaiveDate>,
    pub expires: Option<NaiveDate>,
    pub validity: KeyValidity,
    pub key_type: KeyType,
}

/// Public key algorithm and size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyType {
    pub algorithm: String,
    pub bits: u32,
}

impl std::fmt::Display for KeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.algorithm.to_lowercase(), self.bits)
    }
}

/// Validity field of `--with-colons` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyValidity {
    #[default]
    Unknown,
    Undefined,
    Never,
    Marginal,
    Full,
    Ultimate,
    Expired,
    Revoked,
}

impl KeyValidity {
    pub fn from_gpg_char(c: char) -> Self {
        match c {
            'q' => Self::Undefined,
            'n' => Self::Never,
            'm' => Self::Marginal,
            'f' => Self::Full,
            'u' => Self::Ultimate,
            'e' => Self::Expired,
            'r' => Self::Revoked,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for KeyValidity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Undefined => "undefined",
            Self::Never => "never",
            Self::Marginal => "marginal",
            Self::Full => "full",
            Self::Ultimate => "ultimate",
            Self::Expired => "expired",
            Self::Revoked => "revoked",
        };
        f.write_str(s)
    }
}
