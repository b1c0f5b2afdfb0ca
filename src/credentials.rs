use crate::error::{Error, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Token that precedes the credentials path on the command line, e.g.
/// `tweet-mood server:app keys.csv`.
pub const ARGS_MARKER: &str = "server:app";

const SEPARATOR: &str = ", ";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

// NB: never print the secrets, not even in debug logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &"<redacted>")
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Parse `consumer_key, consumer_secret, access_token, access_token_secret`.
    pub fn parse(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.trim().split(SEPARATOR).collect();
        match fields.as_slice() {
            [key, secret, token, token_secret, ..] => Ok(Self {
                consumer_key: key.to_string(),
                consumer_secret: secret.to_string(),
                access_token: token.to_string(),
                access_token_secret: token_secret.to_string(),
            }),
            _ => Err(Error::MalformedCredentials(fields.len())),
        }
    }

    /// Only the first line of the file is considered.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| Error::CredentialsIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(contents.lines().next().unwrap_or_default())
    }
}

/// Finds the credentials path among positional args: the one following [ARGS_MARKER], or
/// the first one when the marker is absent.
pub fn credentials_path(args: &[String]) -> Option<PathBuf> {
    match args.iter().position(|arg| arg == ARGS_MARKER) {
        Some(i) => args.get(i + 1).map(PathBuf::from),
        None => args.first().map(PathBuf::from),
    }
}
