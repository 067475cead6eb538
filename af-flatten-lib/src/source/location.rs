use camino::Utf8PathBuf;
use core::fmt::{Display, Formatter};
use core::str::FromStr;
use ohno::IntoAppError;
use url::Url;

const FILE_SCHEME: &str = "file://";

/// Where an AF export is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    /// Fetched over HTTP(S).
    Url(Url),

    /// Read from the local filesystem.
    Path(Utf8PathBuf),
}

impl SourceLocation {
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Url(_))
    }
}

impl FromStr for SourceLocation {
    type Err = ohno::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            ohno::bail!("source location is empty");
        }

        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(s).into_app_err_with(|| format!("invalid source URL '{s}'"))?;
            return Ok(Self::Url(url));
        }

        if lower.starts_with(FILE_SCHEME) {
            let path = s.get(FILE_SCHEME.len()..).unwrap_or_default();
            return Ok(Self::Path(Utf8PathBuf::from(path)));
        }

        Ok(Self::Path(Utf8PathBuf::from(s)))
    }
}

impl Display for SourceLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::Path(path) => write!(f, "{path}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        let location: SourceLocation = "https://example.com/af_model.xml".parse().unwrap();
        assert!(location.is_remote());
        assert_eq!(location.to_string(), "https://example.com/af_model.xml");
    }

    #[test]
    fn test_parse_path() {
        let location: SourceLocation = "exports/af_model.xml".parse().unwrap();
        assert_eq!(location, SourceLocation::Path(Utf8PathBuf::from("exports/af_model.xml")));
    }

    #[test]
    fn test_parse_file_scheme() {
        let location: SourceLocation = "file:///tmp/af.xml".parse().unwrap();
        assert_eq!(location, SourceLocation::Path(Utf8PathBuf::from("/tmp/af.xml")));
    }

    #[test]
    fn test_parse_invalid_url() {
        let _ = "http://".parse::<SourceLocation>().unwrap_err();
    }

    #[test]
    fn test_parse_empty() {
        let _ = "  ".parse::<SourceLocation>().unwrap_err();
    }
}
