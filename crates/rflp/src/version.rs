use std::fmt;
use std::str::FromStr;

use rflp_event::TextEncoding;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Version of the program that saved a file, as stored in its version
/// event: `major.minor.patch` with an optional build number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
    pub build: Option<u32>,
}

impl FlVersion {
    /// First version that stores strings as UTF-16.
    pub const UNICODE: FlVersion = FlVersion::new(11, 5, 0);

    pub const fn new(major: u8, minor: u8, patch: u8) -> FlVersion {
        FlVersion {
            major,
            minor,
            patch,
            build: None,
        }
    }

    pub const fn with_build(mut self, build: u32) -> FlVersion {
        self.build = Some(build);
        self
    }

    /// Compares `major.minor.patch`, ignoring the build number.
    pub fn at_least(&self, major: u8, minor: u8, patch: u8) -> bool {
        (self.major, self.minor, self.patch) >= (major, minor, patch)
    }

    pub fn text_encoding(&self) -> TextEncoding {
        if self.at_least(11, 5, 0) {
            TextEncoding::Utf16Le
        } else {
            TextEncoding::Ascii
        }
    }
}

impl FromStr for FlVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<FlVersion> {
        let invalid = || Error::InvalidVersion(s.to_owned());

        let mut parts = s.trim_end_matches('\0').split('.');
        let mut next = || parts.next().map(str::trim);

        let major = next().ok_or_else(invalid)?.parse().map_err(|_| invalid())?;
        let minor = next().ok_or_else(invalid)?.parse().map_err(|_| invalid())?;
        let patch = match next() {
            Some(patch) => patch.parse().map_err(|_| invalid())?,
            None => 0,
        };
        let build = match next() {
            Some(build) => Some(build.parse().map_err(|_| invalid())?),
            None => None,
        };

        if next().is_some() {
            return Err(invalid());
        }

        Ok(FlVersion {
            major,
            minor,
            patch,
            build,
        })
    }
}

impl fmt::Display for FlVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(build) = self.build {
            write!(f, ".{build}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() -> Result<()> {
        let version: FlVersion = "20.8.4.2576".parse()?;
        assert_eq!(version, FlVersion::new(20, 8, 4).with_build(2576));
        assert_eq!(version.to_string(), "20.8.4.2576");

        let version: FlVersion = "9.1".parse()?;
        assert_eq!(version, FlVersion::new(9, 1, 0));
        assert_eq!(version.to_string(), "9.1.0");

        assert!(matches!("abc".parse::<FlVersion>(), Err(Error::InvalidVersion(_))));
        assert!("1.2.3.4.5".parse::<FlVersion>().is_err());

        Ok(())
    }

    #[test]
    fn text_encoding_switch() {
        assert_eq!(FlVersion::new(11, 4, 9).text_encoding(), TextEncoding::Ascii);
        assert_eq!(FlVersion::new(11, 5, 0).text_encoding(), TextEncoding::Utf16Le);
        assert_eq!(
            FlVersion::new(20, 0, 0).with_build(1).text_encoding(),
            TextEncoding::Utf16Le
        );
        assert!(FlVersion::new(12, 0, 0) > FlVersion::UNICODE);
    }
}
