use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Error};

/// Source license as understood by Etherscan-compatible explorers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum License {
    NoLicense,
    #[default]
    Mit,
    Gpl2,
    Gpl3,
    Lgpl21,
    Lgpl3,
    Bsd2Clause,
    Bsd3Clause,
    Mpl2,
    Unlicense,
}

impl License {
    pub const ALL: [License; 10] = [
        License::NoLicense,
        License::Mit,
        License::Gpl2,
        License::Gpl3,
        License::Lgpl21,
        License::Lgpl3,
        License::Bsd2Clause,
        License::Bsd3Clause,
        License::Mpl2,
        License::Unlicense,
    ];

    /// Numeric identifier sent as `licenseType`.
    pub fn id(self) -> u8 {
        match self {
            License::NoLicense => 1,
            License::Mit => 3,
            License::Gpl2 => 4,
            License::Gpl3 => 5,
            License::Lgpl21 => 6,
            License::Lgpl3 => 7,
            License::Bsd2Clause => 8,
            License::Bsd3Clause => 9,
            License::Mpl2 => 10,
            License::Unlicense => 11,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            License::NoLicense => "No License",
            License::Mit => "MIT",
            License::Gpl2 => "GPL-2.0",
            License::Gpl3 => "GPL-3.0",
            License::Lgpl21 => "LGPL-2.1",
            License::Lgpl3 => "LGPL-3.0",
            License::Bsd2Clause => "BSD-2-Clause",
            License::Bsd3Clause => "BSD-3-Clause",
            License::Mpl2 => "MPL-2.0",
            License::Unlicense => "Unlicense",
        }
    }
}

impl FromStr for License {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<u8>() {
            return License::ALL
                .into_iter()
                .find(|license| license.id() == id)
                .ok_or_else(|| anyhow!("Unknown license identifier: {}", id));
        }

        let normalized = s.replace(['_', ' '], "-");
        License::ALL
            .into_iter()
            .find(|license| {
                license.name().replace(' ', "-").eq_ignore_ascii_case(&normalized)
            })
            .ok_or_else(|| {
                let known: Vec<&str> = License::ALL.iter().map(|l| l.name()).collect();
                anyhow!("Unknown license: '{}'. Known licenses: {}", s, known.join(", "))
            })
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_license_ids() {
        assert_eq!(License::default(), License::Mit);
        assert_eq!(License::Mit.id(), 3);
        assert_eq!(License::NoLicense.id(), 1);
        assert_eq!(License::Unlicense.id(), 11);
    }

    #[test]
    fn test_parse_license() {
        assert_eq!("MIT".parse::<License>().unwrap(), License::Mit);
        assert_eq!("gpl-3.0".parse::<License>().unwrap(), License::Gpl3);
        assert_eq!("No License".parse::<License>().unwrap(), License::NoLicense);
        assert_eq!("bsd_3_clause".parse::<License>().unwrap(), License::Bsd3Clause);
        assert_eq!("10".parse::<License>().unwrap(), License::Mpl2);

        assert!("2".parse::<License>().is_err());
        assert!("Apache-2.0".parse::<License>().is_err());
    }
}
