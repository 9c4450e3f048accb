//! Gem platforms and host matching (`Gem::Platform.match`).

use serde::{Serialize, Serializer};
use std::fmt;

/// The platform a gem specification was built for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Platform {
    /// Pure Ruby gem, installable everywhere
    #[default]
    Ruby,
    /// Binary gem for a specific platform such as `x86_64-linux` or `java`
    Native {
        /// CPU architecture, `None` for cpu-less platforms like `java`
        cpu: Option<String>,
        /// Operating system name
        os: String,
        /// Optional OS version or ABI, e.g. `gnu` or `musl`
        version: Option<String>,
    },
}

impl Platform {
    /// Parses a platform string as found in gemspecs and lockfiles.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed {
            "" | "ruby" => return Self::Ruby,
            "java" | "jruby" => {
                return Self::Native {
                    cpu: None,
                    os: "java".to_string(),
                    version: None,
                };
            }
            _ => {}
        }

        let parts: Vec<&str> = trimmed.split('-').collect();
        match parts.as_slice() {
            [os] => Self::Native {
                cpu: None,
                os: (*os).to_string(),
                version: None,
            },
            [cpu, os, rest @ ..] => Self::Native {
                cpu: Some(normalize_cpu(cpu)),
                os: (*os).to_string(),
                version: if rest.is_empty() {
                    None
                } else {
                    Some(rest.join("-"))
                },
            },
            [] => Self::Ruby,
        }
    }

    /// The platform of the running host, in RubyGems naming.
    pub fn local() -> Self {
        let cpu = match (std::env::consts::ARCH, std::env::consts::OS) {
            ("aarch64", "macos") => "arm64",
            ("aarch64", _) => "aarch64",
            ("x86_64", "windows") => "x64",
            ("x86", _) => "x86",
            (arch, _) => arch,
        };
        let os = match std::env::consts::OS {
            "macos" => "darwin",
            "windows" => "mingw32",
            other => other,
        };
        Self::Native {
            cpu: Some(cpu.to_string()),
            os: os.to_string(),
            version: None,
        }
    }

    /// Whether a gem built for `self` can be installed on `host`.
    ///
    /// `ruby` gems match every host. Otherwise the cpu must be equal (or either side
    /// `universal`/unspecified), the os must be equal, and if both sides carry an os
    /// version outside Linux those must be equal too.
    pub fn matches(&self, host: &Self) -> bool {
        let (
            Self::Native {
                cpu,
                os,
                version,
            },
            Self::Native {
                cpu: host_cpu,
                os: host_os,
                version: host_version,
            },
        ) = (self, host)
        else {
            return matches!(self, Self::Ruby);
        };

        let cpu_ok = match (cpu.as_deref(), host_cpu.as_deref()) {
            (None, _) | (_, None) | (Some("universal"), _) | (_, Some("universal")) => true,
            (Some(a), Some(b)) => a == b,
        };
        if !cpu_ok || os != host_os {
            return false;
        }
        if os == "linux" {
            return true;
        }
        match (version, host_version) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }

    /// Whether a gem built for `self` can be installed on this host.
    pub fn matches_local(&self) -> bool {
        self.matches(&Self::local())
    }
}

fn normalize_cpu(cpu: &str) -> String {
    match cpu {
        "i386" | "i486" | "i586" | "i686" => "x86".to_string(),
        "amd64" => "x86_64".to_string(),
        other => other.to_string(),
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ruby => f.write_str("ruby"),
            Self::Native {
                cpu,
                os,
                version,
            } => {
                if let Some(cpu) = cpu {
                    write!(f, "{cpu}-")?;
                }
                f.write_str(os)?;
                if let Some(version) = version {
                    write!(f, "-{version}")?;
                }
                Ok(())
            }
        }
    }
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        assert_eq!(Platform::parse("ruby"), Platform::Ruby);
        assert_eq!(Platform::parse("x86_64-linux").to_string(), "x86_64-linux");
        assert_eq!(Platform::parse("x86_64-linux-musl").to_string(), "x86_64-linux-musl");
        assert_eq!(Platform::parse("i686-linux").to_string(), "x86-linux");
        assert_eq!(Platform::parse("java").to_string(), "java");
    }

    #[test]
    fn test_ruby_matches_everything() {
        assert!(Platform::Ruby.matches(&Platform::parse("x86_64-linux")));
        assert!(Platform::Ruby.matches_local());
    }

    #[test]
    fn test_native_matching() {
        let host = Platform::parse("x86_64-linux");
        assert!(Platform::parse("x86_64-linux").matches(&host));
        assert!(Platform::parse("x86_64-linux-gnu").matches(&host));
        assert!(Platform::parse("universal-linux").matches(&host));
        assert!(!Platform::parse("arm64-darwin").matches(&host));
        assert!(!Platform::parse("java").matches(&host));

        let mac = Platform::parse("universal-darwin-19");
        assert!(!mac.matches(&Platform::parse("x86_64-darwin-20")));
        assert!(mac.matches(&Platform::parse("x86_64-darwin")));
    }
}
