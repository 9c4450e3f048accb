//! The dependency report handed to the package description writers.
//!
//! ```json
//! {
//!     "rubygems": {
//!         "build-dependencies": {
//!             "bundler": "= 2.4.10"
//!         },
//!         "runtime-dependencies": {
//!             "rake": "13.0.6"
//!         }
//!     }
//! }
//! ```

use crate::interceptor::InterceptedBuild;
use crate::resolver::SpecSet;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::collections::BTreeMap;

/// Build and runtime dependencies of one gem, keyed by gem name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DependencyReport {
    /// Gems installed by the build itself, with their requirements
    pub build_dependencies: BTreeMap<String, String>,
    /// Resolved runtime dependencies, with their exact versions
    pub runtime_dependencies: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct Envelope<'a> {
    rubygems: &'a DependencyReport,
}

impl DependencyReport {
    /// Combines what a build run installed with what resolution produced.
    ///
    /// The `target` gem itself is left out of the runtime dependencies. When a
    /// build installs the same gem twice, the later requirement is kept.
    pub fn from_build(intercepted: &InterceptedBuild, specs: &SpecSet, target: &str) -> Self {
        let build_dependencies = intercepted
            .dependencies
            .iter()
            .map(|dep| (dep.name.clone(), dep.effective_requirement().to_string()))
            .collect();
        let runtime_dependencies = specs
            .iter()
            .filter(|spec| spec.name != target)
            .map(|spec| (spec.name.clone(), spec.version.to_string()))
            .collect();
        Self {
            build_dependencies,
            runtime_dependencies,
        }
    }

    /// JSON with four-space indentation, under a top-level `rubygems` key.
    ///
    /// # Errors
    ///
    /// Fails only if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        let mut out = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
        Envelope {
            rubygems: self,
        }
        .serialize(&mut serializer)
        .context("Failed to serialize dependency report")?;
        String::from_utf8(out).context("Dependency report is not UTF-8")
    }

    /// YAML, under a top-level `rubygems` key.
    ///
    /// # Errors
    ///
    /// Fails only if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&Envelope {
            rubygems: self,
        })
        .context("Failed to serialize dependency report")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::DependencyDeclaration;
    use crate::resolver::{Platform, ResolvedSpecification, SpecSource};
    use crate::version::{GemVersion, Requirement};

    fn report() -> DependencyReport {
        let spec = |name: &str, version: &str| ResolvedSpecification {
            name: name.to_string(),
            version: GemVersion::parse(version).unwrap(),
            platform: Platform::Ruby,
            source: SpecSource::Path {
                path: "/src/foo".into(),
            },
            dependencies: Vec::new(),
        };
        let intercepted = InterceptedBuild {
            artifact: Some("foo.gemspec".into()),
            dependencies: vec![
                DependencyDeclaration::unversioned("bundler"),
                DependencyDeclaration {
                    name: "bundler".to_string(),
                    requirement: Some(Requirement::parse("2.4.10").unwrap()),
                },
            ],
        };
        let specs = SpecSet::new(vec![spec("foo", "1.2"), spec("rake", "13.0.6")]);
        DependencyReport::from_build(&intercepted, &specs, "foo")
    }

    #[test]
    fn test_from_build() {
        let report = report();
        assert_eq!(report.build_dependencies.get("bundler").map(String::as_str), Some("= 2.4.10"));
        assert_eq!(report.runtime_dependencies.len(), 1);
        assert_eq!(report.runtime_dependencies["rake"], "13.0.6");
    }

    #[test]
    fn test_json_layout() {
        let json = report().to_json_pretty().unwrap();
        assert_eq!(
            json,
            "{\n    \"rubygems\": {\n        \"build-dependencies\": {\n            \"bundler\": \"= 2.4.10\"\n        },\n        \"runtime-dependencies\": {\n            \"rake\": \"13.0.6\"\n        }\n    }\n}"
        );
    }

    #[test]
    fn test_yaml_layout() {
        let yaml = report().to_yaml().unwrap();
        assert!(yaml.starts_with("rubygems:\n  build-dependencies:\n"));
        assert!(yaml.contains("rake: 13.0.6"));
    }

    #[test]
    fn test_empty_report() {
        let json = DependencyReport::default().to_json_pretty().unwrap();
        assert!(json.contains("\"build-dependencies\": {}"));
    }
}
