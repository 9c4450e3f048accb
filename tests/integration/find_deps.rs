//! End-to-end resolution of fixture source trees.

use rubygems_import::config::ImportConfig;
use rubygems_import::core::ImportError;
use rubygems_import::manifest::locate_gemspec;
use rubygems_import::report::DependencyReport;
use rubygems_import::resolver::{LocalResolver, ResolutionContext, SpecSet, SpecSource};
use rubygems_import::test_utils::{GemSourceFixture, init_test_logging};
use rubygems_import::interceptor::{BuildCommandInterceptor, CommandObserver};
use rubygems_import::validate::validate_spec;
use rubygems_import::version::GemVersion;
use std::path::Path;

fn resolve(name: &str, source: &Path) -> Result<SpecSet, ImportError> {
    let gemspec = locate_gemspec(name, source)?;
    let context = ResolutionContext::build(name, &gemspec, LocalResolver::new(), &ImportConfig::default())?;
    context.specs()
}

#[test]
fn test_single_gem_without_lock() {
    init_test_logging(None);
    let fixture = GemSourceFixture::new().unwrap();
    fixture.gemspec("foo", "1.2", &[]).unwrap();

    let mut interceptor = BuildCommandInterceptor::new();
    interceptor.observe("gem build foo.gemspec").unwrap();
    let build = interceptor.finish();
    assert_eq!(build.artifact.as_deref(), Some(Path::new("foo.gemspec")));

    let specs = resolve("foo", fixture.path()).unwrap();
    assert_eq!(specs.len(), 1);
    let spec = specs.spec_for("foo").unwrap();
    assert_eq!(spec.version, GemVersion::parse("1.2").unwrap());
    assert_eq!(
        spec.source,
        SpecSource::Path {
            path: fixture.path().to_path_buf()
        }
    );

    let expected = GemVersion::parse("1.2").unwrap();
    validate_spec(spec, fixture.path(), Some(&expected)).unwrap();
}

#[test]
fn test_gemspec_in_subdirectory_with_version_constant() {
    let fixture = GemSourceFixture::new().unwrap();
    fixture.gemspec_in("chef-config", "chef-config", "ChefConfig::VERSION", &[]).unwrap();
    fixture.version_file("chef-config", "chef-config", "ChefConfig", "18.2.7").unwrap();

    let specs = resolve("chef-config", fixture.path()).unwrap();
    let spec = specs.spec_for("chef-config").unwrap();
    assert_eq!(spec.version.to_string(), "18.2.7");
    validate_spec(spec, fixture.path(), None).unwrap();

    let wrong = GemVersion::parse("18.2.8").unwrap();
    assert!(matches!(
        validate_spec(spec, fixture.path(), Some(&wrong)),
        Err(ImportError::VersionMismatch { .. })
    ));
}

#[test]
fn test_lock_pins_are_stable_across_runs() {
    let fixture = GemSourceFixture::new().unwrap();
    fixture.gemspec("foo", "1.2", &[("rake", Some(">= 10")), ("json", None)]).unwrap();
    fixture
        .lockfile(
            "PATH\n  remote: .\n  specs:\n    foo (1.2)\n      json\n      rake (>= 10)\n\nGEM\n  remote: https://rubygems.org/\n  specs:\n    json (2.6.3)\n    rake (13.0.6)\n\nPLATFORMS\n  ruby\n\nDEPENDENCIES\n  foo!\n\nBUNDLED WITH\n   2.4.10\n",
        )
        .unwrap();

    let first = resolve("foo", fixture.path()).unwrap();
    let second = resolve("foo", fixture.path()).unwrap();
    assert_eq!(first, second);

    let report = DependencyReport::from_build(&Default::default(), &first, "foo");
    assert_eq!(report.runtime_dependencies["json"], "2.6.3");
    assert_eq!(report.runtime_dependencies["rake"], "13.0.6");
    assert!(!report.runtime_dependencies.contains_key("foo"));
}

#[test]
fn test_project_gemfile_is_ignored() {
    let fixture = GemSourceFixture::new().unwrap();
    fixture.gemspec("foo", "1.2", &[]).unwrap();
    fixture
        .write(Path::new("Gemfile"), "source 'https://rubygems.org'\ngemspec\ngem 'pry'\ngem 'rubocop'\n")
        .unwrap();

    let specs = resolve("foo", fixture.path()).unwrap();
    let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["foo"]);
}

#[test]
fn test_missing_and_ambiguous_manifests() {
    let fixture = GemSourceFixture::new().unwrap();
    assert!(matches!(resolve("foo", fixture.path()), Err(ImportError::ManifestNotFound { .. })));

    fixture.gemspec("foo", "1.2", &[]).unwrap();
    fixture.gemspec_in("vendor", "foo", "\"0.9\"", &[]).unwrap();
    assert!(matches!(resolve("foo", fixture.path()), Err(ImportError::ManifestAmbiguous { .. })));
}

#[test]
fn test_unresolvable_dependency() {
    let fixture = GemSourceFixture::new().unwrap();
    fixture.gemspec("foo", "1.2", &[("nokogiri", Some("~> 1.15"))]).unwrap();
    fixture
        .lockfile("GEM\n  remote: https://rubygems.org/\n  specs:\n    nokogiri (1.14.0)\n")
        .unwrap();

    match resolve("foo", fixture.path()).unwrap_err() {
        ImportError::ResolutionFailed {
            package,
            message,
        } => {
            assert_eq!(package, "foo");
            assert!(message.contains("nokogiri"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}
