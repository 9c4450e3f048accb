//! Build scripts routed through the interceptor.

use rubygems_import::command::DependencyDeclaration;
use rubygems_import::core::ImportError;
use rubygems_import::interceptor::{BuildCommandInterceptor, BuildScript, CommandObserver};
use rubygems_import::test_utils::GemSourceFixture;
use std::path::Path;

/// Records every step it sees, to check ordering of delivery.
#[derive(Default)]
struct Recorder(Vec<String>);

impl CommandObserver for Recorder {
    fn observe(&mut self, command: &str) -> Result<(), ImportError> {
        self.0.push(format!("sh: {command}"));
        Ok(())
    }

    fn observe_gem(&mut self, args: &str) -> Result<(), ImportError> {
        self.0.push(format!("gem: {args}"));
        Ok(())
    }
}

#[test]
fn test_steps_are_delivered_in_order() {
    let script = BuildScript::from_yaml(
        "- command: ./configure\n- gem: install bundler\n- command: make\n- gem: build foo.gemspec\n",
    )
    .unwrap();
    let mut recorder = Recorder::default();
    script.run(&mut recorder).unwrap();
    assert_eq!(
        recorder.0,
        vec!["sh: ./configure", "gem: install bundler", "sh: make", "gem: build foo.gemspec"]
    );
}

#[test]
fn test_yaml_and_text_scripts_agree() {
    let fixture = GemSourceFixture::new().unwrap();
    let yaml = fixture
        .write(
            Path::new("build.yml"),
            "- command: gem install 'pkg/*.gem' appbundler -v 0.13.4\n- gem: build chef.gemspec\n- command: gem install ffi-yajl -- --with-cflags=-O2\n",
        )
        .unwrap();
    let text = fixture
        .write(
            Path::new("build.txt"),
            "# chef\ngem install 'pkg/*.gem' appbundler -v 0.13.4\ngem build chef.gemspec\ngem install ffi-yajl -- --with-cflags=-O2\n",
        )
        .unwrap();

    let mut results = Vec::new();
    for path in [yaml, text] {
        let mut interceptor = BuildCommandInterceptor::new();
        BuildScript::load(&path).unwrap().run(&mut interceptor).unwrap();
        results.push(interceptor.finish());
    }
    assert_eq!(results[0], results[1]);

    let build = &results[0];
    assert_eq!(build.artifact.as_deref(), Some(Path::new("chef.gemspec")));
    let names: Vec<&str> = build.dependencies.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["appbundler", "ffi-yajl"]);
    assert_eq!(build.dependencies[0].to_string(), "appbundler (= 0.13.4)");
    assert_eq!(build.dependencies[1], DependencyDeclaration::unversioned("ffi-yajl"));
}

#[test]
fn test_two_builds_abort_the_run() {
    let script = BuildScript::from_lines("gem build a.gemspec\ngem install late\ngem build b.gemspec\ngem install never\n");
    let mut interceptor = BuildCommandInterceptor::new();
    let err = script.run(&mut interceptor).unwrap_err();
    assert!(matches!(err, ImportError::MultipleArtifactsDeclared { .. }));
    assert_eq!(interceptor.dependencies(), &[DependencyDeclaration::unversioned("late")]);
}
