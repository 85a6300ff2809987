use rendervars_core::scopes::Scopes;
use rendervars_core::{Environment, PathEvaluator, PlaceholderRenderer, Template};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn shorthand_derives_target_and_scopes() {
    let t = Template::from_value(&json!("hello.txt.tpl")).unwrap();
    assert_eq!(t.target_file(), Path::new("hello.txt"));
    assert!(t.in_scope("build"));
    assert!(t.in_scope("deploy"));
}

#[test]
fn out_of_scope_render_writes_nothing() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("hello.txt.tpl");
    fs::write(&source, "Hello {{who}}\n").unwrap();

    let mut t = Template::new(&source);
    t.set_scopes(Scopes::unchecked(["myscope"]));

    t.render("other", &Environment::new(), &PathEvaluator, &PlaceholderRenderer)
        .expect("out of scope render succeeds");
    assert!(!tmp.path().join("hello.txt").exists());
}

#[test]
fn in_scope_render_substitutes_scripted_mapping() {
    let tmp = tempdir().unwrap();
    let source = tmp.path().join("hello.txt.tpl");
    fs::write(&source, "Hello {{who}}\n").unwrap();

    let t = Template::from_value(&json!({
        "file": source.to_str().unwrap(),
        "scopes": ["build"],
        "mapping": {"who": "$this.variable"}
    }))
    .unwrap();

    let mut env = Environment::new();
    env.insert_path("this.variable", "scripted world");

    t.render("build", &env, &PathEvaluator, &PlaceholderRenderer).expect("render ok");
    let out = fs::read_to_string(tmp.path().join("hello.txt")).unwrap();
    assert_eq!(out, "Hello scripted world\n");
}

#[test]
fn templates_deserialize_from_yaml() {
    let yaml = r#"
- a.txt.tpl
- file: b.conf.tpl
  target: out/b.conf
  scopes: deploy
  mapping:
    port: 8080
"#;
    let templates: Vec<Template> = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(templates[0].target_file(), Path::new("a.txt"));
    assert_eq!(templates[1].target_file(), Path::new("out/b.conf"));
    assert!(!templates[1].in_scope("build"));
    assert_eq!(templates[1].mapping().get("port"), Some(&json!(8080)));
}
