//! Configuration contracts
//!
//! - a bad pattern fails before any target is connected
//! - resolution keeps the operator's selection order

use std::path::Path;

use rollout::config::parse_with_warnings;
use rollout::{resolve_targets, Settings, TargetSelection};

const CONFIG: &str = r#"
[environments.prod]
tasks_target = "core"

[environments.prod.targets.web.remote]
branch = "master"
path = "/srv/acme/web"
servers = ["web1", "web2"]

[environments.prod.targets.core.remote]
branch = "master"
path = "/srv/acme/core"
servers = ["core1"]

[environments.prod.targets.api.remote]
branch = "master"
path = "/srv/acme/api"
servers = ["app1"]
task_path = "/srv/acme/api-tasks"
"#;

#[test]
fn contract_invalid_migration_pattern_is_rejected_up_front() {
    let text = format!(
        "{CONFIG}\n[[migrations]]\nname = \"broken\"\npattern = \"migrations/(\"\ncommand = \"true\"\n"
    );
    let (config, _) = parse_with_warnings(&text, Path::new("rollout.toml")).unwrap();
    let err = Settings::from_config(&config).unwrap_err();
    assert!(err.to_string().contains("invalid pattern"));
}

#[test]
fn contract_selection_order_is_preserved() {
    let (config, warnings) = parse_with_warnings(CONFIG, Path::new("rollout.toml")).unwrap();
    assert!(warnings.is_empty());

    let named = resolve_targets(&config, "prod", &TargetSelection::parse(Some("web,api")))
        .unwrap();
    let names: Vec<&str> = named.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["web", "api"]);

    let all = resolve_targets(&config, "prod", &TargetSelection::All).unwrap();
    let names: Vec<&str> = all.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["api", "core", "web"]);
}

#[test]
fn contract_task_path_comes_from_tasks_target_unless_overridden() {
    let (config, _) = parse_with_warnings(CONFIG, Path::new("rollout.toml")).unwrap();
    let targets = resolve_targets(&config, "prod", &TargetSelection::All).unwrap();
    let task_path = |name: &str| {
        targets
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.task_path.clone())
            .unwrap()
    };
    assert_eq!(task_path("web"), "/srv/acme/core");
    assert_eq!(task_path("api"), "/srv/acme/api-tasks");
}
