use super::*;

#[test]
fn minimal_project_parses_with_defaults() {
    let json = r#"{ "chapters": [ { "image": "a.png", "duration_secs": 30 } ] }"#;
    let p = ProjectDef::from_reader(json.as_bytes()).unwrap();
    assert_eq!(p.fps, 30);
    assert!(!p.grid);
    assert_eq!(p.chapters[0].piece_count, 100);
    assert_eq!(p.chapters[0].shape, Shape::Jigsaw);
    assert_eq!(p.chapters[0].transition, TransitionMode::Random);
}

#[test]
fn empty_chapter_list_is_rejected() {
    let json = r#"{ "chapters": [] }"#;
    assert!(ProjectDef::from_reader(json.as_bytes()).is_err());
}

#[test]
fn non_positive_duration_is_rejected() {
    let json = r#"{ "chapters": [ { "image": "a.png", "duration_secs": 0 } ] }"#;
    let err = ProjectDef::from_reader(json.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("duration_secs"));
}

#[test]
fn resolve_keeps_absolute_paths() {
    let root = Path::new("/proj");
    assert_eq!(ProjectDef::resolve(root, "img/a.png"), Path::new("/proj/img/a.png"));
    assert_eq!(ProjectDef::resolve(root, "/abs/a.png"), Path::new("/abs/a.png"));
}

#[test]
fn chapter_params_mark_only_the_last_chapter() {
    let json = r#"{
        "call_to_action": "Visit us",
        "chapters": [
            { "image": "a.png", "duration_secs": 10 },
            { "image": "b.png", "duration_secs": 12, "seed": 7 }
        ]
    }"#;
    let p = ProjectDef::from_reader(json.as_bytes()).unwrap();
    let first = p.chapter_params(0, None).unwrap();
    let last = p.chapter_params(1, None).unwrap();
    assert!(!first.is_last);
    assert!(last.is_last);
    assert_eq!(last.seed, 7);
    assert_ne!(first.seed, p.chapter_params(1, None).unwrap().seed);
    assert_eq!(first.call_to_action.as_deref(), Some("Visit us"));
    assert!(p.chapter_params(2, None).is_none());
}
