use std::fs;

use planetside::prelude::*;

const HANGAR: &str = "\
// Hangar pack
STATIC
{
    mesh = hangar.mu
    name = Hangar
    author = someone
    LIGHT
    {
        range = 50
        color = 1,0.9,0.8
    }
}
";

const TOWER: &str = "\
STATIC
{
    mesh = models/tower.mu
    name = Tower
}
";

fn bodies() -> BodyCatalog {
    BodyCatalog::new().with(SphericalBody::new("Kerbin", Vector3::new(1_000.0, -2_000.0, 500.0), 600_000.0))
}

fn write_pack(root: &std::path::Path) {
    fs::create_dir_all(root.join("Town/Hangar")).unwrap();
    fs::create_dir_all(root.join("Town/Tower")).unwrap();
    fs::write(root.join("Town/Hangar/hangar.cfg"), HANGAR).unwrap();
    fs::write(root.join("Town/Tower/tower.cfg"), TOWER).unwrap();
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

#[test]
fn test_create_edit_save_reload() {
    planetside::init_logging();
    let dir = tempfile::tempdir().unwrap();
    write_pack(dir.path());

    let mut db = ConfigDatabase::load(dir.path()).unwrap();
    let mut session = EditorSession::load_seeded(&db, EditorSettings::default(), 99);
    assert_eq!(session.index().len(), 2);
    assert!(session.registry().is_empty());

    let bodies = bodies();
    let mut host = RecordingHost::new(Some(Vector3::new(1_000.0, 598_010.25, 500.0)));
    session.handle_scene_event(&SceneEvent::SceneReady { body: "Kerbin".into() }, &mut host, &bodies);

    let mut created = Vec::new();
    for i in 0..5 {
        let key = session.create_instance("Town/Hangar/hangar", &mut host, &bodies).unwrap();
        session.nudge(Axis::X, i as f32, StepSize::Coarse, &mut host, &bodies).unwrap();
        session.nudge(Axis::Z, -(i as f32), StepSize::Fine, &mut host, &bodies).unwrap();
        session.set_rotation(i as f32 * 33.3, &mut host, &bodies).unwrap();
        session.set_orientation_preset(OrientationPreset::Forward, &mut host, &bodies).unwrap();
        session.set_radius_offset(0.125 * i as f32, &mut host, &bodies).unwrap();
        created.push(session.instance(key).unwrap().clone());
    }

    let report = session.save(&mut db);
    assert!(report.is_success());
    assert_eq!(report.written.len(), 2);

    let tower = fs::read_to_string(dir.path().join("Town/Tower/tower.cfg")).unwrap();
    assert!(!tower.contains("Instances"));
    assert!(tower.contains("\tmesh = models/tower.mu\n"));

    let reloaded_db = ConfigDatabase::load(dir.path()).unwrap();
    let hangar = reloaded_db.get_node("Town/Hangar/hangar/STATIC").unwrap();
    assert_eq!(hangar.get_value("author"), Some("someone"));
    assert_eq!(hangar.get_node("LIGHT").and_then(|l| l.get_value("color")), Some("1,0.9,0.8"));

    let reloaded = EditorSession::load_seeded(&reloaded_db, EditorSettings::default(), 1);
    assert!(reloaded.index().issues().is_empty());
    assert_eq!(reloaded.registry().instances("Town/Hangar/hangar").len(), created.len());
    assert!(reloaded.registry().instances("Town/Tower/models/tower").is_empty());

    for original in &created {
        let copy = reloaded
            .registry()
            .lookup(&original.object_id, "Town/Hangar/hangar")
            .unwrap();
        assert!(close(copy.relative_position.x, original.relative_position.x));
        assert!(close(copy.relative_position.y, original.relative_position.y));
        assert!(close(copy.relative_position.z, original.relative_position.z));
        assert!(close(copy.rotation_angle, original.rotation_angle));
        assert!(close(copy.radius_offset, original.radius_offset));
        assert_eq!(copy.up_orientation, Vector3::unit_z());
        assert!(close(copy.visibility_range, 1000.0));
        assert_eq!(copy.body_name, "Kerbin");
    }
}

#[test]
fn test_second_save_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    write_pack(dir.path());

    let mut db = ConfigDatabase::load(dir.path()).unwrap();
    let mut session = EditorSession::load_seeded(&db, EditorSettings::default(), 3);
    let bodies = bodies();
    let mut host = RecordingHost::new(Some(Vector3::new(-599_990.0, 10.0, 7.0)));
    session.handle_scene_event(&SceneEvent::SceneReady { body: "Kerbin".into() }, &mut host, &bodies);
    session.create_instance("Town/Tower/models/tower", &mut host, &bodies).unwrap();

    assert!(session.save(&mut db).is_success());
    let first = fs::read(dir.path().join("Town/Tower/tower.cfg")).unwrap();

    let mut reloaded_db = ConfigDatabase::load(dir.path()).unwrap();
    let mut reloaded = EditorSession::load_seeded(&reloaded_db, EditorSettings::default(), 4);
    assert!(reloaded.save(&mut reloaded_db).is_success());
    let second = fs::read(dir.path().join("Town/Tower/tower.cfg")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_deleted_instances_are_not_written() {
    let dir = tempfile::tempdir().unwrap();
    write_pack(dir.path());

    let mut db = ConfigDatabase::load(dir.path()).unwrap();
    let mut session = EditorSession::load_seeded(&db, EditorSettings::default(), 8);
    let bodies = bodies();
    let mut host = RecordingHost::new(Some(Vector3::new(1_000.0, 598_010.0, 500.0)));
    session.handle_scene_event(&SceneEvent::SceneReady { body: "Kerbin".into() }, &mut host, &bodies);

    let keep = session.create_instance("Town/Hangar/hangar", &mut host, &bodies).unwrap();
    session.create_instance("Town/Hangar/hangar", &mut host, &bodies).unwrap();
    session.delete_selected(&mut host).unwrap();
    assert!(session.save(&mut db).is_success());

    let kept_id = session.instance(keep).unwrap().object_id.clone();
    let reloaded = EditorSession::load_seeded(&ConfigDatabase::load(dir.path()).unwrap(), EditorSettings::default(), 9);
    let instances = reloaded.registry().instances("Town/Hangar/hangar");
    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0].object_id, kept_id);
}
