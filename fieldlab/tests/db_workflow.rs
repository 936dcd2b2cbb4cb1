use fllib::{
    defer_file_removal, file_util, props, tracing_setup::init_tracing_for_tests, DbEvent,
    ImageDatabase, LabelRegistry, LabeledImage, PropVal, TeamColor,
};
use serde_json::Value;
use std::{cell::RefCell, env, rc::Rc};

#[test]
fn test_label_save_export_workflow() {
    init_tracing_for_tests();
    let db_path = env::temp_dir().join("fieldlab_workflow.json");
    let export_path = env::temp_dir().join("fieldlab_workflow_export.json");
    defer_file_removal!(&db_path);
    defer_file_removal!(&export_path);

    let registry = LabelRegistry::default();
    let mut db = ImageDatabase::new();
    let events = Rc::new(RefCell::new(vec![]));
    let sink = Rc::clone(&events);
    db.subscribe(Box::new(move |event| sink.borrow_mut().push(*event)));

    db.create_new();
    db.add_image(LabeledImage::new("/frames/half1_0001.png"));
    db.add_image(LabeledImage::new("/frames/half1_0002.png"));

    let ball = registry
        .construct("Balls", &[(100, 120).into(), (103, 124).into()])
        .unwrap();
    let ball_ref = db.add_label(0, ball).unwrap().unwrap();
    let robot = registry
        .construct("Robots", &[(10, 20).into(), (60, 150).into()])
        .unwrap();
    let robot_ref = db.add_label(1, robot).unwrap().unwrap();

    props::set_prop(&mut db, robot_ref, "teamColor", "BLUE").unwrap();
    assert_eq!(
        props::get_prop(&db, robot_ref, "teamColor").unwrap(),
        PropVal::TeamColor(TeamColor::Blue)
    );
    assert_eq!(
        props::get_prop(&db, ball_ref, "radius").unwrap(),
        PropVal::Int(5)
    );

    // each structural mutation is bracketed by matching pre/post events
    assert_eq!(
        *events.borrow(),
        vec![
            DbEvent::PreDatabaseChanged,
            DbEvent::DatabaseChanged,
            DbEvent::PreImageAdded(0),
            DbEvent::ImageAdded(0),
            DbEvent::PreImageAdded(1),
            DbEvent::ImageAdded(1),
            DbEvent::PreLabelAdded(ball_ref),
            DbEvent::LabelAdded(ball_ref),
            DbEvent::PreLabelAdded(robot_ref),
            DbEvent::LabelAdded(robot_ref),
            DbEvent::LabelChanged(robot_ref),
        ]
    );

    db.write_to_file(&db_path).unwrap();
    assert!(!db.modified());

    let mut reloaded = ImageDatabase::new();
    reloaded.read_from_file(&db_path).unwrap();
    assert_eq!(reloaded.images(), db.images());
    assert_eq!(
        props::prop_rows(&reloaded, robot_ref).unwrap(),
        vec![
            ("topLeft", PropVal::Point((10, 20).into())),
            ("bottomRight", PropVal::Point((60, 150).into())),
            ("teamColor", PropVal::TeamColor(TeamColor::Blue)),
        ]
    );

    reloaded.export_to_json(&export_path).unwrap();
    let exported =
        serde_json::from_str::<Value>(&file_util::read_to_string(&export_path).unwrap()).unwrap();
    let images = exported["imageDatabase"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0]["fileName"], "/frames/half1_0001.png");
    assert_eq!(images[0]["Balls"][0]["radius"], 5);
    assert_eq!(images[1]["Robots"][0]["teamColor"], 1);
}
