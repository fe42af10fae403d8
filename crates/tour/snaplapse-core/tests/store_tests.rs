mod common;

use common::{event_log, kinds, record, square, tour_at, Call};
use snaplapse_core::{Bounds, KeyframeDraft, KeyframeId, TourEvent};

#[test]
fn recorded_keyframe_reads_back_as_an_independent_copy() {
    let (mut tour, _) = tour_at(0.0);
    let id = record(&mut tour, 2.5, Bounds::new(1.0, 2.0, 3.0, 4.0));

    let mut copy = tour.get_keyframe_by_id(&id).expect("keyframe stored");
    assert_eq!(copy.time, 2.5);
    assert_eq!(copy.bounds, Bounds::new(1.0, 2.0, 3.0, 4.0));
    assert_eq!(copy.duration, None);
    assert_eq!(copy.description, "");
    assert!(!copy.is_description_visible);

    copy.time = 99.0;
    copy.bounds.xmax = -1.0;
    let mut all = tour.get_keyframes();
    all[0].description.push_str("edited");

    let fresh = tour.get_keyframe_by_id(&id).unwrap();
    assert_eq!(fresh.time, 2.5);
    assert_eq!(fresh.bounds.xmax, 3.0);
    assert_eq!(fresh.description, "");
}

#[test]
fn unset_time_and_view_come_from_the_renderer() {
    let (mut tour, _) = tour_at(0.0);
    tour.renderer_mut().time = 3.123_456_789;
    tour.renderer_mut().bounds = Bounds::new(5.0, 6.0, 7.0, 8.0);

    let id = tour.record_keyframe(KeyframeDraft::new().description("caption", true));
    let kf = tour.get_keyframe_by_id(&id).unwrap();
    assert_eq!(kf.time, 3.123457);
    assert_eq!(kf.bounds, Bounds::new(5.0, 6.0, 7.0, 8.0));
    assert_eq!(kf.description, "caption");
    assert!(kf.is_description_visible);
}

#[test]
fn recording_after_an_id_inserts_right_behind_it() {
    let (mut tour, _) = tour_at(0.0);
    let a = record(&mut tour, 0.0, square(0.0, 1.0));
    let b = record(&mut tour, 1.0, square(0.0, 1.0));
    let c = record(&mut tour, 2.0, square(0.0, 1.0));
    let events = event_log(&mut tour);

    let d = tour.record_keyframe(KeyframeDraft::new().after(b.clone()).at(1.5, square(0.0, 2.0)));

    let order: Vec<KeyframeId> = tour.get_keyframes().into_iter().map(|k| k.id).collect();
    assert_eq!(order, vec![a, b, d.clone(), c.clone()]);
    assert_eq!(tour.keyframe_index(&d), Some(2));
    assert_eq!(tour.keyframe_index(&c), Some(3));

    let events = events.borrow();
    match &events[..] {
        [TourEvent::KeyframeAdded { keyframe, index }] => {
            assert_eq!(keyframe.id, d);
            assert_eq!(*index, 2);
        }
        other => panic!("unexpected events {other:?}"),
    }
}

#[test]
fn unknown_after_id_appends() {
    let (mut tour, _) = tour_at(0.0);
    record(&mut tour, 0.0, square(0.0, 1.0));
    let id = tour.record_keyframe(
        KeyframeDraft::new()
            .after("no-such-keyframe")
            .at(4.0, square(0.0, 1.0)),
    );
    assert_eq!(tour.keyframe_index(&id), Some(1));
}

#[test]
fn keyframes_keep_insertion_order_not_time_order() {
    let (mut tour, _) = tour_at(0.0);
    record(&mut tour, 10.0, square(0.0, 1.0));
    record(&mut tour, 2.0, square(0.0, 1.0));
    record(&mut tour, 2.0, square(0.0, 1.0));
    let times: Vec<f64> = tour.get_keyframes().iter().map(|k| k.time).collect();
    assert_eq!(times, vec![10.0, 2.0, 2.0]);
}

#[test]
fn duplicate_copies_fields_and_lands_after_the_source() {
    let (mut tour, _) = tour_at(0.0);
    let a = tour.record_keyframe(
        KeyframeDraft::new()
            .at(4.0, square(10.0, 20.0))
            .description("harbour", true)
            .duration(3.0),
    );
    let b = record(&mut tour, 8.0, square(0.0, 1.0));
    tour.renderer_mut().time = 50.0;

    let dup = tour.duplicate_keyframe(&a).expect("source exists");
    assert_ne!(dup, a);
    assert_eq!(tour.keyframe_index(&dup), Some(1));
    assert_eq!(tour.keyframe_index(&b), Some(2));

    let src = tour.get_keyframe_by_id(&a).unwrap();
    let copy = tour.get_keyframe_by_id(&dup).unwrap();
    assert_eq!(copy.time, src.time);
    assert_eq!(copy.bounds, src.bounds);
    assert_eq!(copy.description, "harbour");
    assert!(copy.is_description_visible);
    assert_eq!(copy.duration, Some(3.0));

    assert!(tour.duplicate_keyframe(&KeyframeId::from("missing")).is_none());
}

#[test]
fn annotation_and_duration_edits() {
    let (mut tour, _) = tour_at(0.0);
    let id = record(&mut tour, 0.0, square(0.0, 1.0));
    let events = event_log(&mut tour);

    assert!(tour.set_text_annotation_for_keyframe(&id, "Sunrise", true));
    let kf = tour.get_keyframe_by_id(&id).unwrap();
    assert_eq!(kf.description, "Sunrise");
    assert!(kf.is_description_visible);
    assert!(!tour.set_text_annotation_for_keyframe(&KeyframeId::from("nope"), "x", false));

    assert!(tour.set_duration_for_keyframe(&id, "2.57"));
    assert_eq!(tour.get_keyframe_by_id(&id).unwrap().duration, Some(2.6));
    assert!(tour.set_duration_for_keyframe(&id, -4.0));
    assert_eq!(tour.get_keyframe_by_id(&id).unwrap().duration, None);
    assert!(tour.set_duration_for_keyframe(&id, 0.0));
    assert_eq!(tour.get_keyframe_by_id(&id).unwrap().duration, Some(0.0));
    assert!(!tour.set_duration_for_keyframe(&KeyframeId::from("nope"), 1.0));

    assert!(events.borrow().is_empty());
}

#[test]
fn update_time_and_position_uses_the_current_view() {
    let (mut tour, _) = tour_at(0.0);
    let id = record(&mut tour, 0.0, square(0.0, 1.0));
    let events = event_log(&mut tour);

    tour.renderer_mut().time = 7.25;
    tour.renderer_mut().bounds = square(3.0, 9.0);
    assert!(tour.update_time_and_position_for_keyframe(&id));

    let kf = tour.get_keyframe_by_id(&id).unwrap();
    assert_eq!(kf.time, 7.25);
    assert_eq!(kf.bounds, square(3.0, 9.0));
    assert_eq!(kinds(&events.borrow()), vec!["keyframe-modified"]);

    assert!(!tour.update_time_and_position_for_keyframe(&KeyframeId::from("nope")));
    assert_eq!(events.borrow().len(), 1);
    // reading the view never drives the renderer
    assert!(!tour.renderer().calls.contains(&Call::Play));
}

#[test]
fn delete_is_idempotent() {
    let (mut tour, _) = tour_at(0.0);
    let a = record(&mut tour, 0.0, square(0.0, 1.0));
    let b = record(&mut tour, 1.0, square(0.0, 1.0));

    assert!(tour.delete_keyframe_by_id(&a));
    assert_eq!(tour.get_num_keyframes(), 1);
    assert!(!tour.delete_keyframe_by_id(&a));
    assert_eq!(tour.get_num_keyframes(), 1);
    assert!(tour.get_keyframe_by_id(&a).is_none());
    assert_eq!(tour.keyframe_index(&b), Some(0));

    tour.clear_keyframes();
    assert_eq!(tour.get_num_keyframes(), 0);
    assert!(tour.get_keyframe_by_id(&b).is_none());
}

#[test]
fn generated_ids_are_unique() {
    let (mut tour, _) = tour_at(0.0);
    let mut ids: Vec<KeyframeId> = (0..50)
        .map(|i| record(&mut tour, i as f64, square(0.0, 1.0)))
        .collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 50);
}
