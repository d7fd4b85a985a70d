use super::*;

#[test]
fn canvas_rejects_edges_below_two() {
    assert!(Canvas::new(1, 10).is_err());
    assert!(Canvas::new(10, 1).is_err());
    assert!(Canvas::new(0, 0).is_err());
    let c = Canvas::new(2, 2).unwrap();
    assert_eq!((c.width(), c.height(), c.area()), (2, 2, 4));
}

#[test]
fn canvas_index_drops_out_of_bounds() {
    let c = Canvas::new(4, 3).unwrap();
    assert_eq!(c.index_of(0, 0), Some(0));
    assert_eq!(c.index_of(3, 2), Some(11));
    assert_eq!(c.index_of(4, 0), None);
    assert_eq!(c.index_of(0, 3), None);
    assert_eq!(c.index_of(-1, 0), None);
    assert_eq!(c.index_of(0, -1), None);
}

#[test]
fn canvas_deserialize_validates() {
    let ok: Canvas = serde_json::from_str(r#"{"width":8,"height":6}"#).unwrap();
    assert_eq!(ok, Canvas::new(8, 6).unwrap());

    let err = serde_json::from_str::<Canvas>(r#"{"width":1,"height":6}"#).unwrap_err();
    assert!(err.to_string().contains("at least 2 pixels"));
}
