use super::*;

fn store() -> CanvasStore {
    CanvasStore::new(&CanvasConfig::default())
}

fn pixel(x: i64, y: i64, color: &str) -> Pixel {
    Pixel {
        x,
        y,
        color: Color::parse(color).unwrap(),
    }
}

#[test]
fn test_apply_then_snapshot_contains_pixel() {
    let mut canvas = store();
    canvas.apply(pixel(1, 1, "#FF0000"), "bob");
    canvas.apply(pixel(2, 3, "#00FF00"), "bob");

    assert!(canvas.apply(pixel(10, 20, "#0000FF"), "alice"));

    let snapshot = canvas.snapshot();
    let at: Vec<&Pixel> = snapshot.iter().filter(|p| p.x == 10 && p.y == 20).collect();
    assert_eq!(at.len(), 1);
    assert_eq!(at[0].color.as_str(), "#0000FF");
    assert_eq!(snapshot.len(), 3);
}

#[test]
fn test_last_write_wins() {
    let mut canvas = store();
    canvas.apply(pixel(5, 5, "#FF0000"), "alice");
    canvas.apply(pixel(5, 5, "#000000"), "bob");

    let snapshot = canvas.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0], pixel(5, 5, "#000000"));

    let (writer, _) = canvas.last_writer(5, 5).unwrap();
    assert_eq!(writer, "bob");
}

#[test]
fn test_out_of_bounds_is_noop() {
    let mut canvas = store();

    assert!(!canvas.apply(pixel(-1, 0, "#FF0000"), "alice"));
    assert!(!canvas.apply(pixel(0, -1, "#FF0000"), "alice"));
    assert!(!canvas.apply(pixel(800, 0, "#FF0000"), "alice"));
    assert!(!canvas.apply(pixel(0, 600, "#FF0000"), "alice"));
    assert!(canvas.is_empty());

    // Corners are inside
    assert!(canvas.apply(pixel(0, 0, "#FF0000"), "alice"));
    assert!(canvas.apply(pixel(799, 599, "#FF0000"), "alice"));
    assert_eq!(canvas.len(), 2);
}

#[test]
fn test_snapshot_is_row_major() {
    let mut canvas = store();
    canvas.apply(pixel(3, 1, "#000000"), "a");
    canvas.apply(pixel(0, 2, "#000000"), "a");
    canvas.apply(pixel(1, 1, "#000000"), "a");

    let coords: Vec<(i64, i64)> = canvas.snapshot().iter().map(|p| (p.x, p.y)).collect();
    assert_eq!(coords, vec![(1, 1), (3, 1), (0, 2)]);
}

#[test]
fn test_get_missing_pixel() {
    let canvas = store();
    assert!(canvas.get(1, 1).is_none());
    assert!(canvas.last_writer(1, 1).is_none());
}

#[test]
fn test_validate_color_any_hex_by_default() {
    let canvas = store();
    assert_eq!(canvas.validate_color("#abc").unwrap().as_str(), "#AABBCC");
    assert!(canvas.validate_color("blue").is_err());
}

#[test]
fn test_validate_color_palette_only() {
    let canvas = CanvasStore::new(&CanvasConfig {
        palette_only: true,
        ..CanvasConfig::default()
    });

    assert!(canvas.validate_color("#4b0082").is_ok());
    assert_eq!(
        canvas.validate_color("#123456"),
        Err(ColorError::NotInPalette("#123456".to_string()))
    );
}
