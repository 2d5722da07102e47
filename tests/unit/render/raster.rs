use super::*;
use ndarray::array;

#[test]
fn gray_mapping_covers_the_intensity_range() {
    let field = IntensityField::new(array![[0.0, 4.0], [2.0, 1.0]]).unwrap();
    let frame = to_gray_rgba8(&field);
    assert_eq!((frame.width, frame.height), (2, 2));
    assert_eq!(
        frame.data,
        vec![0, 0, 0, 255, 255, 255, 255, 255, 128, 128, 128, 255, 64, 64, 64, 255]
    );
}

#[test]
fn png_round_trips_through_image() {
    let dir = std::path::PathBuf::from("target").join("unit_raster");
    let path = dir.join("snapshot.png");
    let _ = std::fs::remove_file(&path);

    let field = IntensityField::new(array![[0.0, 4.0], [4.0, 0.0]]).unwrap();
    write_png(&field, &path).unwrap();

    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (2, 2));
    assert_eq!(img.get_pixel(1, 0).0, [255, 255, 255, 255]);
    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
}
