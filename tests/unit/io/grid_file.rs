use super::*;
use ndarray::array;

#[test]
fn parses_whitespace_and_comma_rows() {
    let g = parse_grid("# speeds\n1 2 3\n\n4,5,6\n7.5e0\t8 9\n").unwrap();
    assert_eq!(g, array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.5, 8.0, 9.0]]);
}

#[test]
fn ragged_and_garbage_rows_are_rejected() {
    let err = parse_grid("1 2\n3\n").unwrap_err();
    assert!(err.to_string().contains("line 2"), "{err}");
    assert!(parse_grid("1 x\n").is_err());
    assert!(parse_grid("# nothing\n\n").is_err());
}

#[test]
fn save_then_load_preserves_values() {
    let path = std::path::PathBuf::from("target")
        .join("unit_grid_file")
        .join("grid.txt");
    let grid = array![[0.0, 5.0e7], [1.234_567_890_123e-3, 2.0]];
    save_grid(&path, &grid).unwrap();
    assert_eq!(load_grid(&path).unwrap(), grid);
    assert_eq!(
        VelocityField::from_grid_file(&path).unwrap().as_array(),
        &grid
    );
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_grid(Path::new("target/unit_grid_file/does_not_exist.txt")).unwrap_err();
    assert!(matches!(err, VisarError::Other(_)));
}
