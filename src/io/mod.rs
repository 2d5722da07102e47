pub(crate) mod grid_file;
