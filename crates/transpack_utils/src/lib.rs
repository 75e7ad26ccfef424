pub mod collections;
pub mod option_ext;
pub mod path_ext;
pub mod rayon;
pub mod xxhash;
