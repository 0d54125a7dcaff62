//! File boundaries shared with the alignment viewer and the cepstral
//! feature front-end. Neither alignment nor feature computation happens here.

pub mod dtw_path;
pub mod feature_file;
