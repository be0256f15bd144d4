use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of a generated element identifier.
pub const IDENTIFIER_LEN: usize = 33;

/// Length of the random stem of a new save file name.
pub const SAV_STEM_LEN: usize = 34;

pub const SAV_EXTENSION: &str = "sav";
pub const PREVIEW_EXTENSION: &str = "jpg";

/// Random ASCII alphanumeric string; lowercase letters and digits only when `lower`.
pub fn rand_string(len: usize, lower: bool) -> String {
    let s: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect();
    if lower {
        s.to_ascii_lowercase()
    } else {
        s
    }
}

/// Fresh identifier used to reference an element from wires.
pub fn new_identifier() -> String {
    rand_string(IDENTIFIER_LEN, false)
}

/// File name for a newly created experiment, e.g. `Ab3...Xy.sav`.
pub fn new_sav_file_name() -> String {
    format!("{}.{SAV_EXTENSION}", rand_string(SAV_STEM_LEN, false))
}
