//! Reading, writing and locating `.sav` files on disk.

use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use atomicwrites::{AtomicFile, OverwriteBehavior};
use chardetng::EncodingDetector;
use encoding_rs::{Encoding, GBK, UTF_8};
use plab_sav::identifier::{PREVIEW_EXTENSION, SAV_EXTENSION};
use plab_sav::{SavError, SaveDocument};
use walkdir::WalkDir;

use crate::error::{LabError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Candidate decodings of save file bytes, in the order they are tried.
///
/// Strict UTF-8 first, then the detector's guess, then UTF-8 with a byte
/// order mark stripped, then GBK. Encodings that do not decode cleanly are
/// left out.
pub fn decode_candidates(bytes: &[u8]) -> Vec<(&'static Encoding, Cow<'_, str>)> {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let guess = detector.guess(None, true);

    let attempts: [(&'static Encoding, &[u8]); 4] = [
        (UTF_8, bytes),
        (guess, bytes),
        (UTF_8, bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)),
        (GBK, bytes),
    ];
    let mut candidates: Vec<(&'static Encoding, Cow<'_, str>)> = Vec::new();
    for (encoding, input) in attempts {
        let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(input)
        else {
            continue;
        };
        if candidates.iter().any(|(_, seen)| *seen == text) {
            continue;
        }
        candidates.push((encoding, text));
    }
    candidates
}

/// Decode and parse save file bytes.
///
/// Each decoding is parsed in turn and the first one that yields a document
/// wins. Errors other than malformed JSON are returned as soon as they occur.
pub fn parse_bytes(bytes: &[u8]) -> plab_sav::Result<SaveDocument> {
    let mut last_error = None;
    for (encoding, text) in decode_candidates(bytes) {
        let text = text.replace(['\n', '\r'], "");
        match SaveDocument::parse(&text) {
            Ok(document) => {
                log::debug!("Parsed save file as {}", encoding.name());
                return Ok(document);
            }
            Err(SavError::Json(err)) => {
                log::debug!("Not a save document as {}: {err}", encoding.name());
                last_error = Some(err.to_string());
            }
            Err(other) => return Err(other),
        }
    }
    Err(SavError::InvalidFormat(last_error.unwrap_or_else(|| {
        "not valid text in any known encoding".to_string()
    })))
}

/// Read and parse a save file.
pub fn read_document(path: &Path) -> Result<SaveDocument> {
    if !path.exists() {
        return Err(LabError::FileNotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    parse_bytes(&bytes).map_err(|err| match err {
        SavError::InvalidFormat(reason) => {
            SavError::InvalidFormat(format!("{}: {reason}", path.display())).into()
        }
        other => other.into(),
    })
}

/// Encode and write a save file, replacing any previous content atomically.
pub fn write_document(path: &Path, document: &SaveDocument) -> Result<()> {
    let contents = document.to_json_string()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| {
            f.write_all(contents.as_bytes())?;
            f.flush()
        })
        .map_err(|err| match err {
            atomicwrites::Error::Internal(err) | atomicwrites::Error::User(err) => err,
        })?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

/// Preview image stored next to a save file.
pub fn preview_path(sav_path: &Path) -> PathBuf {
    sav_path.with_extension(PREVIEW_EXTENSION)
}

/// Delete a save file and its preview image, ignoring whichever is absent.
pub fn remove_with_preview(sav_path: &Path) -> Result<()> {
    for path in [sav_path.to_path_buf(), preview_path(sav_path)] {
        if path.exists() {
            fs::remove_file(&path)?;
            log::info!("Deleted {}", path.display());
        }
    }
    Ok(())
}

/// Find the save file in `dir` whose `InternalName` is `name`.
///
/// Files that cannot be read as save documents are skipped.
pub fn search_by_name(dir: &Path, name: &str) -> Option<PathBuf> {
    WalkDir::new(dir)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == SAV_EXTENSION))
        .find_map(|entry| match read_document(entry.path()) {
            Ok(doc) if doc.internal_name() == Some(name) => Some(entry.into_path()),
            Ok(_) => None,
            Err(err) => {
                log::debug!("Skipping {}: {err}", entry.path().display());
                None
            }
        })
}
