//! `.tgz` construction and extraction (§6): gzip-compressed tar, root
//! `manifest.json`, every other path a declared `manifest.files` entry, no
//! symlinks or device nodes.

use libreseed_types::error::ValidationError;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::BTreeMap;
use std::io::Read;
use tar::EntryType;

/// An in-memory file to be packed into a tarball.
pub struct TarballEntry {
    /// Tarball-relative path (e.g. `"manifest.json"`, `"src/lib.rs"`).
    pub path: String,
    /// Raw file contents.
    pub contents: Vec<u8>,
}

/// Packs `entries` into a gzip-compressed tar (`.tgz`) byte stream.
///
/// Callers are responsible for ensuring `manifest.json` is among `entries`
/// and that every other path matches a key in its `files` map (§6) — this
/// function only performs the mechanical packing.
pub fn pack_tarball(entries: &[TarballEntry]) -> Result<Vec<u8>, ValidationError> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for entry in entries {
        let mut header = tar::Header::new_gnu();
        header
            .set_path(&entry.path)
            .map_err(|e| ValidationError::SchemaInvalid(format!("tar path {}: {e}", entry.path)))?;
        header.set_size(entry.contents.len() as u64);
        header.set_entry_type(EntryType::Regular);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append(&header, entry.contents.as_slice())
            .map_err(|e| ValidationError::SchemaInvalid(format!("tar append: {e}")))?;
    }
    let encoder = builder
        .into_inner()
        .map_err(|e| ValidationError::SchemaInvalid(format!("tar finish: {e}")))?;
    encoder
        .finish()
        .map_err(|e| ValidationError::SchemaInvalid(format!("gzip finish: {e}")))
}

/// Unpacks a `.tgz` byte stream, enforcing the §6 layout rules: a root
/// `manifest.json` must be present, and no entry may be a symlink, hardlink,
/// character device, block device, or FIFO.
///
/// Returns the decoded files keyed by tarball-relative path, including
/// `manifest.json` itself (callers extract and re-parse it separately).
pub fn unpack_tarball(tgz_bytes: &[u8]) -> Result<BTreeMap<String, Vec<u8>>, ValidationError> {
    let decoder = GzDecoder::new(tgz_bytes);
    let mut archive = tar::Archive::new(decoder);
    let mut out = BTreeMap::new();

    let entries = archive
        .entries()
        .map_err(|e| ValidationError::SchemaInvalid(format!("tar read: {e}")))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| ValidationError::SchemaInvalid(format!("tar entry: {e}")))?;
        let entry_type = entry.header().entry_type();
        if matches!(
            entry_type,
            EntryType::Symlink
                | EntryType::Link
                | EntryType::Char
                | EntryType::Block
                | EntryType::Fifo
        ) {
            return Err(ValidationError::SchemaInvalid(format!(
                "tarball contains a disallowed entry type: {entry_type:?}"
            )));
        }
        if entry_type.is_dir() {
            continue;
        }
        let path = entry
            .path()
            .map_err(|e| ValidationError::SchemaInvalid(format!("tar entry path: {e}")))?
            .to_string_lossy()
            .into_owned();
        let mut contents = Vec::new();
        entry
            .read_to_end(&mut contents)
            .map_err(|e| ValidationError::SchemaInvalid(format!("tar read entry {path}: {e}")))?;
        out.insert(path, contents);
    }

    if !out.contains_key("manifest.json") {
        return Err(ValidationError::FieldMissing("manifest.json"));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_then_unpack_roundtrips() {
        let entries = vec![
            TarballEntry {
                path: "manifest.json".into(),
                contents: b"{}".to_vec(),
            },
            TarballEntry {
                path: "a.txt".into(),
                contents: b"hi\n".to_vec(),
            },
        ];
        let tgz = pack_tarball(&entries).unwrap();
        let unpacked = unpack_tarball(&tgz).unwrap();
        assert_eq!(unpacked.get("manifest.json"), Some(&b"{}".to_vec()));
        assert_eq!(unpacked.get("a.txt"), Some(&b"hi\n".to_vec()));
    }

    #[test]
    fn missing_manifest_json_is_rejected() {
        let entries = vec![TarballEntry {
            path: "a.txt".into(),
            contents: b"hi\n".to_vec(),
        }];
        let tgz = pack_tarball(&entries).unwrap();
        assert!(unpack_tarball(&tgz).is_err());
    }

    #[test]
    fn symlink_entry_is_rejected() {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);

        let mut manifest_header = tar::Header::new_gnu();
        manifest_header.set_path("manifest.json").unwrap();
        manifest_header.set_size(2);
        manifest_header.set_cksum();
        builder.append(&manifest_header, b"{}".as_slice()).unwrap();

        let mut link_header = tar::Header::new_gnu();
        link_header.set_path("evil-link").unwrap();
        link_header.set_entry_type(EntryType::Symlink);
        link_header.set_link_name("/etc/passwd").unwrap();
        link_header.set_size(0);
        link_header.set_cksum();
        builder.append(&link_header, &[][..]).unwrap();

        let encoder = builder.into_inner().unwrap();
        let tgz = encoder.finish().unwrap();

        assert!(unpack_tarball(&tgz).is_err());
    }
}
