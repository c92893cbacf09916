//! Storage key generation.

use rand::Rng;
use uuid::Uuid;

const SUFFIX_LEN: usize = 13;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Build a collision-resistant object key:
/// `chat_{user_id}_{unix_millis}_{random}.{ext}`.
pub fn storage_key<R: Rng + ?Sized>(
    user_id: Uuid,
    filename: &str,
    mime_type: &str,
    unix_millis: i64,
    rng: &mut R,
) -> String {
    format!(
        "chat_{}_{}_{}.{}",
        user_id,
        unix_millis,
        random_suffix(rng),
        file_extension(filename, mime_type)
    )
}

/// Lowercase base36 string of fixed length.
pub fn random_suffix<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect()
}

/// Extension taken from the uploaded filename, else from the MIME type.
///
/// Only the last path component counts, and the extension must be 1 to 10
/// ASCII alphanumerics.
pub fn file_extension(filename: &str, mime_type: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let from_name = base
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|e| !e.is_empty() && e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()));

    if let Some(ext) = from_name {
        return ext.to_ascii_lowercase();
    }

    let from_mime = match mime_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        other => mime_guess::get_mime_extensions_str(other).and_then(|exts| exts.first().copied()),
    };

    from_mime.unwrap_or("bin").to_string()
}
