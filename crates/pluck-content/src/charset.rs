//! Character encoding guess for served files

use chardetng::EncodingDetector;
use tracing::debug;

/// Guess the charset label of a file, lower-cased
///
/// Valid UTF-8 (including pure ASCII) is always `utf-8`; anything else gets
/// the detector's best legacy-encoding guess.
pub fn guess_charset(buf: &[u8]) -> String {
    if std::str::from_utf8(buf).is_ok() {
        return "utf-8".to_string();
    }

    let mut detector = EncodingDetector::new();
    detector.feed(buf, true);
    let label = detector.guess(None, false).name().to_ascii_lowercase();
    debug!("Content is not UTF-8, guessed {}", label);
    label
}
