//! First-run setup of the NLP corpora.
//!
//! Unless a prepared `NLP_DATA_DIR` is configured, the WordNet noun index and
//! exception list are downloaded once into an `nltk_data`-style cache and
//! reused on later starts. The embedded resources are only an offline fallback.

use flate2::read::GzDecoder;
use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Settings;
use crate::error::ArtifactError;
use crate::stopwords::EMBEDDED_ENGLISH;

const WORDNET_FILES: [&str; 2] = ["index.noun", "noun.exc"];

fn wordnet_dir(root: &Path) -> PathBuf {
    root.join("corpora").join("wordnet")
}

fn stopwords_path(root: &Path) -> PathBuf {
    root.join("corpora").join("stopwords").join("english")
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ArtifactError + '_ {
    move |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Write through a `.part` file so an interrupted run never leaves a
/// truncated file that looks cached.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ArtifactError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".part");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, bytes).map_err(io_error(&tmp))?;
    std::fs::rename(&tmp, path).map_err(io_error(path))
}

pub fn wordnet_cached(root: &Path) -> bool {
    let dir = wordnet_dir(root);
    WORDNET_FILES.iter().all(|name| dir.join(name).is_file())
}

/// NLTK's English list is small and fixed, so it is written from the copy
/// compiled into the binary rather than downloaded.
pub fn install_stopwords(root: &Path) -> Result<(), ArtifactError> {
    let path = stopwords_path(root);
    if path.is_file() {
        return Ok(());
    }
    write_atomic(&path, EMBEDDED_ENGLISH.as_bytes())
}

/// Extract `dict/index.noun` and `dict/noun.exc` from a WordNet release tarball.
pub fn install_wordnet(archive: &[u8], root: &Path, url: &str) -> Result<(), ArtifactError> {
    let archive_path = PathBuf::from(url);
    let mut tarball = tar::Archive::new(GzDecoder::new(archive));
    let mut found: Vec<&'static str> = Vec::new();

    for entry in tarball.entries().map_err(io_error(&archive_path))? {
        let mut entry = entry.map_err(io_error(&archive_path))?;
        let path = entry.path().map_err(io_error(&archive_path))?.into_owned();

        let in_dict = path.parent().and_then(Path::file_name) == Some(OsStr::new("dict"));
        let Some(&name) = WORDNET_FILES
            .iter()
            .find(|name| path.file_name() == Some(OsStr::new(name)))
        else {
            continue;
        };
        if !in_dict || found.contains(&name) {
            continue;
        }

        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .map_err(io_error(&archive_path))?;
        write_atomic(&wordnet_dir(root).join(name), &bytes)?;
        found.push(name);
    }

    match WORDNET_FILES.iter().find(|name| !found.contains(*name)) {
        Some(missing) => Err(ArtifactError::MissingArchiveEntry {
            url: url.to_string(),
            entry: *missing,
        }),
        None => Ok(()),
    }
}

async fn download(url: &str) -> Result<Vec<u8>, ArtifactError> {
    let to_error = |source| ArtifactError::Download {
        url: url.to_string(),
        source,
    };
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(300))
        .build()
        .map_err(to_error)?;
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(to_error)?;
    let bytes = response.bytes().await.map_err(to_error)?;
    Ok(bytes.to_vec())
}

/// Make sure `root` holds the stopword list and the WordNet noun files,
/// downloading WordNet only when it is not cached yet.
pub async fn ensure_cached(root: &Path, wordnet_url: &str) -> Result<(), ArtifactError> {
    install_stopwords(root)?;
    if wordnet_cached(root) {
        info!(dir = %root.display(), "using cached WordNet");
        return Ok(());
    }

    info!(url = wordnet_url, "fetching WordNet (first run)");
    let archive = download(wordnet_url).await?;
    let root_owned = root.to_path_buf();
    let url_owned = wordnet_url.to_string();
    tokio::task::spawn_blocking(move || install_wordnet(&archive, &root_owned, &url_owned))
        .await
        .map_err(|e| ArtifactError::Io {
            path: root.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e),
        })??;
    info!(dir = %root.display(), "WordNet cached");
    Ok(())
}

/// Resolve the directory the normalizer should load from.
///
/// `None` means the embedded resources: either `NLP_OFFLINE` is set or the
/// fetch failed. A configured `NLP_DATA_DIR` is returned untouched.
pub async fn prepare(settings: &Settings) -> Option<PathBuf> {
    if let Some(dir) = &settings.nlp_data_dir {
        return Some(dir.clone());
    }
    if settings.nlp_offline {
        warn!("NLP_OFFLINE is set: using the embedded lexicon, lemmas may differ from WordNet");
        return None;
    }
    match ensure_cached(&settings.nlp_cache_dir, &settings.wordnet_url).await {
        Ok(()) => Some(settings.nlp_cache_dir.clone()),
        Err(e) => {
            warn!(
                error = %e,
                "could not prepare WordNet: falling back to the embedded lexicon, lemmas may differ"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::TextNormalizer;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    const UNREACHABLE: &str = "http://127.0.0.1:9/WordNet-3.0.tar.gz";

    // Lines in the WordNet 3.0 database layout.
    const INDEX_NOUN: &str = "  1 This software and database is being provided to you, the LICENSEE, by  \n\
  2 Princeton University under the following license.  By obtaining, using  \n\
con n 3 2 @ ~ 3 0 06722453 07229148 05832924  \n\
cover n 11 5 @ ~ #p %p + 11 4 06996553 03122748 04169707 07338717  \n\
earbud n 1 1 @ 1 0 03249342  \n\
goose n 3 3 @ ~ #m 3 1 01855672 07646821 10138767  \n\
pro n 3 3 @ ~ + 3 0 10484858 06722453 07170753  \n\
pros_and_cons n 1 1 @ 1 0 06722613  \n";

    const NOUN_EXC: &str = "geese goose\nmice mouse\n";

    fn tarball(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut bytes = Vec::new();
        {
            let gz = GzEncoder::new(&mut bytes, Compression::default());
            let mut builder = tar::Builder::new(gz);
            for (path, content) in entries {
                let mut header = tar::Header::new_gnu();
                header.set_size(content.len() as u64);
                header.set_mode(0o644);
                header.set_cksum();
                builder
                    .append_data(&mut header, path, content.as_bytes())
                    .unwrap();
            }
            builder.into_inner().unwrap().finish().unwrap();
        }
        bytes
    }

    fn wordnet_release() -> Vec<u8> {
        tarball(&[
            ("WordNet-3.0/README", "WordNet Release 3.0"),
            ("WordNet-3.0/doc/index.noun", "decoy n 1 1 @ 1 0 00000000"),
            ("WordNet-3.0/dict/index.noun", INDEX_NOUN),
            ("WordNet-3.0/dict/noun.exc", NOUN_EXC),
        ])
    }

    #[test]
    fn test_install_wordnet_matches_wordnet_lemmas() {
        let root = tempfile::tempdir().unwrap();
        install_stopwords(root.path()).unwrap();
        install_wordnet(&wordnet_release(), root.path(), UNREACHABLE).unwrap();
        assert!(wordnet_cached(root.path()));

        let normalizer = TextNormalizer::from_data_dir(root.path()).unwrap();
        assert_eq!(
            normalizer.clean_text("Pros and cons: earbuds, covers, geese"),
            "pro con earbud cover goose"
        );
        assert_eq!(normalizer.lexicon_size(), 5);
    }

    #[test]
    fn test_install_wordnet_requires_both_files() {
        let root = tempfile::tempdir().unwrap();
        let archive = tarball(&[("WordNet-3.0/dict/index.noun", INDEX_NOUN)]);
        let err = install_wordnet(&archive, root.path(), UNREACHABLE).unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::MissingArchiveEntry {
                entry: "noun.exc",
                ..
            }
        ));
        assert!(!wordnet_cached(root.path()));
    }

    #[test]
    fn test_install_wordnet_rejects_garbage() {
        let root = tempfile::tempdir().unwrap();
        assert!(install_wordnet(b"<html>not found</html>", root.path(), UNREACHABLE).is_err());
    }

    #[test]
    fn test_install_stopwords_keeps_existing_list() {
        let root = tempfile::tempdir().unwrap();
        let path = stopwords_path(root.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "custom\n").unwrap();
        install_stopwords(root.path()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "custom\n");
    }

    #[tokio::test]
    async fn test_cached_wordnet_is_not_fetched_again() {
        let root = tempfile::tempdir().unwrap();
        install_wordnet(&wordnet_release(), root.path(), UNREACHABLE).unwrap();
        ensure_cached(root.path(), UNREACHABLE).await.unwrap();
        assert!(stopwords_path(root.path()).is_file());
    }

    #[tokio::test]
    async fn test_download_failure_is_reported() {
        let root = tempfile::tempdir().unwrap();
        let err = ensure_cached(root.path(), UNREACHABLE).await.unwrap_err();
        assert!(matches!(err, ArtifactError::Download { .. }));
        assert!(!wordnet_cached(root.path()));
    }

    #[tokio::test]
    async fn test_prepare_resolution() {
        let root = tempfile::tempdir().unwrap();

        let configured = Settings {
            nlp_data_dir: Some(PathBuf::from("/srv/nltk_data")),
            wordnet_url: UNREACHABLE.to_string(),
            ..Settings::default()
        };
        assert_eq!(prepare(&configured).await, Some(PathBuf::from("/srv/nltk_data")));

        let offline = Settings {
            nlp_offline: true,
            nlp_cache_dir: root.path().to_path_buf(),
            ..Settings::default()
        };
        assert_eq!(prepare(&offline).await, None);
        assert!(!stopwords_path(root.path()).exists());

        let unreachable = Settings {
            nlp_cache_dir: root.path().to_path_buf(),
            wordnet_url: UNREACHABLE.to_string(),
            ..Settings::default()
        };
        assert_eq!(prepare(&unreachable).await, None);

        install_wordnet(&wordnet_release(), root.path(), UNREACHABLE).unwrap();
        assert_eq!(
            prepare(&unreachable).await,
            Some(root.path().to_path_buf())
        );
    }
}
