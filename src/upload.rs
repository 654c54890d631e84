//! Upload / read-back contract (`spec.md` §6 HTTP surface, expressed as
//! plain functions rather than a bound web framework — see `DESIGN.md`).

use serde::Serialize;

use crate::assets::AssetStore;
use crate::config::Config;
use crate::error::ExtractError;
use crate::model::{QuestionRecord, StoredQuestion};
use crate::pdf;
use crate::store::QuestionStore;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UploadOutcome {
    pub count: usize,
    pub redirect: &'static str,
}

/// Validate, extract, and persist one uploaded file's bytes.
///
/// Maps onto the original HTTP status classes: a non-`.pdf` filename is a
/// client error ([`ExtractError::IngestFormat`], 400), an unreadable PDF is
/// a server error ([`ExtractError::IngestRead`], 500), and a PDF with zero
/// recognizable questions is unprocessable ([`ExtractError::NoQuestions`],
/// 422).
pub fn handle_upload(
    bytes: &[u8],
    filename: &str,
    store: &dyn QuestionStore,
    assets: &mut dyn AssetStore,
    config: &Config,
) -> Result<UploadOutcome, ExtractError> {
    if !filename.to_ascii_lowercase().ends_with(".pdf") {
        return Err(ExtractError::IngestFormat(filename.to_string()));
    }

    let output = pdf::extract(bytes, config, assets)?;

    store.reset();
    let count = output.records.len();
    store.insert_all(output.records);

    Ok(UploadOutcome {
        count,
        redirect: "/test",
    })
}

pub fn read_all_questions(store: &dyn QuestionStore) -> Vec<StoredQuestion> {
    store.all_ordered()
}

pub fn read_all_question_records(store: &dyn QuestionStore) -> Vec<QuestionRecord> {
    store.all_ordered().into_iter().map(|s| s.record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::InMemoryAssetStore;
    use crate::store::InMemoryQuestionStore;

    #[test]
    fn rejects_non_pdf_filenames() {
        let store = InMemoryQuestionStore::default();
        let mut assets = InMemoryAssetStore::default();
        let config = Config::default();
        let result = handle_upload(b"whatever", "notes.txt", &store, &mut assets, &config);
        assert!(matches!(result, Err(ExtractError::IngestFormat(_))));
    }

    #[test]
    fn rejects_unreadable_pdf_bytes() {
        let store = InMemoryQuestionStore::default();
        let mut assets = InMemoryAssetStore::default();
        let config = Config::default();
        let result = handle_upload(b"not a real pdf", "paper.pdf", &store, &mut assets, &config);
        assert!(result.is_err());
    }
}
