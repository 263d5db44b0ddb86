use crate::model::HallucinationKind;

/// Classifies judge evidence and reasoning by keyword, first rule wins.
pub fn judge_text_kind(text: &str) -> HallucinationKind {
    let t = text.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| t.contains(w));

    if t.contains("import") && has(&["wrong", "incorrect", "path"]) {
        HallucinationKind::WrongImportPath
    } else if has(&["parameter", "argument"]) {
        HallucinationKind::WrongParameter
    } else if has(&["deprecated", "removed", "older", "outdated"]) {
        HallucinationKind::OutdatedApi
    } else if has(&["future", "newer", "not yet", "not available"]) {
        HallucinationKind::FutureApi
    } else if has(&["mixed", "different version", "mismatch"]) {
        HallucinationKind::VersionMismatch
    } else {
        HallucinationKind::InventedMethod
    }
}

/// Whether a rubric criterion is about hallucinations rather than task goals.
pub fn is_hallucination_criterion(name: &str) -> bool {
    let n = name.to_lowercase();
    n.contains("hallucination") || n.contains("invented")
}
