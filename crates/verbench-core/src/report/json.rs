use crate::model::EvaluationReport;
use std::path::Path;

pub fn write_json(reports: &[EvaluationReport], out: &Path) -> anyhow::Result<()> {
    let v = serde_json::json!({
        "generated_by": concat!("verbench ", env!("CARGO_PKG_VERSION")),
        "reports": reports,
    });
    std::fs::write(out, serde_json::to_string_pretty(&v)?)?;
    Ok(())
}
