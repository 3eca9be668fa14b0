use crate::domain::model::{FormField, FormPayload};
use crate::domain::ports::FormToolkit;
use crate::utils::error::{FillError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

/// Adapter over the external pdftk/pdftotext binaries. Everything PDF-shaped
/// goes through subprocesses; this crate never parses PDF internals itself.
pub struct PdftkToolkit {
    pdftk_bin: String,
    pdftotext_bin: String,
}

impl PdftkToolkit {
    pub fn new(pdftk_bin: String, pdftotext_bin: String) -> Self {
        Self {
            pdftk_bin,
            pdftotext_bin,
        }
    }

    async fn run(&self, bin: &str, args: &[&str]) -> Result<String> {
        let output = Command::new(bin)
            .args(args)
            .output()
            .await
            .map_err(|e| FillError::Toolkit {
                message: format!("failed to run '{}': {}", bin, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FillError::Toolkit {
                message: format!(
                    "'{}' exited with {}: {}",
                    bin,
                    output.status,
                    stderr.trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn scratch_fdf_path() -> PathBuf {
        std::env::temp_dir().join(format!(
            "formfill_{}_{}.fdf",
            std::process::id(),
            chrono::Utc::now().timestamp_millis()
        ))
    }
}

/// Parse `pdftk <form> dump_data_fields` output. Fields are separated by
/// `---` lines; each line inside a block is `Key: value`. `FieldStateOption`
/// repeats for checkbox/radio fields.
pub fn parse_field_dump(dump: &str) -> Vec<FormField> {
    let mut fields = Vec::new();
    let mut current = FormField::default();
    let mut seen_any = false;

    for line in dump.lines() {
        let line = line.trim();
        if line.starts_with("---") {
            if seen_any && !current.name.is_empty() {
                fields.push(std::mem::take(&mut current));
            }
            seen_any = true;
            continue;
        }
        if let Some((key, value)) = line.split_once(": ") {
            match key {
                "FieldName" => current.name = value.to_string(),
                "FieldNameAlt" => current.alt_text = value.to_string(),
                "FieldType" => current.kind = value.to_string(),
                "FieldStateOption" => current.state_options.push(value.to_string()),
                _ => {}
            }
        }
    }

    if !current.name.is_empty() {
        fields.push(current);
    }

    fields
}

/// Generate an FDF document for `pdftk fill_form`. Only non-empty values are
/// written; backslashes and parentheses are escaped per the FDF grammar.
pub fn build_fdf(payload: &FormPayload) -> String {
    let mut entries: Vec<(&String, &String)> = payload
        .fields
        .iter()
        .filter(|(_, v)| !v.trim().is_empty())
        .collect();
    // Deterministic output keeps the FDF diffable between runs.
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let mut fdf = String::from("%FDF-1.2\n1 0 obj\n<<\n/FDF\n<<\n/Fields [\n");
    for (name, value) in entries {
        let escaped = value
            .replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)");
        fdf.push_str(&format!("<<\n/T ({})\n/V ({})\n>>\n", name, escaped));
    }
    fdf.push_str("]\n>>\n>>\nendobj\ntrailer\n\n<<\n/Root 1 0 R\n>>\n%%EOF\n");
    fdf
}

#[async_trait]
impl FormToolkit for PdftkToolkit {
    async fn dump_fields(&self, form_path: &str) -> Result<Vec<FormField>> {
        let dump = self
            .run(&self.pdftk_bin, &[form_path, "dump_data_fields"])
            .await?;
        let fields = parse_field_dump(&dump);
        tracing::debug!("Dumped {} fields from {}", fields.len(), form_path);
        Ok(fields)
    }

    async fn dump_text(&self, pdf_path: &str) -> Result<String> {
        self.run(&self.pdftotext_bin, &[pdf_path, "-"]).await
    }

    async fn fill_form(
        &self,
        form_path: &str,
        payload: &FormPayload,
        output_path: &str,
    ) -> Result<()> {
        let fdf = build_fdf(payload);
        let fdf_path = Self::scratch_fdf_path();
        tokio::fs::write(&fdf_path, fdf.as_bytes()).await?;

        let fdf_str = fdf_path.to_string_lossy().to_string();
        let result = self
            .run(
                &self.pdftk_bin,
                &[form_path, "fill_form", &fdf_str, "output", output_path],
            )
            .await;

        let _ = tokio::fs::remove_file(&fdf_path).await;
        result.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SAMPLE_DUMP: &str = "---
FieldType: Text
FieldName: Party1[0]
FieldNameAlt: PETITIONER
FieldFlags: 0
FieldJustification: Left
---
FieldType: Text
FieldName: DecimalField40[0]
FieldNameAlt: STUDENT LOANS (Give details.)
FieldFlags: 0
FieldJustification: Right
---
FieldType: Button
FieldName: CheckBox1[0]
FieldStateOption: Off
FieldStateOption: Yes
";

    #[test]
    fn test_parse_field_dump() {
        let fields = parse_field_dump(SAMPLE_DUMP);

        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].name, "Party1[0]");
        assert_eq!(fields[0].alt_text, "PETITIONER");
        assert_eq!(fields[0].kind, "Text");
        assert_eq!(fields[1].name, "DecimalField40[0]");
        assert_eq!(fields[1].alt_text, "STUDENT LOANS (Give details.)");
        assert_eq!(fields[2].state_options, vec!["Off", "Yes"]);
    }

    #[test]
    fn test_parse_field_dump_empty() {
        assert!(parse_field_dump("").is_empty());
    }

    #[test]
    fn test_build_fdf_escapes_and_skips_empty() {
        let mut fields = HashMap::new();
        fields.insert("Party1[0]".to_string(), "TAHIRA FRANCIS".to_string());
        fields.insert(
            "Phone[0]".to_string(),
            "(818) 638-4456".to_string(),
        );
        fields.insert("Empty[0]".to_string(), "  ".to_string());

        let payload = FormPayload {
            fields,
            confidence: HashMap::new(),
        };
        let fdf = build_fdf(&payload);

        assert!(fdf.starts_with("%FDF-1.2"));
        assert!(fdf.contains("/T (Party1[0])\n/V (TAHIRA FRANCIS)"));
        assert!(fdf.contains("/V (\\(818\\) 638-4456)"));
        assert!(!fdf.contains("Empty[0]"));
        assert!(fdf.ends_with("%%EOF\n"));
    }
}
