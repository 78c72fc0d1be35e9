//! Upload validation and blob file naming.

use crate::errors::AppError;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
const PDF_MAGIC: &[u8] = b"%PDF";
const MAX_USER_ID_LEN: usize = 64;

/// Checks an uploaded file: PDF MIME type, non-empty, within `max_bytes`,
/// and starting with the `%PDF` header.
pub fn validate_pdf_upload(
    content_type: Option<&str>,
    bytes: &[u8],
    max_bytes: usize,
) -> Result<(), AppError> {
    let essence = content_type
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .unwrap_or_default();
    if !essence.eq_ignore_ascii_case(PDF_CONTENT_TYPE) {
        return Err(AppError::Validation(
            "Only PDF files are allowed".to_string(),
        ));
    }

    if bytes.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }

    if bytes.len() > max_bytes {
        return Err(AppError::Validation(format!(
            "File size must be less than {}MB",
            max_bytes / (1024 * 1024)
        )));
    }

    if !bytes.starts_with(PDF_MAGIC) {
        return Err(AppError::Validation(
            "Uploaded file is not a valid PDF document".to_string(),
        ));
    }

    Ok(())
}

/// User ids end up in blob keys, so only a conservative character set is accepted.
pub fn validate_user_id(user_id: &str) -> Result<(), AppError> {
    let valid = !user_id.is_empty()
        && user_id.len() <= MAX_USER_ID_LEN
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '@'))
        && user_id != "."
        && user_id != "..";
    if valid {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "user_id must be 1-{MAX_USER_ID_LEN} characters of letters, digits, '_', '-', '.' or '@'"
        )))
    }
}

/// `<stem>_<user>_<millis>.pdf`, with every character outside `[A-Za-z0-9.-]`
/// in the original name replaced by `_` and its extension removed.
pub fn resume_file_name(original_name: &str, user_id: &str, timestamp_millis: i64) -> String {
    let stem = sanitized_stem(original_name);
    format!("{stem}_{user_id}_{timestamp_millis}.pdf")
}

/// `resume[_<job>][_<company>]_<millis>.pdf` for exported PDFs, with every
/// non-alphanumeric character replaced by `_`.
pub fn export_file_name(
    job_title: Option<&str>,
    company: Option<&str>,
    timestamp_millis: i64,
) -> String {
    let mut name = String::from("resume");
    for part in [job_title, company].into_iter().flatten() {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        name.push('_');
        name.extend(
            part.chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }),
        );
    }
    format!("{name}_{timestamp_millis}.pdf")
}

fn sanitized_stem(name: &str) -> String {
    let clean: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let stem = match clean.rfind('.') {
        Some(dot) if dot + 1 < clean.len() => &clean[..dot],
        _ => clean.as_str(),
    };

    if stem.is_empty() {
        "resume".to_string()
    } else {
        stem.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEN_MB: usize = 10 * 1024 * 1024;

    #[test]
    fn test_accepts_pdf() {
        assert!(validate_pdf_upload(Some("application/pdf"), b"%PDF-1.7\n...", TEN_MB).is_ok());
        assert!(validate_pdf_upload(Some("Application/PDF; name=cv"), b"%PDF-1.4", TEN_MB).is_ok());
    }

    #[test]
    fn test_rejects_wrong_type() {
        let err = validate_pdf_upload(Some("image/png"), b"%PDF-1.7", TEN_MB).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("Only PDF")));
        assert!(validate_pdf_upload(None, b"%PDF-1.7", TEN_MB).is_err());
    }

    #[test]
    fn test_rejects_empty_and_oversized() {
        assert!(validate_pdf_upload(Some("application/pdf"), b"", TEN_MB).is_err());

        let big = vec![b'%'; TEN_MB + 1];
        let err = validate_pdf_upload(Some("application/pdf"), &big, TEN_MB).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("10MB")));
    }

    #[test]
    fn test_size_ceiling_is_inclusive() {
        let mut exact = b"%PDF".to_vec();
        exact.resize(TEN_MB, b' ');
        assert!(validate_pdf_upload(Some("application/pdf"), &exact, TEN_MB).is_ok());
    }

    #[test]
    fn test_rejects_missing_magic() {
        let err = validate_pdf_upload(Some("application/pdf"), b"<html>", TEN_MB).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_file_name_is_sanitized() {
        assert_eq!(
            resume_file_name("My Resume (final).pdf", "user_42", 1700000000000),
            "My_Resume__final__user_42_1700000000000.pdf"
        );
        assert_eq!(resume_file_name("cv.v2.pdf", "u", 1), "cv.v2_u_1.pdf");
        assert_eq!(resume_file_name("résumé", "u", 1), "r_sum__u_1.pdf");
        assert_eq!(resume_file_name(".pdf", "u", 1), "resume_u_1.pdf");
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name(None, None, 7), "resume_7.pdf");
        assert_eq!(
            export_file_name(Some("Data Engineer"), Some("Acme, Inc."), 1700000000000),
            "resume_Data_Engineer_Acme__Inc__1700000000000.pdf"
        );
        assert_eq!(export_file_name(Some("  "), Some("Initech"), 1), "resume_Initech_1.pdf");
    }

    #[test]
    fn test_user_id_character_set() {
        assert!(validate_user_id("user_1700000000000").is_ok());
        assert!(validate_user_id("ada@example.com").is_ok());
        assert!(validate_user_id("").is_err());
        assert!(validate_user_id("../etc").is_err());
        assert!(validate_user_id("a/b").is_err());
        assert!(validate_user_id(&"x".repeat(65)).is_err());
    }
}
