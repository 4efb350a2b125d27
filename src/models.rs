use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::layout::CaptionStyle;

pub const CAPTION_MAX_CHARS: usize = 68;

// POST /api/generate-image body. Both generators share the endpoint, the fields
// present decide which one handles the request.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePayload {
    pub isi: Option<String>,
    pub option: Option<String>,
    pub profile: Option<String>,
    pub name: Option<String>,
    pub high_school: Option<String>,
    pub jurusan: Option<String>,
    pub desc_bronze: Option<String>,
    pub desc_silver: Option<String>,
}

// Single free-text caption
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionRequest {
    pub isi: String,
    pub option: Option<String>,
    pub style: CaptionStyle,
}

// Certificate card with a remote profile photo
#[derive(Clone, Debug, PartialEq)]
pub struct CertificateRequest {
    pub profile: String,
    pub name: String,
    pub high_school: String,
    pub jurusan: String,
    pub desc_bronze: String,
    pub desc_silver: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GenerationRequest {
    Caption(CaptionRequest),
    Certificate(CertificateRequest),
}

struct LengthRule {
    label: &'static str,
    max: usize,
}

const NAME_RULE: LengthRule = LengthRule { label: "Nama", max: 7 };
const HIGH_SCHOOL_RULE: LengthRule = LengthRule { label: "Asal sekolah", max: 9 };
const JURUSAN_RULE: LengthRule = LengthRule { label: "Jurusan", max: 20 };
const DESC_BRONZE_RULE: LengthRule = LengthRule { label: "Deskripsi bronze", max: 100 };
const DESC_SILVER_RULE: LengthRule = LengthRule { label: "Deskripsi silver", max: 100 };

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("Parameter \"{field}\" wajib diisi."))),
    }
}

fn within(value: &str, rule: &LengthRule) -> Result<(), AppError> {
    if value.chars().count() > rule.max {
        return Err(AppError::Validation(format!(
            "{} tidak boleh lebih dari {} karakter.",
            rule.label, rule.max
        )));
    }
    Ok(())
}

impl GeneratePayload {
    pub fn is_certificate(&self) -> bool {
        self.profile.is_some()
            || self.name.is_some()
            || self.high_school.is_some()
            || self.jurusan.is_some()
            || self.desc_bronze.is_some()
            || self.desc_silver.is_some()
    }

    /// Checks presence first, then lengths; the first violation is returned.
    pub fn validate(self) -> Result<GenerationRequest, AppError> {
        if self.is_certificate() {
            self.validate_certificate().map(GenerationRequest::Certificate)
        } else {
            self.validate_caption().map(GenerationRequest::Caption)
        }
    }

    fn validate_caption(self) -> Result<CaptionRequest, AppError> {
        let isi = required(self.isi, "isi")?;
        if isi.chars().count() > CAPTION_MAX_CHARS {
            return Err(AppError::Validation(format!(
                "Teks tidak boleh lebih dari {CAPTION_MAX_CHARS} karakter."
            )));
        }

        let style = CaptionStyle::from_option(self.option.as_deref());
        Ok(CaptionRequest {
            isi,
            option: self.option,
            style,
        })
    }

    fn validate_certificate(self) -> Result<CertificateRequest, AppError> {
        let card = CertificateRequest {
            profile: required(self.profile, "profile")?,
            name: required(self.name, "name")?,
            high_school: required(self.high_school, "highSchool")?,
            jurusan: required(self.jurusan, "jurusan")?,
            desc_bronze: required(self.desc_bronze, "descBronze")?,
            desc_silver: required(self.desc_silver, "descSilver")?,
        };

        within(&card.name, &NAME_RULE)?;
        within(&card.high_school, &HIGH_SCHOOL_RULE)?;
        within(&card.jurusan, &JURUSAN_RULE)?;
        within(&card.desc_bronze, &DESC_BRONZE_RULE)?;
        within(&card.desc_silver, &DESC_SILVER_RULE)?;

        Ok(card)
    }
}

// Body of the fire-and-forget notification
#[derive(Serialize, Clone, Debug)]
pub struct Notification {
    pub ip: String,
    pub host: String,
    pub data: NotificationData,
}

#[derive(Serialize, Clone, Debug)]
pub struct NotificationData {
    pub isi: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: AppError) -> String {
        match err {
            AppError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    fn certificate() -> GeneratePayload {
        serde_json::from_value(serde_json::json!({
            "profile": "https://example.com/me.jpg",
            "name": "Budi",
            "highSchool": "SMAN 1",
            "jurusan": "IPA",
            "descBronze": "Juara harapan",
            "descSilver": "Peserta aktif"
        }))
        .unwrap()
    }

    #[test]
    fn caption_with_option() {
        let payload: GeneratePayload =
            serde_json::from_str(r#"{"isi":"Hello world","option":"type2"}"#).unwrap();

        match payload.validate().unwrap() {
            GenerationRequest::Caption(c) => {
                assert_eq!(c.isi, "Hello world");
                assert_eq!(c.style, CaptionStyle::Type2);
                assert_eq!(c.option.as_deref(), Some("type2"));
            }
            other => panic!("expected caption, got {other:?}"),
        }
    }

    #[test]
    fn caption_requires_isi() {
        let err = GeneratePayload::default().validate().unwrap_err();
        assert_eq!(message(err), "Parameter \"isi\" wajib diisi.");

        let payload = GeneratePayload {
            isi: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(payload.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn caption_length_boundary() {
        let ok = GeneratePayload {
            isi: Some("a".repeat(68)),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let too_long = GeneratePayload {
            isi: Some("a".repeat(69)),
            ..Default::default()
        };
        assert_eq!(
            message(too_long.validate().unwrap_err()),
            "Teks tidak boleh lebih dari 68 karakter."
        );
    }

    #[test]
    fn caption_length_counts_characters_not_bytes() {
        let payload = GeneratePayload {
            isi: Some("é".repeat(68)),
            ..Default::default()
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn certificate_fields_are_detected_and_parsed() {
        match certificate().validate().unwrap() {
            GenerationRequest::Certificate(c) => {
                assert_eq!(c.name, "Budi");
                assert_eq!(c.high_school, "SMAN 1");
                assert_eq!(c.desc_silver, "Peserta aktif");
            }
            other => panic!("expected certificate, got {other:?}"),
        }
    }

    #[test]
    fn certificate_missing_field_reports_first_missing() {
        let mut payload = certificate();
        payload.jurusan = None;
        payload.desc_silver = None;

        assert_eq!(
            message(payload.validate().unwrap_err()),
            "Parameter \"jurusan\" wajib diisi."
        );
    }

    #[test]
    fn certificate_name_of_eight_chars_is_rejected() {
        let mut payload = certificate();
        payload.name = Some("Abcdefgh".to_string());

        assert_eq!(
            message(payload.validate().unwrap_err()),
            "Nama tidak boleh lebih dari 7 karakter."
        );
    }

    #[test]
    fn high_school_limit_matches_its_message() {
        let mut payload = certificate();
        payload.high_school = Some("SMAN 1 JKT".to_string());
        assert_eq!(
            message(payload.validate().unwrap_err()),
            "Asal sekolah tidak boleh lebih dari 9 karakter."
        );

        let mut payload = certificate();
        payload.high_school = Some("SMAN 1 JK".to_string());
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn description_limits() {
        let mut payload = certificate();
        payload.desc_bronze = Some("x".repeat(101));
        assert_eq!(
            message(payload.validate().unwrap_err()),
            "Deskripsi bronze tidak boleh lebih dari 100 karakter."
        );

        let mut payload = certificate();
        payload.desc_silver = Some("x".repeat(100));
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn notification_omits_missing_option() {
        let note = Notification {
            ip: "1.2.3.4".to_string(),
            host: "localhost:8080".to_string(),
            data: NotificationData {
                isi: "Hello".to_string(),
                option: None,
            },
        };
        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value["data"], serde_json::json!({ "isi": "Hello" }));

        let mut note = note;
        note.data.option = Some("type1".to_string());
        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value["data"]["option"], "type1");
    }
}
