//! AWS Textract client for document text extraction.
//!
//! Submits stored S3 objects for asynchronous document analysis and turns
//! the returned block soup into the structured company fields the KYB flow
//! stores. The parsing heuristics target Malaysian SSM registration
//! documents: form key-value pairs first, line scanning as fallback.

use aws_config::BehaviorVersion;
use aws_sdk_textract::Client;
use aws_sdk_textract::config::{Credentials, Region};
use aws_sdk_textract::types::{
    Block, BlockType, DocumentLocation, EntityType, FeatureType, JobStatus, RelationshipType,
    S3Object,
};
use std::collections::HashMap;
use tracing::info;

use crate::config::{StorageSettings, TextractSettings};
use crate::error::{AppError, AppResult};
use crate::models::{Director, ExtractedFields};

/// Outcome of a single completion check against Textract.
#[derive(Debug)]
pub enum JobOutcome {
    /// The service is still processing in the background.
    InProgress,
    /// Analysis succeeded; fields parsed from the returned blocks.
    Completed(ExtractedFields),
    /// Terminal provider-side failure.
    Failed(String),
}

/// Textract client wrapper.
#[derive(Clone)]
pub struct TextractClient {
    client: Client,
}

impl TextractClient {
    /// Create a Textract client reusing the object-storage credentials.
    pub fn new(storage: &StorageSettings, settings: &TextractSettings) -> Self {
        let credentials =
            Credentials::new(&storage.access_key, &storage.secret_key, None, None, "kyb");

        let config = aws_sdk_textract::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials)
            .build();

        Self {
            client: Client::from_conf(config),
        }
    }

    /// Start an asynchronous document-analysis job for a stored object.
    ///
    /// Returns the provider job id. The service processes in the background;
    /// completion is observed via [`check_job`](Self::check_job).
    pub async fn start_analysis(&self, bucket: &str, s3_key: &str) -> AppResult<String> {
        let location = DocumentLocation::builder()
            .s3_object(S3Object::builder().bucket(bucket).name(s3_key).build())
            .build();

        let response = self
            .client
            .start_document_analysis()
            .document_location(location)
            .feature_types(FeatureType::Forms)
            .feature_types(FeatureType::Tables)
            .send()
            .await
            .map_err(|e| AppError::Extraction(format!("Failed to start Textract job: {}", e)))?;

        let job_id = response
            .job_id()
            .ok_or_else(|| AppError::Extraction("Textract returned no job id".to_string()))?
            .to_string();

        info!("Started Textract analysis job {} for {}", job_id, s3_key);
        Ok(job_id)
    }

    /// Check a job once and parse results if it finished.
    pub async fn check_job(&self, job_id: &str) -> AppResult<JobOutcome> {
        let response = self
            .client
            .get_document_analysis()
            .job_id(job_id)
            .send()
            .await
            .map_err(|e| AppError::Extraction(format!("Failed to check Textract job: {}", e)))?;

        match response.job_status() {
            Some(JobStatus::Succeeded) | Some(JobStatus::PartialSuccess) => {
                let fields = parse_blocks(response.blocks());
                Ok(JobOutcome::Completed(fields))
            }
            Some(JobStatus::InProgress) => Ok(JobOutcome::InProgress),
            Some(JobStatus::Failed) => Ok(JobOutcome::Failed(
                response
                    .status_message()
                    .unwrap_or("Textract job failed")
                    .to_string(),
            )),
            other => Ok(JobOutcome::Failed(format!(
                "Unexpected Textract job status: {:?}",
                other
            ))),
        }
    }
}

/// Key-name fragments mapped to extracted fields, checked in order.
const KEY_PATTERNS: &[(&str, FieldSlot)] = &[
    ("proposed name", FieldSlot::CompanyName),
    ("name of company", FieldSlot::CompanyName),
    ("company name", FieldSlot::CompanyName),
    ("registration no", FieldSlot::RegistrationNumber),
    ("company no", FieldSlot::RegistrationNumber),
    ("incorporation date", FieldSlot::IncorporationDate),
    ("date of incorporation", FieldSlot::IncorporationDate),
    ("type of company", FieldSlot::CompanyType),
    ("company type", FieldSlot::CompanyType),
    ("business address", FieldSlot::BusinessAddress),
    ("registered address", FieldSlot::BusinessAddress),
    ("telephone", FieldSlot::BusinessPhone),
    ("phone", FieldSlot::BusinessPhone),
];

#[derive(Clone, Copy)]
enum FieldSlot {
    CompanyName,
    RegistrationNumber,
    IncorporationDate,
    CompanyType,
    BusinessAddress,
    BusinessPhone,
}

/// Parse Textract blocks into structured fields.
///
/// FORM key-value pairs are authoritative; LINE scanning only fills the
/// director list, which SSM prints as a section rather than form fields.
pub fn parse_blocks(blocks: &[Block]) -> ExtractedFields {
    let block_map: HashMap<&str, &Block> =
        blocks.iter().filter_map(|b| b.id().map(|id| (id, b))).collect();

    let mut fields = ExtractedFields::default();

    for block in blocks {
        if block.block_type() != Some(&BlockType::KeyValueSet)
            || !block.entity_types().contains(&EntityType::Key)
        {
            continue;
        }

        let key_text = child_text(block, &block_map).to_lowercase();
        let Some(value_text) = value_text(block, &block_map) else {
            continue;
        };
        if value_text.is_empty() {
            continue;
        }

        for (pattern, slot) in KEY_PATTERNS {
            if key_text.contains(pattern) {
                let target = match slot {
                    FieldSlot::CompanyName => &mut fields.company_name,
                    FieldSlot::RegistrationNumber => &mut fields.registration_number,
                    FieldSlot::IncorporationDate => &mut fields.incorporation_date,
                    FieldSlot::CompanyType => &mut fields.company_type,
                    FieldSlot::BusinessAddress => &mut fields.business_address,
                    FieldSlot::BusinessPhone => &mut fields.business_phone,
                };
                if target.is_none() {
                    *target = Some(value_text.clone());
                }
                break;
            }
        }
    }

    fields.directors = extract_directors(blocks);
    fields
}

/// Concatenated text of a block's child WORD blocks.
fn child_text(block: &Block, block_map: &HashMap<&str, &Block>) -> String {
    let mut words = Vec::new();
    for rel in block.relationships() {
        if rel.r#type() != Some(&RelationshipType::Child) {
            continue;
        }
        for id in rel.ids() {
            if let Some(child) = block_map.get(id.as_str()) {
                if child.block_type() == Some(&BlockType::Word) {
                    if let Some(text) = child.text() {
                        words.push(text);
                    }
                }
            }
        }
    }
    words.join(" ")
}

/// Text of the VALUE block linked to a KEY block.
fn value_text(key_block: &Block, block_map: &HashMap<&str, &Block>) -> Option<String> {
    for rel in key_block.relationships() {
        if rel.r#type() != Some(&RelationshipType::Value) {
            continue;
        }
        for id in rel.ids() {
            if let Some(value_block) = block_map.get(id.as_str()) {
                return Some(child_text(value_block, block_map));
            }
        }
    }
    None
}

/// Scan LINE blocks for the director section.
///
/// SSM documents list directors as lines following a "DIRECTOR"/"DIRECTORS"
/// heading; names are uppercase lines until the next heading-looking line.
fn extract_directors(blocks: &[Block]) -> Vec<Director> {
    let lines: Vec<&str> = blocks
        .iter()
        .filter(|b| b.block_type() == Some(&BlockType::Line))
        .filter_map(|b| b.text())
        .collect();

    let mut directors = Vec::new();
    let mut in_section = false;

    for line in lines {
        let trimmed = line.trim();
        let lower = trimmed.to_lowercase();

        if lower == "director" || lower == "directors" || lower.starts_with("director(s)") {
            in_section = true;
            continue;
        }

        if in_section {
            // A new section heading ends the director list
            if trimmed.ends_with(':') || (lower.contains("address") || lower.contains("shareholder"))
            {
                in_section = false;
                continue;
            }
            if looks_like_person_name(trimmed) {
                directors.push(Director {
                    name: trimmed.to_string(),
                    id_number: None,
                });
            }
        }
    }

    directors
}

/// Heuristic: a director line is multi-word, mostly letters, not a label.
fn looks_like_person_name(line: &str) -> bool {
    if line.len() < 4 || !line.contains(' ') {
        return false;
    }
    let alpha = line.chars().filter(|c| c.is_alphabetic() || c.is_whitespace()).count();
    alpha * 10 >= line.chars().count() * 8
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_textract::types::Relationship;

    fn word(id: &str, text: &str) -> Block {
        Block::builder()
            .block_type(BlockType::Word)
            .id(id)
            .text(text)
            .build()
    }

    fn line(text: &str) -> Block {
        Block::builder()
            .block_type(BlockType::Line)
            .id(format!("line-{}", text.len()))
            .text(text)
            .build()
    }

    fn relationship(rel_type: RelationshipType, ids: &[&str]) -> Relationship {
        let mut builder = Relationship::builder().r#type(rel_type);
        for id in ids {
            builder = builder.ids(id.to_string());
        }
        builder.build()
    }

    /// Build a KEY_VALUE_SET pair: key words + value words.
    fn key_value_pair(
        prefix: &str,
        key_words: &[&str],
        value_words: &[&str],
    ) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut key_ids = Vec::new();
        let mut value_ids = Vec::new();

        for (i, w) in key_words.iter().enumerate() {
            let id = format!("{}-kw{}", prefix, i);
            blocks.push(word(&id, w));
            key_ids.push(id);
        }
        for (i, w) in value_words.iter().enumerate() {
            let id = format!("{}-vw{}", prefix, i);
            blocks.push(word(&id, w));
            value_ids.push(id);
        }

        let value_id = format!("{}-value", prefix);
        blocks.push(
            Block::builder()
                .block_type(BlockType::KeyValueSet)
                .entity_types(EntityType::Value)
                .id(&value_id)
                .relationships(relationship(
                    RelationshipType::Child,
                    &value_ids.iter().map(String::as_str).collect::<Vec<_>>(),
                ))
                .build(),
        );

        blocks.push(
            Block::builder()
                .block_type(BlockType::KeyValueSet)
                .entity_types(EntityType::Key)
                .id(format!("{}-key", prefix))
                .relationships(relationship(
                    RelationshipType::Child,
                    &key_ids.iter().map(String::as_str).collect::<Vec<_>>(),
                ))
                .relationships(relationship(RelationshipType::Value, &[&value_id]))
                .build(),
        );

        blocks
    }

    #[test]
    fn test_parse_form_fields() {
        let mut blocks = Vec::new();
        blocks.extend(key_value_pair(
            "a",
            &["Proposed", "Name"],
            &["AutoTest", "Solutions", "Bhd"],
        ));
        blocks.extend(key_value_pair("b", &["Registration", "No."], &["202301012345"]));
        blocks.extend(key_value_pair("c", &["Incorporation", "Date"], &["15/01/2023"]));

        let fields = parse_blocks(&blocks);
        assert_eq!(fields.company_name.as_deref(), Some("AutoTest Solutions Bhd"));
        assert_eq!(fields.registration_number.as_deref(), Some("202301012345"));
        assert_eq!(fields.incorporation_date.as_deref(), Some("15/01/2023"));
        assert!(fields.company_type.is_none());
    }

    #[test]
    fn test_first_match_wins_per_field() {
        let mut blocks = Vec::new();
        blocks.extend(key_value_pair("a", &["Company", "Name"], &["First", "Sdn", "Bhd"]));
        blocks.extend(key_value_pair("b", &["Name", "of", "Company"], &["Second"]));

        let fields = parse_blocks(&blocks);
        assert_eq!(fields.company_name.as_deref(), Some("First Sdn Bhd"));
    }

    #[test]
    fn test_empty_values_are_skipped() {
        let blocks: Vec<Block> = key_value_pair("a", &["Company", "Name"], &[]);
        let fields = parse_blocks(&blocks);
        assert!(fields.company_name.is_none());
    }

    #[test]
    fn test_director_section_scan() {
        let blocks = vec![
            line("COMPANY PROFILE"),
            line("DIRECTORS"),
            line("AHMAD BIN ABDULLAH"),
            line("SITI BINTI HASSAN"),
            line("REGISTERED ADDRESS"),
            line("12 JALAN AMPANG"),
        ];

        let fields = parse_blocks(&blocks);
        let names: Vec<&str> = fields.directors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["AHMAD BIN ABDULLAH", "SITI BINTI HASSAN"]);
    }

    #[test]
    fn test_no_directors_without_heading() {
        let blocks = vec![line("AHMAD BIN ABDULLAH"), line("SITI BINTI HASSAN")];
        let fields = parse_blocks(&blocks);
        assert!(fields.directors.is_empty());
    }
}
