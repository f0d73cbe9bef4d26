//! Binary serialization and deserialization of compiled rule sets.
//!
//! This module provides a stable binary format for persisting compiled
//! [`RuleSet`](crate::RuleSet) values, so rule definitions can be compiled
//! once and the result cached. The format consists of a 32-byte fixed
//! header followed by a bincode-encoded payload.
//!
//! ## Wire Format
//!
//! ```text
//! Offset  Size  Field
//! 0       4     Magic bytes: b"TGMT"
//! 4       2     Format version (u16, little-endian)
//! 6       2     Engine version (u16, little-endian)
//! 8       4     Flags (u32, reserved)
//! 12      4     Payload length in bytes (u32, little-endian)
//! 16      16    BLAKE3 hash of the payload (truncated to 16 bytes)
//! 32..    var   Bincode-encoded payload
//! ```
//!
//! ## Versioning
//!
//! The format version in the header must match exactly. If it does not,
//! deserialization fails immediately with
//! [`DeserializeError::IncompatibleVersion`]. The engine version is
//! informational only.
//!
//! The normalization function is not part of the payload; callers of the
//! decode entry points supply it and must pass the same function that was
//! used when the cache was built.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{
    AbsentSlotPolicy, CompileErrorPolicy, CompiledRule, CompiledSlot, MatchConfig, NormalizeFn,
    PredicateMode, RuleSet, Step, TermRegistry, is_well_formed,
};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MAGIC: &[u8; 4] = b"TGMT";
const FORMAT_VERSION: u16 = 1;
const ENGINE_VERSION: u16 = 1;
const HEADER_SIZE: usize = 32;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when serializing a [`RuleSet`](crate::RuleSet) to bytes.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("failed to encode rule set: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("I/O error during serialization: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when deserializing a [`RuleSet`](crate::RuleSet) from bytes.
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("not a tagmatch binary: invalid magic bytes")]
    BadMagic,

    #[error("incompatible format version: blob is v{blob}, engine supports v{supported}")]
    IncompatibleVersion { blob: u16, supported: u16 },

    #[error("integrity check failed: BLAKE3 checksum mismatch")]
    ChecksumMismatch,

    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("failed to decode payload: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("I/O error during deserialization: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Serialized type hierarchy
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct SerializedRuleSet {
    metadata: RuleSetMetadata,
    config: SerializedConfig,
    terms: Vec<SerializedTerm>,
    rules: Vec<SerializedRule>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RuleSetMetadata {
    rule_count: usize,
    term_count: usize,
    source_digest: Option<[u8; 32]>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct SerializedConfig {
    predicate_mode: SerializedMode,
    absent_slots: SerializedAbsentPolicy,
    on_compile_error: SerializedErrorPolicy,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
enum SerializedMode {
    Contains,
    Pattern,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
enum SerializedAbsentPolicy {
    ExcludeFromAnd,
    SkipRule,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
enum SerializedErrorPolicy {
    Abort,
    DropInvalid,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedTerm {
    field: String,
    term: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedRule {
    id: String,
    matchable: bool,
    slots: Vec<SerializedSlot>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedSlot {
    field: String,
    program: Vec<SerializedStep>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
enum SerializedStep {
    Load(usize),
    Not,
    And,
    Or,
}

// ---------------------------------------------------------------------------
// Config conversion
// ---------------------------------------------------------------------------

fn serialize_config(config: MatchConfig) -> SerializedConfig {
    SerializedConfig {
        predicate_mode: match config.predicate_mode {
            PredicateMode::Contains => SerializedMode::Contains,
            PredicateMode::Pattern => SerializedMode::Pattern,
        },
        absent_slots: match config.absent_slots {
            AbsentSlotPolicy::ExcludeFromAnd => SerializedAbsentPolicy::ExcludeFromAnd,
            AbsentSlotPolicy::SkipRule => SerializedAbsentPolicy::SkipRule,
        },
        on_compile_error: match config.on_compile_error {
            CompileErrorPolicy::Abort => SerializedErrorPolicy::Abort,
            CompileErrorPolicy::DropInvalid => SerializedErrorPolicy::DropInvalid,
        },
    }
}

fn deserialize_config(config: SerializedConfig) -> MatchConfig {
    MatchConfig {
        predicate_mode: match config.predicate_mode {
            SerializedMode::Contains => PredicateMode::Contains,
            SerializedMode::Pattern => PredicateMode::Pattern,
        },
        absent_slots: match config.absent_slots {
            SerializedAbsentPolicy::ExcludeFromAnd => AbsentSlotPolicy::ExcludeFromAnd,
            SerializedAbsentPolicy::SkipRule => AbsentSlotPolicy::SkipRule,
        },
        on_compile_error: match config.on_compile_error {
            SerializedErrorPolicy::Abort => CompileErrorPolicy::Abort,
            SerializedErrorPolicy::DropInvalid => CompileErrorPolicy::DropInvalid,
        },
    }
}

// ---------------------------------------------------------------------------
// Step conversion
// ---------------------------------------------------------------------------

fn serialize_step(step: Step) -> SerializedStep {
    match step {
        Step::Load(slot) => SerializedStep::Load(slot),
        Step::Not => SerializedStep::Not,
        Step::And => SerializedStep::And,
        Step::Or => SerializedStep::Or,
    }
}

fn deserialize_step(step: SerializedStep) -> Step {
    match step {
        SerializedStep::Load(slot) => Step::Load(slot),
        SerializedStep::Not => Step::Not,
        SerializedStep::And => Step::And,
        SerializedStep::Or => Step::Or,
    }
}

// ---------------------------------------------------------------------------
// RuleSet -> SerializedRuleSet
// ---------------------------------------------------------------------------

fn ruleset_to_serialized(ruleset: &RuleSet, source_text: Option<&str>) -> SerializedRuleSet {
    let source_digest = source_text.map(|s| *blake3::hash(s.as_bytes()).as_bytes());

    let terms: Vec<SerializedTerm> = ruleset
        .terms
        .slots()
        .iter()
        .map(|slot| SerializedTerm {
            field: slot.field.clone(),
            term: slot.term.clone(),
        })
        .collect();

    let rules: Vec<SerializedRule> = ruleset
        .rules
        .iter()
        .map(|rule| SerializedRule {
            id: rule.id.clone(),
            matchable: rule.matchable,
            slots: rule
                .slots
                .iter()
                .map(|slot| SerializedSlot {
                    field: slot.field.clone(),
                    program: slot.program.iter().copied().map(serialize_step).collect(),
                })
                .collect(),
        })
        .collect();

    SerializedRuleSet {
        metadata: RuleSetMetadata {
            rule_count: ruleset.rules.len(),
            term_count: ruleset.terms.len(),
            source_digest,
        },
        config: serialize_config(ruleset.config),
        terms,
        rules,
    }
}

// ---------------------------------------------------------------------------
// SerializedRuleSet -> RuleSet
// ---------------------------------------------------------------------------

fn serialized_to_ruleset(
    ser: SerializedRuleSet,
    normalize: NormalizeFn,
) -> Result<RuleSet, DeserializeError> {
    validate(&ser)?;

    let config = deserialize_config(ser.config);

    let entries: Vec<(String, String)> = ser
        .terms
        .into_iter()
        .map(|t| (t.field, t.term))
        .collect();
    let term_count = entries.len();
    let terms = TermRegistry::from_entries(entries, config.predicate_mode)
        .map_err(|e| DeserializeError::Validation(format!("term pattern rejected: {e}")))?;
    if terms.len() != term_count {
        return Err(DeserializeError::Validation(
            "duplicate term entries in payload".to_owned(),
        ));
    }

    let rules: Vec<CompiledRule> = ser
        .rules
        .into_iter()
        .map(|rule| CompiledRule {
            id: rule.id,
            matchable: rule.matchable,
            slots: rule
                .slots
                .into_iter()
                .map(|slot| CompiledSlot {
                    field: slot.field,
                    program: slot.program.into_iter().map(deserialize_step).collect(),
                })
                .collect(),
        })
        .collect();

    Ok(RuleSet {
        rules,
        terms,
        config,
        normalize,
        rejected: Vec::new(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(ser: &SerializedRuleSet) -> Result<(), DeserializeError> {
    let term_count = ser.terms.len();

    if ser.metadata.rule_count != ser.rules.len() {
        return Err(DeserializeError::Validation(format!(
            "metadata says {} rules but payload has {}",
            ser.metadata.rule_count,
            ser.rules.len()
        )));
    }
    if ser.metadata.term_count != term_count {
        return Err(DeserializeError::Validation(format!(
            "metadata says {} terms but payload has {}",
            ser.metadata.term_count, term_count
        )));
    }

    for rule in &ser.rules {
        for slot in &rule.slots {
            let program: Vec<Step> = slot
                .program
                .iter()
                .copied()
                .map(deserialize_step)
                .collect();

            for step in &program {
                if let Step::Load(idx) = step {
                    if *idx >= term_count {
                        return Err(DeserializeError::Validation(format!(
                            "rule '{}' field '{}': predicate slot {idx} out of bounds \
                             (max {term_count})",
                            rule.id, slot.field
                        )));
                    }
                }
            }

            if !is_well_formed(&program) {
                return Err(DeserializeError::Validation(format!(
                    "rule '{}' field '{}': program is not well-formed",
                    rule.id, slot.field
                )));
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Header I/O
// ---------------------------------------------------------------------------

fn write_header(buf: &mut Vec<u8>, payload: &[u8]) {
    let hash = blake3::hash(payload);
    let hash_bytes = hash.as_bytes();

    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&ENGINE_VERSION.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // flags (reserved)
    #[allow(clippy::cast_possible_truncation)] // payload will never exceed 4 GiB
    let payload_len = payload.len() as u32;
    buf.extend_from_slice(&payload_len.to_le_bytes());
    buf.extend_from_slice(&hash_bytes[..16]);
}

#[allow(clippy::cast_possible_truncation)] // HEADER_SIZE is 32, always fits in u32
fn read_header(bytes: &[u8]) -> Result<(u16, u32, [u8; 16]), DeserializeError> {
    if bytes.len() < HEADER_SIZE {
        return Err(DeserializeError::LengthMismatch {
            expected: HEADER_SIZE as u32,
            actual: bytes.len(),
        });
    }

    if &bytes[0..4] != MAGIC {
        return Err(DeserializeError::BadMagic);
    }

    let format_version = u16::from_le_bytes([bytes[4], bytes[5]]);
    // bytes[6..8] is engine_version (informational, not used for checks)
    // bytes[8..12] is flags (reserved)
    let payload_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);

    let mut hash = [0u8; 16];
    hash.copy_from_slice(&bytes[16..32]);

    Ok((format_version, payload_len, hash))
}

// ---------------------------------------------------------------------------
// Public encode/decode
// ---------------------------------------------------------------------------

pub(crate) fn encode(
    ruleset: &RuleSet,
    source_text: Option<&str>,
) -> Result<Vec<u8>, SerializeError> {
    let serialized = ruleset_to_serialized(ruleset, source_text);
    let payload = bincode::serde::encode_to_vec(&serialized, bincode::config::standard())?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    write_header(&mut buf, &payload);
    buf.extend_from_slice(&payload);
    Ok(buf)
}

pub(crate) fn decode(bytes: &[u8], normalize: NormalizeFn) -> Result<RuleSet, DeserializeError> {
    let (format_version, payload_len, stored_hash) = read_header(bytes)?;

    if format_version != FORMAT_VERSION {
        return Err(DeserializeError::IncompatibleVersion {
            blob: format_version,
            supported: FORMAT_VERSION,
        });
    }

    let payload_start = HEADER_SIZE;
    let payload_end = payload_start + payload_len as usize;
    if bytes.len() < payload_end {
        return Err(DeserializeError::LengthMismatch {
            expected: payload_len,
            actual: bytes.len() - HEADER_SIZE,
        });
    }
    let payload = &bytes[payload_start..payload_end];

    // Integrity check
    let computed_hash = blake3::hash(payload);
    if computed_hash.as_bytes()[..16] != stored_hash {
        return Err(DeserializeError::ChecksumMismatch);
    }

    let (serialized, _): (SerializedRuleSet, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())?;

    serialized_to_ruleset(serialized, normalize)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::default_normalize;

    #[test]
    fn step_round_trip() {
        let steps = [Step::Load(3), Step::Not, Step::And, Step::Or];
        for step in steps {
            assert_eq!(deserialize_step(serialize_step(step)), step);
        }
    }

    #[test]
    fn config_round_trip() {
        let config = MatchConfig::new()
            .predicate_mode(PredicateMode::Pattern)
            .absent_slots(AbsentSlotPolicy::SkipRule)
            .on_compile_error(CompileErrorPolicy::DropInvalid);
        assert_eq!(deserialize_config(serialize_config(config)), config);
    }

    #[test]
    fn header_round_trip() {
        let payload = b"test payload data";
        let mut buf = Vec::new();
        write_header(&mut buf, payload);
        assert_eq!(buf.len(), HEADER_SIZE);

        let (format_version, payload_len, hash) = read_header(&buf).unwrap();
        assert_eq!(format_version, FORMAT_VERSION);
        assert_eq!(payload_len as usize, payload.len());

        let expected_hash = blake3::hash(payload);
        assert_eq!(&hash, &expected_hash.as_bytes()[..16]);
    }

    #[test]
    fn header_bad_magic() {
        let mut buf = vec![0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(b"BAAD");
        assert!(matches!(read_header(&buf), Err(DeserializeError::BadMagic)));
    }

    #[test]
    fn header_too_short() {
        let buf = vec![0u8; 10];
        assert!(matches!(
            read_header(&buf),
            Err(DeserializeError::LengthMismatch { .. })
        ));
    }

    fn empty_serialized(rules: Vec<SerializedRule>, terms: Vec<SerializedTerm>) -> SerializedRuleSet {
        SerializedRuleSet {
            metadata: RuleSetMetadata {
                rule_count: rules.len(),
                term_count: terms.len(),
                source_digest: None,
            },
            config: serialize_config(MatchConfig::new()),
            terms,
            rules,
        }
    }

    #[test]
    fn validate_load_out_of_bounds() {
        let ser = empty_serialized(
            vec![SerializedRule {
                id: "101".into(),
                matchable: true,
                slots: vec![SerializedSlot {
                    field: "f1".into(),
                    program: vec![SerializedStep::Load(5)],
                }],
            }],
            vec![SerializedTerm {
                field: "f1".into(),
                term: "pc".into(),
            }],
        );
        assert!(matches!(
            validate(&ser),
            Err(DeserializeError::Validation(_))
        ));
    }

    #[test]
    fn validate_malformed_program() {
        let ser = empty_serialized(
            vec![SerializedRule {
                id: "101".into(),
                matchable: true,
                slots: vec![SerializedSlot {
                    field: "f1".into(),
                    program: vec![SerializedStep::Load(0), SerializedStep::And],
                }],
            }],
            vec![SerializedTerm {
                field: "f1".into(),
                term: "pc".into(),
            }],
        );
        assert!(matches!(
            validate(&ser),
            Err(DeserializeError::Validation(_))
        ));
    }

    #[test]
    fn validate_metadata_rule_count_mismatch() {
        let mut ser = empty_serialized(vec![], vec![]);
        ser.metadata.rule_count = 2;
        assert!(matches!(
            validate(&ser),
            Err(DeserializeError::Validation(_))
        ));
    }

    #[test]
    fn decode_rejects_bad_pattern_on_load() {
        // A payload claiming pattern mode with a term that is not a valid
        // regex must fail validation instead of panicking later.
        let mut config = serialize_config(MatchConfig::new());
        config.predicate_mode = SerializedMode::Pattern;
        let ser = SerializedRuleSet {
            metadata: RuleSetMetadata {
                rule_count: 0,
                term_count: 1,
                source_digest: None,
            },
            config,
            terms: vec![SerializedTerm {
                field: "f1".into(),
                term: "([".into(),
            }],
            rules: vec![],
        };
        let result = serialized_to_ruleset(ser, Box::new(default_normalize));
        assert!(matches!(result, Err(DeserializeError::Validation(_))));
    }
}
