use super::{DomainError, DomainFinder, DomainHit};
use crate::core::io::fasta::SequenceRecord;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument};

const FORMAT: &str = "HMMER web JSON";
const USER_AGENT: &str = concat!("chimera/", env!("CARGO_PKG_VERSION"));

#[derive(Serialize)]
struct SearchRequest<'a> {
    hmmdb: &'a str,
    cut_ga: bool,
    seq: &'a str,
}

#[derive(Deserialize)]
struct SearchResponse {
    results: SearchResults,
}

#[derive(Deserialize)]
struct SearchResults {
    #[serde(default)]
    hits: Vec<WebHit>,
}

#[derive(Deserialize)]
struct WebHit {
    #[serde(default)]
    nincluded: Value,
    #[serde(default)]
    domains: Vec<WebDomain>,
}

/// The service reports numbers either as JSON numbers or as strings.
#[derive(Deserialize)]
struct WebDomain {
    alihmmacc: String,
    alihmmname: String,
    alisqfrom: Value,
    alisqto: Value,
    alihmmfrom: Value,
    alihmmto: Value,
    #[serde(rename = "aliM")]
    ali_m: Value,
    bitscore: Value,
    ievalue: Value,
    #[serde(default)]
    is_included: Value,
    aliaseq: String,
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    as_f64(value).is_some_and(|v| v != 0.0)
}

fn field_f64(value: &Value, name: &str) -> Result<f64, DomainError> {
    as_f64(value).ok_or_else(|| DomainError::Parse {
        format: FORMAT,
        line: 0,
        message: format!("field '{}' is not numeric: {}", name, value),
    })
}

fn field_usize(value: &Value, name: &str) -> Result<usize, DomainError> {
    let v = field_f64(value, name)?;
    if v < 0.0 || v.fract() != 0.0 {
        return Err(DomainError::Parse {
            format: FORMAT,
            line: 0,
            message: format!("field '{}' is not a position: {}", name, value),
        });
    }
    Ok(v as usize)
}

/// Converts one hmmscan response into hits for `query_id`.
///
/// Only included domains that span their whole profile with a positive bit
/// score are kept; the service reports far more than a local `--cut_ga` run.
pub fn parse_response(query_id: &str, body: &str) -> Result<Vec<DomainHit>, DomainError> {
    let response: SearchResponse = serde_json::from_str(body).map_err(|e| DomainError::Parse {
        format: FORMAT,
        line: e.line(),
        message: e.to_string(),
    })?;

    let mut hits = Vec::new();
    for hit in response
        .results
        .hits
        .iter()
        .filter(|h| as_f64(&h.nincluded).is_some_and(|n| n > 0.0))
    {
        for domain in hit.domains.iter().filter(|d| is_truthy(&d.is_included)) {
            let found = DomainHit {
                query_id: query_id.to_string(),
                model_accession: domain.alihmmacc.clone(),
                model_name: domain.alihmmname.clone(),
                target_start: field_usize(&domain.alisqfrom, "alisqfrom")?,
                target_end: field_usize(&domain.alisqto, "alisqto")?,
                model_start: field_usize(&domain.alihmmfrom, "alihmmfrom")?,
                model_end: field_usize(&domain.alihmmto, "alihmmto")?,
                model_length: field_usize(&domain.ali_m, "aliM")?,
                bit_score: field_f64(&domain.bitscore, "bitscore")?,
                e_value: field_f64(&domain.ievalue, "ievalue")?,
                aligned_sequence: domain.aliaseq.clone(),
            };
            if found.bit_score > 0.0 && found.spans_full_model() {
                hits.push(found);
            }
        }
    }
    Ok(hits)
}

/// The EBI HMMER web service, one POST per sequence.
pub struct HmmerWebFinder {
    url: String,
    client: Client,
}

impl HmmerWebFinder {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            url: url.to_string(),
            client,
        })
    }
}

impl DomainFinder for HmmerWebFinder {
    fn name(&self) -> &'static str {
        "hmmerweb"
    }

    #[instrument(skip_all, name = "hmmer_web", fields(sequences = sequences.len()))]
    fn find_domains(&self, sequences: &[SequenceRecord]) -> Result<Vec<DomainHit>, DomainError> {
        let mut hits = Vec::new();
        for sequence in sequences {
            info!("Submitting '{}' to {}", sequence.name, self.url);
            let body = self
                .client
                .post(&self.url)
                .header(ACCEPT, "application/json")
                .json(&SearchRequest {
                    hmmdb: "pfam",
                    cut_ga: true,
                    seq: &sequence.sequence,
                })
                .send()?
                .error_for_status()?
                .text()?;
            let found = parse_response(&sequence.name, &body)?;
            debug!("'{}': {} domains from the web service.", sequence.name, found.len());
            hits.extend(found);
        }
        Ok(hits)
    }
}
